//! Error types and their HTTP mapping

use crate::models::ApiResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed input; the offending fields are echoed back to the client.
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        fields: Vec<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid image payload: {0}")]
    InvalidImage(String),

    /// Failure of a whole workflow that reports a single fixed message to the client.
    #[error("{message}: {source}")]
    Operation {
        message: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn validation(message: impl Into<String>, fields: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    /// Validation error naming a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::validation(message, vec![field.to_string()])
    }

    pub fn operation(message: &'static str, source: Error) -> Self {
        Self::Operation {
            message,
            source: Box::new(source),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Database(_)
            | Error::Migration(_)
            | Error::InvalidImage(_)
            | Error::Operation { .. }
            | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients. Storage details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation { message, .. } => message.clone(),
            Error::NotFound(message) | Error::PayloadTooLarge(message) => message.clone(),
            Error::Database(_) | Error::Migration(_) => "Database error".to_string(),
            Error::Operation { message, .. } => (*message).to_string(),
            Error::InvalidImage(_) | Error::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let fields = match &self {
            Error::Validation { fields, .. } => fields.clone(),
            _ => Vec::new(),
        };
        let body = ApiResponse::<()>::failure(self.public_message(), fields);

        (status, Json(body)).into_response()
    }
}
