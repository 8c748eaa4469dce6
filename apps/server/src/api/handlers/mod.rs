//! Request handlers

pub mod health;
pub mod patients;
pub mod sessions;

use crate::{models::de::parse_id, Error, Result};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Parse a required numeric id parameter.
///
/// Blank values answer `missing`; anything that is not an integer answers `invalid`.
pub(crate) fn required_id(
    raw: Option<&str>,
    field: &str,
    missing: &str,
    invalid: &str,
) -> Result<i32> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::invalid_field(field, missing))?;
    parse_id(raw).ok_or_else(|| Error::invalid_field(field, invalid))
}

/// Map an unreadable JSON body to an error. Bodies over the configured limit keep their 413.
pub(crate) fn body_rejection(rejection: JsonRejection, message: impl Into<String>) -> Error {
    tracing::debug!(error = %rejection.body_text(), "Unreadable request body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::PayloadTooLarge("Request body too large".to_string());
    }
    Error::invalid_field("body", message)
}

/// Fallback for unknown routes.
pub async fn not_found() -> Response {
    Error::NotFound("Resource not found".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_id_distinguishes_missing_from_invalid() {
        let parse = |raw: Option<&'static str>| {
            required_id(raw, "id", "Patient ID is required", "Invalid patient ID")
        };

        assert_eq!(parse(Some("15")).ok(), Some(15));
        match parse(Some(" ")) {
            Err(Error::Validation { message, fields }) => {
                assert_eq!(message, "Patient ID is required");
                assert_eq!(fields, vec!["id"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse(Some("abc")),
            Err(Error::Validation { message, .. }) if message == "Invalid patient ID"
        ));
    }
}
