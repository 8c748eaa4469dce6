//! Canonical JSON envelope shared by every endpoint

use serde::{ser::SerializeMap, Serialize, Serializer};

/// `{"success": true, "message"?, "data"?}` or `{"success": false, "message", "fields"?}`
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success {
        message: Option<String>,
        data: Option<T>,
    },
    Failure {
        message: String,
        fields: Vec<String>,
    },
}

impl<T> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self::Success {
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self::Success {
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::Success {
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>, fields: Vec<String>) -> Self {
        Self::Failure {
            message: message.into(),
            fields,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl<T: Serialize> Serialize for ApiResponse<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("success", &self.is_success())?;
        match self {
            Self::Success { message, data } => {
                if let Some(message) = message {
                    map.serialize_entry("message", message)?;
                }
                if let Some(data) = data {
                    map.serialize_entry("data", data)?;
                }
            }
            Self::Failure { message, fields } => {
                map.serialize_entry("message", message)?;
                if !fields.is_empty() {
                    map.serialize_entry("fields", fields)?;
                }
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_with_data_and_message() {
        let body = ApiResponse::with_message("Patient added successfully", json!({"patientId": 7}));
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "success": true,
                "message": "Patient added successfully",
                "data": {"patientId": 7}
            })
        );
    }

    #[test]
    fn message_only_success_omits_data() {
        let body = ApiResponse::<()>::message("Patient and all related data deleted successfully");
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["success"], json!(true));
        assert!(value.get("data").is_none());
    }

    #[test]
    fn failure_lists_fields_only_when_present() {
        let with_fields =
            ApiResponse::<()>::failure("Missing required fields: mobile", vec!["mobile".into()]);
        assert_eq!(
            serde_json::to_value(&with_fields).unwrap(),
            json!({
                "success": false,
                "message": "Missing required fields: mobile",
                "fields": ["mobile"]
            })
        );

        let bare = ApiResponse::<()>::failure("Database error", Vec::new());
        assert!(serde_json::to_value(&bare).unwrap().get("fields").is_none());
    }
}
