//! Patient payload validation
//!
//! Runs before any transaction is opened. The first failing rule wins and its message names
//! the offending fields.

use crate::{
    db::{AddressInput, NewPatient},
    models::{de::non_blank, CivilStatus, Gender, PatientPayload},
    Error, Result,
};
use chrono::{DateTime, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MOBILE_PATTERN: Regex = Regex::new(r"^09\d{9}$").expect("valid mobile regex");
}

pub const DEFAULT_OCCUPATION: &str = "Not specified";

pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_PATTERN.is_match(mobile)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is used).
pub fn parse_birthdate(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Check a create/update body and turn it into a writable patient.
pub fn validate_patient(payload: &PatientPayload, today: NaiveDate) -> Result<NewPatient> {
    let required = [
        ("firstName", non_blank(&payload.first_name)),
        ("lastName", non_blank(&payload.last_name)),
        ("birthdate", non_blank(&payload.birthdate)),
        ("gender", non_blank(&payload.gender)),
        ("civilStatus", non_blank(&payload.civil_status)),
        ("mobile", non_blank(&payload.mobile)),
    ];
    let missing: Vec<String> = required
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(Error::validation(
            format!("Missing required fields: {}", missing.join(", ")),
            missing,
        ));
    }

    let address = validate_address(payload)?;

    let birthdate = non_blank(&payload.birthdate)
        .and_then(parse_birthdate)
        .ok_or_else(|| Error::invalid_field("birthdate", "Invalid birth date format"))?;
    if birthdate > today {
        return Err(Error::invalid_field(
            "birthdate",
            "Birth date cannot be in the future",
        ));
    }

    let mobile = non_blank(&payload.mobile).unwrap_or_default();
    if !is_valid_mobile(mobile) {
        return Err(Error::invalid_field(
            "mobile",
            "Invalid mobile number format. Must be 11 digits starting with 09 (e.g., 09171234567)",
        ));
    }

    let gender = non_blank(&payload.gender)
        .and_then(Gender::parse)
        .ok_or_else(|| Error::invalid_field("gender", "Invalid gender"))?;
    let civil_status = non_blank(&payload.civil_status)
        .and_then(CivilStatus::parse)
        .ok_or_else(|| Error::invalid_field("civilStatus", "Invalid civil status"))?;

    Ok(NewPatient {
        first_name: required_text(&payload.first_name),
        last_name: required_text(&payload.last_name),
        middle_name: optional_text(&payload.middle_name),
        birthdate,
        gender,
        civil_status,
        occupation: optional_text(&payload.occupation)
            .unwrap_or_else(|| DEFAULT_OCCUPATION.to_string()),
        company: optional_text(&payload.company),
        mobile: mobile.to_string(),
        address,
        medical_conditions: label_list(payload.medical_conditions.as_deref()),
        medical_history: label_list(payload.medical_history.as_deref()),
    })
}

fn validate_address(payload: &PatientPayload) -> Result<AddressInput> {
    let Some(address) = &payload.address else {
        return Err(Error::invalid_field(
            "address",
            "Address information is required",
        ));
    };

    let parts = [
        ("city_name", non_blank(&address.city_name)),
        ("barangay_name", non_blank(&address.barangay_name)),
        ("street_name", non_blank(&address.street_name)),
    ];
    let missing: Vec<&str> = parts
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(Error::validation(
            format!("Missing required address fields: {}", missing.join(", ")),
            missing.iter().map(|name| format!("address.{name}")).collect(),
        ));
    }

    Ok(AddressInput {
        city_name: required_text(&address.city_name),
        barangay_name: required_text(&address.barangay_name),
        street_name: required_text(&address.street_name),
    })
}

/// Caller's text for a field already checked as present.
fn required_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn optional_text(value: &Option<String>) -> Option<String> {
    non_blank(value).map(|_| value.clone().unwrap_or_default())
}

/// Drop blank labels and repeated ones, keeping first-seen order.
fn label_list(labels: Option<&[String]>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for label in labels.unwrap_or_default() {
        if label.trim().is_empty() || out.contains(label) {
            continue;
        }
        out.push(label.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddressPayload;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn valid_payload() -> PatientPayload {
        PatientPayload {
            first_name: Some("Ana".into()),
            last_name: Some("Reyes".into()),
            birthdate: Some("1990-04-01".into()),
            gender: Some("1".into()),
            civil_status: Some("0".into()),
            mobile: Some("09171234567".into()),
            address: Some(AddressPayload {
                city_name: Some("Quezon City".into()),
                barangay_name: Some("Bagumbayan".into()),
                street_name: Some("12 Mabini St".into()),
            }),
            medical_conditions: Some(vec!["Diabetes".into(), "Diabetes".into(), " ".into()]),
            ..Default::default()
        }
    }

    fn fields_of(err: Error) -> (String, Vec<String>) {
        match err {
            Error::Validation { message, fields } => (message, fields),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_complete_payload_and_applies_defaults() {
        let patient = validate_patient(&valid_payload(), today()).unwrap();
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.civil_status, CivilStatus::Single);
        assert_eq!(patient.occupation, DEFAULT_OCCUPATION);
        assert_eq!(patient.middle_name, None);
        assert_eq!(patient.medical_conditions, vec!["Diabetes".to_string()]);
        assert!(patient.medical_history.is_empty());
    }

    #[test]
    fn lists_every_missing_field() {
        let payload = PatientPayload {
            first_name: Some("  ".into()),
            mobile: None,
            ..valid_payload()
        };
        let (message, fields) = fields_of(validate_patient(&payload, today()).unwrap_err());
        assert_eq!(message, "Missing required fields: firstName, mobile");
        assert_eq!(fields, vec!["firstName", "mobile"]);
    }

    #[test]
    fn requires_address_parts() {
        let no_address = PatientPayload {
            address: None,
            ..valid_payload()
        };
        let (message, _) = fields_of(validate_patient(&no_address, today()).unwrap_err());
        assert_eq!(message, "Address information is required");

        let partial = PatientPayload {
            address: Some(AddressPayload {
                city_name: Some("Quezon City".into()),
                ..Default::default()
            }),
            ..valid_payload()
        };
        let (message, fields) = fields_of(validate_patient(&partial, today()).unwrap_err());
        assert_eq!(
            message,
            "Missing required address fields: barangay_name, street_name"
        );
        assert_eq!(fields, vec!["address.barangay_name", "address.street_name"]);
    }

    #[test]
    fn rejects_bad_and_future_birthdates() {
        let bad = PatientPayload {
            birthdate: Some("01/04/1990".into()),
            ..valid_payload()
        };
        let (message, _) = fields_of(validate_patient(&bad, today()).unwrap_err());
        assert_eq!(message, "Invalid birth date format");

        let future = PatientPayload {
            birthdate: Some("2026-10-17".into()),
            ..valid_payload()
        };
        let (message, fields) = fields_of(validate_patient(&future, today()).unwrap_err());
        assert_eq!(message, "Birth date cannot be in the future");
        assert_eq!(fields, vec!["birthdate"]);

        let born_today = PatientPayload {
            birthdate: Some("2026-10-16T00:00:00Z".into()),
            ..valid_payload()
        };
        assert!(validate_patient(&born_today, today()).is_ok());
    }

    #[test]
    fn mobile_must_be_philippine_format() {
        assert!(is_valid_mobile("09171234567"));
        for bad in ["091234", "08171234567", "091712345678", "0917123456a", "+639171234567"] {
            assert!(!is_valid_mobile(bad), "{bad} should be rejected");
        }

        let payload = PatientPayload {
            mobile: Some("091234".into()),
            ..valid_payload()
        };
        let (_, fields) = fields_of(validate_patient(&payload, today()).unwrap_err());
        assert_eq!(fields, vec!["mobile"]);
    }

    #[test]
    fn rejects_unknown_enumeration_ids() {
        let payload = PatientPayload {
            gender: Some("7".into()),
            ..valid_payload()
        };
        let (message, _) = fields_of(validate_patient(&payload, today()).unwrap_err());
        assert_eq!(message, "Invalid gender");

        let payload = PatientPayload {
            civil_status: Some("Divorced".into()),
            ..valid_payload()
        };
        let (message, _) = fields_of(validate_patient(&payload, today()).unwrap_err());
        assert_eq!(message, "Invalid civil status");
    }
}
