//! Lenient field deserializers for browser-submitted JSON.
//!
//! Form values reach the API as strings or numbers depending on how the page built the
//! body, so ids and amounts are accepted in either shape and parsed later.

use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

/// Accept a string, number or boolean as text. `null` and missing values become `None`.
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// Text that is present and not blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a numeric id such as `"12"` or `"12.0"`. Exponent forms are not ids.
pub fn parse_id(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i32>() {
        return Some(id);
    }
    if !raw.bytes().all(|b| b.is_ascii_digit() || b == b'.' || b == b'-' || b == b'+') {
        return None;
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
        .map(|f| f as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "optional_text")]
        value: Option<String>,
    }

    fn probe(json: &str) -> Option<String> {
        serde_json::from_str::<Probe>(json).unwrap().value
    }

    #[test]
    fn accepts_strings_and_numbers() {
        assert_eq!(probe(r#"{"value": "09171234567"}"#).as_deref(), Some("09171234567"));
        assert_eq!(probe(r#"{"value": 1}"#).as_deref(), Some("1"));
        assert_eq!(probe(r#"{"value": null}"#), None);
        assert_eq!(probe("{}"), None);
    }

    #[test]
    fn rejects_structured_values() {
        assert!(serde_json::from_str::<Probe>(r#"{"value": [1]}"#).is_err());
    }

    #[test]
    fn parses_ids_from_form_text() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("3.0"), Some(3));
        assert_eq!(parse_id("3.5"), None);
        assert_eq!(parse_id("abc"), None);
    }

    #[test]
    fn exponent_forms_are_not_ids() {
        assert_eq!(parse_id("1e3"), None);
        assert_eq!(parse_id("5e0"), None);
        assert_eq!(parse_id("5E0"), None);
        assert_eq!(parse_id("inf"), None);
        assert_eq!(parse_id("NaN"), None);
    }

    #[test]
    fn blank_text_counts_as_missing() {
        assert_eq!(non_blank(&Some("  ".to_string())), None);
        assert_eq!(non_blank(&Some(" Ana ".to_string())), Some("Ana"));
        assert_eq!(non_blank(&None), None);
    }
}
