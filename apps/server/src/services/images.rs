//! Decoding of images submitted as data URLs or raw base64

use crate::{Error, Result};
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

/// Standard alphabet, padding optional.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode an optional image field. Absent or blank values yield `None`.
pub fn decode_optional(raw: Option<&str>) -> Result<Option<Vec<u8>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => decode_image(value).map(Some),
        None => Ok(None),
    }
}

/// Strip a `data:<mime>;base64,` prefix when present and decode the rest.
pub fn decode_image(raw: &str) -> Result<Vec<u8>> {
    let payload = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, body) = rest
                .split_once(',')
                .ok_or_else(|| Error::InvalidImage("data URL without ',' separator".into()))?;
            if !header.ends_with(";base64") {
                return Err(Error::InvalidImage(format!(
                    "unsupported data URL encoding '{header}'"
                )));
            }
            body
        }
        None => raw,
    };

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    LENIENT
        .decode(compact.as_bytes())
        .map_err(|e| Error::InvalidImage(e.to_string()))
}

/// Base64 for image columns in read responses.
pub fn encode_image(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
