//! Patient request payloads and response views

use super::de::optional_text;
use serde::{Deserialize, Serialize};

/// Body of `add-patient` and `update-patient`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientPayload {
    /// Only read by `update-patient`.
    #[serde(default, deserialize_with = "optional_text")]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub civil_status: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub mobile: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<AddressPayload>,
    #[serde(default)]
    pub medical_conditions: Option<Vec<String>>,
    #[serde(default)]
    pub medical_history: Option<Vec<String>>,
}

/// Address keys keep the snake_case names the clinic pages send and read back.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AddressPayload {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub barangay_name: Option<String>,
    #[serde(default)]
    pub street_name: Option<String>,
}

/// Row of the patient list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub age: Option<i32>,
    pub gender: Option<&'static str>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AddressParts {
    pub street_name: String,
    pub barangay_name: String,
    pub city_name: String,
}

/// Either the address parts or the literal "Not provided".
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AddressView {
    Provided(AddressParts),
    Missing(&'static str),
}

impl AddressView {
    pub const NOT_PROVIDED: AddressView = AddressView::Missing("Not provided");
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetail {
    pub id: i32,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_added: String,
    pub age: Option<i32>,
    pub mobile: Option<String>,
    pub address: AddressView,
    /// ISO date so the edit form can prefill it.
    pub birthdate: Option<String>,
    pub occupation: String,
    pub gender: Option<&'static str>,
    pub gender_id: Option<i32>,
    pub civil_status: Option<&'static str>,
    pub civil_status_id: Option<i32>,
    pub company: Option<String>,
    pub medical_conditions: Vec<String>,
    pub medical_history: Vec<String>,
    pub medications: Vec<String>,
    pub last_updated: String,
}
