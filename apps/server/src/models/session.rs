//! Treatment session payloads and response views

use super::de::optional_text;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Completion state of a rendered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServiceStatus {
    Complete,
    Incomplete,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Complete => "Complete",
            ServiceStatus::Incomplete => "Incomplete",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "complete" => Some(ServiceStatus::Complete),
            "incomplete" => Some(ServiceStatus::Incomplete),
            _ => None,
        }
    }
}

/// Payment state of a rendered service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeeStatus {
    Paid,
    Unpaid,
}

impl FeeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FeeStatus::Paid => "PAID",
            FeeStatus::Unpaid => "UNPAID",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PAID" => Some(FeeStatus::Paid),
            "UNPAID" => Some(FeeStatus::Unpaid),
            _ => None,
        }
    }
}

/// Body of `store-session-data`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionPayload {
    #[serde(default, deserialize_with = "optional_text")]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub session_remarks: Option<String>,
    /// Data URL or raw base64.
    #[serde(default)]
    pub session_remarks_image: Option<String>,
    #[serde(default)]
    pub service_values: Option<Vec<ServiceEntry>>,
    #[serde(default)]
    pub prescriptions: Option<Vec<PrescriptionEntry>>,
    /// Data URL or raw base64.
    #[serde(default)]
    pub tooth_chart_image: Option<String>,
    #[serde(default)]
    pub tooth_chart_remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceEntry {
    #[serde(default, deserialize_with = "optional_text")]
    pub service_offered_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub tooth: Option<String>,
    /// Service status (Complete/Incomplete).
    #[serde(default, rename = "remarkId", deserialize_with = "optional_text")]
    pub remark_id: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub fee: Option<String>,
    /// Fee status (PAID/UNPAID).
    #[serde(default, deserialize_with = "optional_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub tendered: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionEntry {
    #[serde(default)]
    pub medication: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency_duration: Option<String>,
    #[serde(default)]
    pub special_instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceOffered {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub session_id: i32,
    pub date: String,
    pub time_start: String,
    pub time_end: String,
    pub dentist_name: String,
    pub remarks: String,
    pub services: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    pub service_id: i32,
    pub service_offered_id: i32,
    pub service_name: String,
    pub tooth_number: String,
    pub status: ServiceStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub fee: Decimal,
    pub fee_status: FeeStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_tendered: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDetail {
    pub prescription_id: i32,
    pub medication_id: i32,
    pub medication_name: String,
    pub dosage: Option<String>,
    pub frequency_duration: Option<String>,
    pub special_instructions: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToothChartView {
    /// Base64 of the stored image.
    pub chart_data: String,
    pub remarks: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    pub session_id: i32,
    pub patient_id: i32,
    pub dentist_id: i32,
    pub dentist_name: String,
    pub patient_name: Option<String>,
    pub date: String,
    pub remarks: String,
    pub remarks_image: Option<String>,
    pub time_start: String,
    pub time_end: String,
    pub services: Vec<ServiceDetail>,
    pub prescriptions: Vec<PrescriptionDetail>,
    pub tooth_chart: Option<ToothChartView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingLine {
    pub service_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_tendered: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    pub payment_status: FeeStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingPrescription {
    pub medication_name: String,
    pub dosage: Option<String>,
    pub frequency_duration: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingInfo {
    pub billing: Vec<BillingLine>,
    pub prescriptions: Vec<BillingPrescription>,
}
