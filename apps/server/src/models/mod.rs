//! Request payloads, response views and the shared response envelope

pub mod de;
pub mod patient;
pub mod reference;
pub mod response;
pub mod session;

pub use patient::{
    AddressParts, AddressPayload, AddressView, PatientDetail, PatientPayload, PatientSummary,
};
pub use reference::{CivilStatus, Gender};
pub use response::ApiResponse;
pub use session::{
    AppointmentSummary, BillingInfo, BillingLine, BillingPrescription, FeeStatus,
    PrescriptionDetail, PrescriptionEntry, ServiceDetail, ServiceEntry, ServiceOffered,
    ServiceStatus, SessionDetail, SessionPayload, ToothChartView,
};
