use crate::api::handlers::{patients, sessions};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

/// Routes mounted under `/api`. Paths match the ones the clinic pages call.
pub fn clinic_routes() -> Router<AppState> {
    Router::new()
        // Patients
        .route("/get-patients", get(patients::get_patients))
        .route("/add-patient", post(patients::add_patient))
        .route("/update-patient", post(patients::update_patient))
        .route("/delete-patient", post(patients::delete_patient))
        // Service catalog
        .route("/get-services-offered", get(sessions::get_services_offered))
        // Sessions
        .route("/appointment-history", get(sessions::appointment_history))
        .route("/session", get(sessions::get_session))
        .route("/patient-session", get(sessions::get_patient_session))
        .route("/getBillingInfo", get(sessions::get_billing_info))
        .route("/store-session-data", post(sessions::store_session_data))
}
