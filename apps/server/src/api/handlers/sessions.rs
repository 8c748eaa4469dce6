//! Treatment session, billing and service catalog handlers

use super::{body_rejection, required_id};
use crate::{
    models::{ApiResponse, SessionPayload},
    state::AppState,
    Result,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuery {
    pub patient_id: Option<String>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdBody {
    pub session_id: i32,
}

/// List the service catalog
///
/// GET /api/get-services-offered
pub async fn get_services_offered(State(state): State<AppState>) -> Result<Response> {
    let services = state.session_service.services_offered().await?;
    Ok((StatusCode::OK, Json(ApiResponse::data(services))).into_response())
}

/// Session summaries of one patient, newest first
///
/// GET /api/appointment-history?patientId=
pub async fn appointment_history(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<Response> {
    let patient_id = patient_id(&q)?;
    let appointments = state.session_service.appointment_history(patient_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::data(appointments))).into_response())
}

/// Full session detail
///
/// GET /api/session?sessionId=
pub async fn get_session(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<Response> {
    let session_id = session_id(&q)?;
    let detail = state.session_service.session_detail(session_id, None).await?;
    Ok((StatusCode::OK, Json(ApiResponse::data(detail))).into_response())
}

/// Session detail, only if the session belongs to the given patient
///
/// GET /api/patient-session?sessionId=&patientId=
pub async fn get_patient_session(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<Response> {
    let session_id = session_id(&q)?;
    let patient_id = patient_id(&q)?;
    let detail = state
        .session_service
        .session_detail(session_id, Some(patient_id))
        .await?;
    Ok((StatusCode::OK, Json(ApiResponse::data(detail))).into_response())
}

/// Billing lines and prescriptions of one session
///
/// GET /api/getBillingInfo?patientId=&sessionId=
pub async fn get_billing_info(
    State(state): State<AppState>,
    Query(q): Query<SessionQuery>,
) -> Result<Response> {
    let patient_id = patient_id(&q)?;
    let session_id = session_id(&q)?;
    let billing = state.session_service.billing(patient_id, session_id).await?;
    Ok((StatusCode::OK, Json(ApiResponse::data(billing))).into_response())
}

/// Store a treatment session
///
/// POST /api/store-session-data
pub async fn store_session_data(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SessionPayload>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) =
        payload.map_err(|rejection| body_rejection(rejection, "Session data is required"))?;

    let session_id = state.session_service.store(payload).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            "Session data stored successfully",
            SessionIdBody { session_id },
        )),
    )
        .into_response())
}

fn patient_id(q: &SessionQuery) -> Result<i32> {
    required_id(
        q.patient_id.as_deref(),
        "patientId",
        "Patient ID is required",
        "Invalid patient ID",
    )
}

fn session_id(q: &SessionQuery) -> Result<i32> {
    required_id(
        q.session_id.as_deref(),
        "sessionId",
        "Session ID is required",
        "Invalid session ID",
    )
}
