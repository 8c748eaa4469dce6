//! Patient handlers

use super::{body_rejection, required_id};
use crate::{
    models::{ApiResponse, PatientPayload},
    state::AppState,
    Error, Result,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PatientIdQuery {
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientIdBody {
    pub patient_id: i32,
}

/// List all patients, or one patient's detail when `id` is given
///
/// GET /api/get-patients[?id=]
pub async fn get_patients(
    State(state): State<AppState>,
    Query(q): Query<PatientIdQuery>,
) -> Result<Response> {
    match q.id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => {
            let patients = state.patient_service.list().await?;
            Ok((StatusCode::OK, Json(ApiResponse::data(patients))).into_response())
        }
        Some(raw) => {
            let patient_id = required_id(
                Some(raw),
                "id",
                "Patient ID is required",
                "Invalid patient ID",
            )?;
            let detail = state.patient_service.get(patient_id).await?;
            Ok((StatusCode::OK, Json(ApiResponse::data(detail))).into_response())
        }
    }
}

/// Create a patient
///
/// POST /api/add-patient
pub async fn add_patient(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PatientPayload>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(invalid_body)?;

    let patient_id = state.patient_service.create(&payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Patient added successfully",
            PatientIdBody { patient_id },
        )),
    )
        .into_response())
}

/// Update a patient; the body carries the patient id
///
/// POST /api/update-patient
pub async fn update_patient(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PatientPayload>, JsonRejection>,
) -> Result<Response> {
    let Json(payload) = payload.map_err(invalid_body)?;
    let patient_id = required_id(
        payload.id.as_deref(),
        "id",
        "Patient ID is required",
        "Invalid patient ID",
    )?;

    let patient_id = state.patient_service.update(patient_id, &payload).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::with_message(
            "Patient updated successfully",
            PatientIdBody { patient_id },
        )),
    )
        .into_response())
}

/// Delete a patient with all sessions, links and unreferenced address rows
///
/// POST /api/delete-patient?id=
pub async fn delete_patient(
    State(state): State<AppState>,
    Query(q): Query<PatientIdQuery>,
) -> Result<Response> {
    let patient_id = required_id(
        q.id.as_deref(),
        "id",
        "Patient ID is required",
        "Invalid patient ID",
    )?;

    state.patient_service.delete(patient_id).await?;

    Ok((
        StatusCode::OK,
        Json(ApiResponse::<()>::message(
            "Patient and all related data deleted successfully",
        )),
    )
        .into_response())
}

fn invalid_body(rejection: JsonRejection) -> Error {
    let message = format!("Invalid JSON body: {}", rejection.body_text());
    body_rejection(rejection, message)
}
