use crate::error::ApiError;
use crate::state::AppState;
use crate::web::api::middleware::CurrentPatient;
use crate::web::extract::{parse_id, JsonBody};
use axum::{
    extract::{Path, State},
    Json,
};
use medcard_common::models::{Patient, PatientInput};
use serde_json::{json, Value};
use std::sync::Arc;

/// POST /patients
#[tracing::instrument(skip(state, input))]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    JsonBody(input): JsonBody<PatientInput>,
) -> Result<Json<Patient>, ApiError> {
    let patient = state.service.add_patient(input).await?;
    tracing::info!(patient_id = patient.id, "Registered patient");
    Ok(Json(patient))
}

/// GET /patients
#[tracing::instrument(skip(state))]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    Ok(Json(state.service.patients().await?))
}

/// GET /patients/me
pub async fn me(CurrentPatient(patient): CurrentPatient) -> Json<Patient> {
    Json(patient)
}

/// GET /patients/{passport_number}
#[tracing::instrument(skip(state))]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Path(passport_number): Path<String>,
) -> Result<Json<Patient>, ApiError> {
    let patient = state
        .service
        .patient_by_passport_number(&passport_number)
        .await?;
    Ok(Json(patient))
}

/// PUT /patients/{id}
#[tracing::instrument(skip(state, input, caller), fields(caller_id = caller.0.id))]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    caller: CurrentPatient,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<PatientInput>,
) -> Result<Json<Patient>, ApiError> {
    let id = parse_id(&id)?;
    let patient = state.service.update_patient(id, input).await?;
    Ok(Json(patient))
}

/// DELETE /patients/{id}
#[tracing::instrument(skip(state, caller), fields(caller_id = caller.0.id))]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    caller: CurrentPatient,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    state.service.delete_patient(id).await?;
    Ok(Json(json!({ "id": id })))
}
