use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::models::{Prescription, PrescriptionPayload};
use crate::AppState;

/// GET /api/prescriptions
/// Newest first, each with its active medications
pub async fn list_prescriptions(State(state): State<AppState>) -> ApiResult<Json<Vec<Prescription>>> {
    Ok(Json(state.db.list_prescriptions().await?))
}

/// GET /api/prescriptions/patient/:patient_id
pub async fn list_for_patient(
    State(state): State<AppState>,
    ApiPath(patient_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<Prescription>>> {
    Ok(Json(state.db.list_patient_prescriptions(patient_id).await?))
}

/// GET /api/prescriptions/:id
pub async fn get_prescription(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Prescription>> {
    Ok(Json(state.db.get_prescription(id).await?))
}

/// POST /api/prescriptions
pub async fn create_prescription(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PrescriptionPayload>,
) -> ApiResult<(StatusCode, Json<Prescription>)> {
    let new = payload.into_new()?;
    let prescription = state.db.create_prescription(new).await?;
    Ok((StatusCode::CREATED, Json(prescription)))
}

/// PUT /api/prescriptions/:id
/// A `medications` array replaces the current list
pub async fn update_prescription(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PrescriptionPayload>,
) -> ApiResult<Json<Prescription>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_prescription(id, changes).await?))
}

/// DELETE /api/prescriptions/:id
pub async fn delete_prescription(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_prescription(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
