use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{Patient, PatientFilter, PatientPayload};
use crate::AppState;

/// GET /api/patients
/// Active patients, optionally filtered by `?search=` on the name
pub async fn list_patients(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<PatientFilter>,
) -> ApiResult<Json<Vec<Patient>>> {
    Ok(Json(state.db.list_patients(filter).await?))
}

/// GET /api/patients/:id
pub async fn get_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Patient>> {
    Ok(Json(state.db.get_patient(id).await?))
}

/// POST /api/patients
pub async fn create_patient(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<PatientPayload>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let new = payload.into_new()?;
    let patient = state.db.create_patient(new).await?;
    Ok((StatusCode::CREATED, Json(patient)))
}

/// PUT /api/patients/:id
pub async fn update_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<PatientPayload>,
) -> ApiResult<Json<Patient>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_patient(id, changes).await?))
}

/// DELETE /api/patients/:id
/// Soft delete; the patient's appointments, prescriptions, lab tests and bills go with it
pub async fn delete_patient(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_patient(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
