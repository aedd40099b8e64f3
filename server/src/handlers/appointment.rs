use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{Appointment, AppointmentFilter, AppointmentPayload};
use crate::AppState;

/// GET /api/appointments
/// Filters: `patient_id`, `doctor_id`, `status`, `date`
pub async fn list_appointments(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<AppointmentFilter>,
) -> ApiResult<Json<Vec<Appointment>>> {
    Ok(Json(state.db.list_appointments(filter).await?))
}

/// GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Appointment>> {
    Ok(Json(state.db.get_appointment(id).await?))
}

/// POST /api/appointments
/// 409 when the doctor is already booked for that slot
pub async fn create_appointment(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<AppointmentPayload>,
) -> ApiResult<(StatusCode, Json<Appointment>)> {
    let new = payload.into_new()?;
    let appointment = state.db.create_appointment(new).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// PUT /api/appointments/:id
pub async fn update_appointment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<AppointmentPayload>,
) -> ApiResult<Json<Appointment>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_appointment(id, changes).await?))
}

/// DELETE /api/appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_appointment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
