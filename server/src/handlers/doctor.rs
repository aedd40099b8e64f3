use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{AvailabilityQuery, Doctor, DoctorAvailability, DoctorFilter, DoctorPayload};
use crate::AppState;

/// GET /api/doctors
pub async fn list_doctors(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<DoctorFilter>,
) -> ApiResult<Json<Vec<Doctor>>> {
    Ok(Json(state.db.list_doctors(filter).await?))
}

/// GET /api/doctors/:id
pub async fn get_doctor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Doctor>> {
    Ok(Json(state.db.get_doctor(id).await?))
}

/// POST /api/doctors
pub async fn create_doctor(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<DoctorPayload>,
) -> ApiResult<(StatusCode, Json<Doctor>)> {
    let new = payload.into_new()?;
    let doctor = state.db.create_doctor(new).await?;
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// PUT /api/doctors/:id
pub async fn update_doctor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<DoctorPayload>,
) -> ApiResult<Json<Doctor>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_doctor(id, changes).await?))
}

/// DELETE /api/doctors/:id
pub async fn delete_doctor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_doctor(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/doctors/:id/availability?date=YYYY-MM-DD&time=HH:MM
/// Returns a one-element list for the requested slot
pub async fn availability(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<AvailabilityQuery>,
) -> ApiResult<Json<Vec<DoctorAvailability>>> {
    let (date, time) = query.slot()?;
    let slot = state.db.doctor_availability(id, date, time).await?;
    Ok(Json(vec![slot]))
}
