use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{LabTest, LabTestFilter, LabTestPayload};
use crate::AppState;

/// GET /api/lab-tests
pub async fn list_lab_tests(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<LabTestFilter>,
) -> ApiResult<Json<Vec<LabTest>>> {
    Ok(Json(state.db.list_lab_tests(filter).await?))
}

/// GET /api/lab-tests/:id
pub async fn get_lab_test(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<LabTest>> {
    Ok(Json(state.db.get_lab_test(id).await?))
}

/// POST /api/lab-tests
pub async fn create_lab_test(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LabTestPayload>,
) -> ApiResult<(StatusCode, Json<LabTest>)> {
    let new = payload.into_new()?;
    let test = state.db.create_lab_test(new).await?;
    Ok((StatusCode::CREATED, Json(test)))
}

/// PUT /api/lab-tests/:id
pub async fn update_lab_test(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<LabTestPayload>,
) -> ApiResult<Json<LabTest>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_lab_test(id, changes).await?))
}

/// DELETE /api/lab-tests/:id
pub async fn delete_lab_test(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_lab_test(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
