use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{
    BillingFilter, BillingItem, BillingItemPayload, BillingRecord, BillingRecordPayload,
};
use crate::AppState;

/// GET /api/billing
pub async fn list_records(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<BillingFilter>,
) -> ApiResult<Json<Vec<BillingRecord>>> {
    Ok(Json(state.db.list_billing_records(filter).await?))
}

/// GET /api/billing/:id
pub async fn get_record(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<BillingRecord>> {
    Ok(Json(state.db.get_billing_record(id).await?))
}

/// POST /api/billing
pub async fn create_record(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<BillingRecordPayload>,
) -> ApiResult<(StatusCode, Json<BillingRecord>)> {
    let new = payload.into_new()?;
    let record = state.db.create_billing_record(new).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /api/billing/:id
pub async fn update_record(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BillingRecordPayload>,
) -> ApiResult<Json<BillingRecord>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_billing_record(id, changes).await?))
}

/// DELETE /api/billing/:id
pub async fn delete_record(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_billing_record(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/billing/:id/items
pub async fn list_items(
    State(state): State<AppState>,
    ApiPath(record_id): ApiPath<Uuid>,
) -> ApiResult<Json<Vec<BillingItem>>> {
    Ok(Json(state.db.list_billing_items(record_id).await?))
}

/// POST /api/billing/:id/items
/// `total_price` is always computed from quantity and unit price
pub async fn create_item(
    State(state): State<AppState>,
    ApiPath(record_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BillingItemPayload>,
) -> ApiResult<(StatusCode, Json<BillingItem>)> {
    let new = payload.into_new()?;
    let item = state.db.create_billing_item(record_id, new).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/billing/items/:id
pub async fn update_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<BillingItemPayload>,
) -> ApiResult<Json<BillingItem>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_billing_item(id, changes).await?))
}

/// DELETE /api/billing/items/:id
pub async fn delete_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_billing_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
