use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::{InventoryFilter, InventoryItem, InventoryPayload};
use crate::AppState;

/// GET /api/inventory
pub async fn list_items(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<InventoryFilter>,
) -> ApiResult<Json<Vec<InventoryItem>>> {
    Ok(Json(state.db.list_inventory(filter).await?))
}

/// GET /api/inventory/low-stock
/// Items whose quantity is at or below `minimum_stock`
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Json<Vec<InventoryItem>>> {
    Ok(Json(state.db.low_stock_items().await?))
}

/// GET /api/inventory/:id
pub async fn get_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<InventoryItem>> {
    Ok(Json(state.db.get_inventory_item(id).await?))
}

/// POST /api/inventory
pub async fn create_item(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<InventoryPayload>,
) -> ApiResult<(StatusCode, Json<InventoryItem>)> {
    let new = payload.into_new()?;
    let item = state.db.create_inventory_item(new).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/inventory/:id
pub async fn update_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<InventoryPayload>,
) -> ApiResult<Json<InventoryItem>> {
    let changes = payload.into_changes()?;
    Ok(Json(state.db.update_inventory_item(id, changes).await?))
}

/// DELETE /api/inventory/:id
pub async fn delete_item(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.db.delete_inventory_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
