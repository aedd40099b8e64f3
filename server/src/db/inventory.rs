use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Database, Entity};
use crate::error::{ApiError, ApiResult};
use crate::models::{InventoryChanges, InventoryFilter, InventoryItem, NewInventoryItem};

impl Database {
    pub async fn list_inventory(&self, filter: InventoryFilter) -> ApiResult<Vec<InventoryItem>> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT * FROM inventory_items WHERE is_active");
        if let Some(category) = filter.category.filter(|c| !c.is_empty()) {
            query.push(" AND category = ").push_bind(category);
        }
        query.push(" ORDER BY created_at");

        let items = query
            .build_query_as::<InventoryItem>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!("Fetched {} inventory items", items.len());
        Ok(items)
    }

    /// Active items at or below their minimum stock
    pub async fn low_stock_items(&self) -> ApiResult<Vec<InventoryItem>> {
        let items = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items
             WHERE is_active AND quantity <= minimum_stock
             ORDER BY quantity, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_inventory_item(&self, id: Uuid) -> ApiResult<InventoryItem> {
        sqlx::query_as::<_, InventoryItem>("SELECT * FROM inventory_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Inventory item", id))
    }

    pub async fn create_inventory_item(&self, new: NewInventoryItem) -> ApiResult<InventoryItem> {
        let item = sqlx::query_as::<_, InventoryItem>(
            "INSERT INTO inventory_items
                 (id, name, category, quantity, unit, price_per_unit, supplier, expiry_date, minimum_stock)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.category)
        .bind(new.quantity)
        .bind(&new.unit)
        .bind(new.price_per_unit)
        .bind(&new.supplier)
        .bind(new.expiry_date)
        .bind(new.minimum_stock)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("✓ Inventory item created: {} ({})", item.id, item.name);
        Ok(item)
    }

    pub async fn update_inventory_item(
        &self,
        id: Uuid,
        changes: InventoryChanges,
    ) -> ApiResult<InventoryItem> {
        let mut tx = self.pool.begin().await?;

        let mut item = sqlx::query_as::<_, InventoryItem>(
            "SELECT * FROM inventory_items WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Inventory item", id))?;
        changes.apply(&mut item);

        let item = sqlx::query_as::<_, InventoryItem>(
            "UPDATE inventory_items
             SET name = $2, category = $3, quantity = $4, unit = $5, price_per_unit = $6,
                 supplier = $7, expiry_date = $8, minimum_stock = $9, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.price_per_unit)
        .bind(&item.supplier)
        .bind(item.expiry_date)
        .bind(item.minimum_stock)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        if item.is_low_stock() {
            tracing::warn!("Inventory item {} is low on stock ({} left)", item.name, item.quantity);
        }
        tracing::info!("✓ Inventory item updated: {}", id);
        Ok(item)
    }

    pub async fn delete_inventory_item(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(Entity::InventoryItem, id, &[]).await
    }
}
