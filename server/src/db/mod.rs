//! Repository layer: one `impl Database` block per entity, each owning its SQL.

mod appointment;
mod billing;
mod dashboard;
mod doctor;
mod inventory;
mod lab_test;
mod patient;
mod prescription;
pub mod seed;
mod user;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::config::DbConfig;
use crate::error::{ApiError, ApiResult};

pub struct Database {
    pool: PgPool,
}

/// Tables whose rows are addressable and soft-deletable by id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Patient,
    Doctor,
    Appointment,
    BillingRecord,
    BillingItem,
    Prescription,
    LabTest,
    InventoryItem,
}

impl Entity {
    pub fn table(&self) -> &'static str {
        match self {
            Entity::Patient => "patients",
            Entity::Doctor => "doctors",
            Entity::Appointment => "appointments",
            Entity::BillingRecord => "billing_records",
            Entity::BillingItem => "billing_items",
            Entity::Prescription => "prescriptions",
            Entity::LabTest => "lab_tests",
            Entity::InventoryItem => "inventory_items",
        }
    }

    /// Name used in error messages
    pub fn label(&self) -> &'static str {
        match self {
            Entity::Patient => "Patient",
            Entity::Doctor => "Doctor",
            Entity::Appointment => "Appointment",
            Entity::BillingRecord => "Billing record",
            Entity::BillingItem => "Billing item",
            Entity::Prescription => "Prescription",
            Entity::LabTest => "Lab test",
            Entity::InventoryItem => "Inventory item",
        }
    }
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool for the given configuration
    pub async fn connect(config: &DbConfig<'_>) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.connection_string())
            .await?;
        Ok(Self::new(pool))
    }

    /// Pool that only connects on first use
    pub fn connect_lazy(config: &DbConfig<'_>) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy(&config.connection_string())?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Soft-delete `id` and run each `cascade` statement (bound to the same id)
    /// in one transaction. Already-inactive rows are accepted.
    async fn deactivate(&self, entity: Entity, id: Uuid, cascade: &[&str]) -> ApiResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query_scalar::<_, bool>(&format!(
            "SELECT is_active FROM {} WHERE id = $1 FOR UPDATE",
            entity.table()
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        if exists.is_none() {
            return Err(ApiError::not_found(entity.label(), id));
        }

        sqlx::query(&format!(
            "UPDATE {} SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active",
            entity.table()
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        for statement in cascade {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        tracing::info!("✓ {} deactivated: {}", entity.label(), id);
        Ok(())
    }
}

/// Reject references to rows that are missing or soft-deleted.
pub(crate) async fn ensure_active(
    conn: &mut PgConnection,
    entity: Entity,
    id: Uuid,
) -> ApiResult<()> {
    let active = sqlx::query_scalar::<_, bool>(&format!(
        "SELECT is_active FROM {} WHERE id = $1",
        entity.table()
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    match active {
        Some(true) => Ok(()),
        Some(false) => Err(ApiError::BadRequest(format!(
            "{} with ID {} is inactive",
            entity.label(),
            id
        ))),
        None => Err(ApiError::BadRequest(format!(
            "{} with ID {} not found",
            entity.label(),
            id
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_tables() {
        assert_eq!(Entity::LabTest.table(), "lab_tests");
        assert_eq!(Entity::BillingItem.table(), "billing_items");
        assert_eq!(Entity::InventoryItem.label(), "Inventory item");
    }
}
