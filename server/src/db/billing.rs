use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ensure_active, Database, Entity};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    BillingFilter, BillingItem, BillingItemChanges, BillingRecord, BillingRecordChanges,
    NewBillingItem, NewBillingRecord,
};

impl Database {
    pub async fn list_billing_records(&self, filter: BillingFilter) -> ApiResult<Vec<BillingRecord>> {
        let mut query =
            QueryBuilder::<Postgres>::new("SELECT * FROM billing_records WHERE is_active");
        if let Some(patient_id) = filter.patient_id {
            query.push(" AND patient_id = ").push_bind(patient_id);
        }
        if let Some(status) = filter.payment_status.filter(|s| !s.is_empty()) {
            query.push(" AND payment_status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at");

        let records = query
            .build_query_as::<BillingRecord>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!("Fetched {} billing records", records.len());
        Ok(records)
    }

    pub async fn get_billing_record(&self, id: Uuid) -> ApiResult<BillingRecord> {
        sqlx::query_as::<_, BillingRecord>("SELECT * FROM billing_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Billing record", id))
    }

    pub async fn create_billing_record(&self, new: NewBillingRecord) -> ApiResult<BillingRecord> {
        let mut tx = self.pool.begin().await?;

        ensure_active(&mut *tx, Entity::Patient, new.patient_id).await?;
        if let Some(appointment_id) = new.appointment_id {
            ensure_active(&mut *tx, Entity::Appointment, appointment_id).await?;
        }

        let record = sqlx::query_as::<_, BillingRecord>(
            "INSERT INTO billing_records
                 (id, patient_id, appointment_id, total_amount, paid_amount, payment_status,
                  payment_method, insurance_provider, insurance_policy_number, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.patient_id)
        .bind(new.appointment_id)
        .bind(new.total_amount)
        .bind(new.paid_amount)
        .bind(new.payment_status.as_str())
        .bind(&new.payment_method)
        .bind(&new.insurance_provider)
        .bind(&new.insurance_policy_number)
        .bind(&new.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Billing record created: {}", record.id);
        Ok(record)
    }

    pub async fn update_billing_record(
        &self,
        id: Uuid,
        changes: BillingRecordChanges,
    ) -> ApiResult<BillingRecord> {
        let mut tx = self.pool.begin().await?;

        let mut record = sqlx::query_as::<_, BillingRecord>(
            "SELECT * FROM billing_records WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Billing record", id))?;

        if let Some(patient_id) = changes.patient_id {
            ensure_active(&mut *tx, Entity::Patient, patient_id).await?;
        }
        if let Some(appointment_id) = changes.appointment_id {
            ensure_active(&mut *tx, Entity::Appointment, appointment_id).await?;
        }
        changes.apply(&mut record);

        let record = sqlx::query_as::<_, BillingRecord>(
            "UPDATE billing_records
             SET patient_id = $2, appointment_id = $3, total_amount = $4, paid_amount = $5,
                 payment_status = $6, payment_method = $7, insurance_provider = $8,
                 insurance_policy_number = $9, notes = $10, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(record.patient_id)
        .bind(record.appointment_id)
        .bind(record.total_amount)
        .bind(record.paid_amount)
        .bind(&record.payment_status)
        .bind(&record.payment_method)
        .bind(&record.insurance_provider)
        .bind(&record.insurance_policy_number)
        .bind(&record.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Billing record updated: {}", id);
        Ok(record)
    }

    pub async fn delete_billing_record(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(
            Entity::BillingRecord,
            id,
            &["UPDATE billing_items SET is_active = FALSE, updated_at = NOW()
               WHERE billing_record_id = $1 AND is_active"],
        )
        .await
    }

    /// Active items of a record; 404 when the record itself is unknown
    pub async fn list_billing_items(&self, record_id: Uuid) -> ApiResult<Vec<BillingItem>> {
        self.get_billing_record(record_id).await?;

        let items = sqlx::query_as::<_, BillingItem>(
            "SELECT * FROM billing_items
             WHERE billing_record_id = $1 AND is_active
             ORDER BY created_at",
        )
        .bind(record_id)
        .fetch_all(&self.pool)
        .await?;
        tracing::debug!("Fetched {} items for billing record {}", items.len(), record_id);
        Ok(items)
    }

    pub async fn create_billing_item(
        &self,
        record_id: Uuid,
        new: NewBillingItem,
    ) -> ApiResult<BillingItem> {
        let mut tx = self.pool.begin().await?;

        let active = sqlx::query_scalar::<_, bool>(
            "SELECT is_active FROM billing_records WHERE id = $1 FOR SHARE",
        )
        .bind(record_id)
        .fetch_optional(&mut *tx)
        .await?;
        match active {
            None => return Err(ApiError::not_found("Billing record", record_id)),
            Some(false) => {
                return Err(ApiError::BadRequest(format!(
                    "Billing record with ID {} is inactive",
                    record_id
                )))
            }
            Some(true) => {}
        }

        let item = sqlx::query_as::<_, BillingItem>(
            "INSERT INTO billing_items
                 (id, billing_record_id, item_type, description, quantity, unit_price, total_price)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(record_id)
        .bind(&new.item_type)
        .bind(&new.description)
        .bind(new.quantity)
        .bind(new.unit_price)
        .bind(new.total_price())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Billing item created: {} (record {})", item.id, record_id);
        Ok(item)
    }

    pub async fn update_billing_item(
        &self,
        id: Uuid,
        changes: BillingItemChanges,
    ) -> ApiResult<BillingItem> {
        let mut tx = self.pool.begin().await?;

        let mut item =
            sqlx::query_as::<_, BillingItem>("SELECT * FROM billing_items WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ApiError::not_found("Billing item", id))?;
        changes.apply(&mut item);

        let item = sqlx::query_as::<_, BillingItem>(
            "UPDATE billing_items
             SET item_type = $2, description = $3, quantity = $4, unit_price = $5,
                 total_price = $6, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&item.item_type)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_price)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Billing item updated: {}", id);
        Ok(item)
    }

    pub async fn delete_billing_item(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(Entity::BillingItem, id, &[]).await
    }
}
