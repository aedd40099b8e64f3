use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ensure_active, Database, Entity};
use crate::error::{ApiError, ApiResult};
use crate::models::{LabTest, LabTestChanges, LabTestFilter, NewLabTest};

impl Database {
    pub async fn list_lab_tests(&self, filter: LabTestFilter) -> ApiResult<Vec<LabTest>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM lab_tests WHERE is_active");
        if let Some(patient_id) = filter.patient_id {
            query.push(" AND patient_id = ").push_bind(patient_id);
        }
        if let Some(doctor_id) = filter.doctor_id {
            query.push(" AND doctor_id = ").push_bind(doctor_id);
        }
        if let Some(status) = filter.status.filter(|s| !s.is_empty()) {
            query.push(" AND status = ").push_bind(status);
        }
        query.push(" ORDER BY created_at DESC");

        let tests = query.build_query_as::<LabTest>().fetch_all(&self.pool).await?;
        tracing::debug!("Fetched {} lab tests", tests.len());
        Ok(tests)
    }

    pub async fn get_lab_test(&self, id: Uuid) -> ApiResult<LabTest> {
        sqlx::query_as::<_, LabTest>("SELECT * FROM lab_tests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Lab test", id))
    }

    pub async fn create_lab_test(&self, new: NewLabTest) -> ApiResult<LabTest> {
        let mut tx = self.pool.begin().await?;

        ensure_active(&mut *tx, Entity::Patient, new.patient_id).await?;
        ensure_active(&mut *tx, Entity::Doctor, new.doctor_id).await?;

        let test = sqlx::query_as::<_, LabTest>(
            "INSERT INTO lab_tests
                 (id, patient_id, doctor_id, test_name, test_type, test_date, results, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .bind(&new.test_name)
        .bind(&new.test_type)
        .bind(new.test_date)
        .bind(&new.results)
        .bind(new.status.as_str())
        .bind(&new.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Lab test created: {}", test.id);
        Ok(test)
    }

    pub async fn update_lab_test(&self, id: Uuid, changes: LabTestChanges) -> ApiResult<LabTest> {
        let mut tx = self.pool.begin().await?;

        let mut test = sqlx::query_as::<_, LabTest>("SELECT * FROM lab_tests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("Lab test", id))?;

        if let Some(patient_id) = changes.patient_id {
            ensure_active(&mut *tx, Entity::Patient, patient_id).await?;
        }
        if let Some(doctor_id) = changes.doctor_id {
            ensure_active(&mut *tx, Entity::Doctor, doctor_id).await?;
        }
        changes.apply(&mut test);

        let test = sqlx::query_as::<_, LabTest>(
            "UPDATE lab_tests
             SET patient_id = $2, doctor_id = $3, test_name = $4, test_type = $5, test_date = $6,
                 results = $7, status = $8, notes = $9, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(test.patient_id)
        .bind(test.doctor_id)
        .bind(&test.test_name)
        .bind(&test.test_type)
        .bind(test.test_date)
        .bind(&test.results)
        .bind(&test.status)
        .bind(&test.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Lab test updated: {}", id);
        Ok(test)
    }

    pub async fn delete_lab_test(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(Entity::LabTest, id, &[]).await
    }
}
