use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Database, Entity};
use crate::error::{ApiError, ApiResult};
use crate::models::{NewPatient, Patient, PatientChanges, PatientFilter};

impl Database {
    pub async fn list_patients(&self, filter: PatientFilter) -> ApiResult<Vec<Patient>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM patients WHERE is_active");
        if let Some(search) = filter.search.filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            query
                .push(" AND (first_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR last_name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR (first_name || ' ' || last_name) ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        query.push(" ORDER BY created_at");

        let patients = query.build_query_as::<Patient>().fetch_all(&self.pool).await?;
        tracing::debug!("Fetched {} patients", patients.len());
        Ok(patients)
    }

    pub async fn get_patient(&self, id: Uuid) -> ApiResult<Patient> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Patient", id))
    }

    pub async fn create_patient(&self, new: NewPatient) -> ApiResult<Patient> {
        let patient = sqlx::query_as::<_, Patient>(
            "INSERT INTO patients (id, first_name, last_name, date_of_birth, gender, address, phone, email)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.date_of_birth)
        .bind(new.gender.as_str())
        .bind(&new.address)
        .bind(&new.phone)
        .bind(&new.email)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("✓ Patient created: {}", patient.id);
        Ok(patient)
    }

    pub async fn update_patient(&self, id: Uuid, changes: PatientChanges) -> ApiResult<Patient> {
        let mut tx = self.pool.begin().await?;

        let mut patient =
            sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| ApiError::not_found("Patient", id))?;
        changes.apply(&mut patient);

        let patient = sqlx::query_as::<_, Patient>(
            "UPDATE patients
             SET first_name = $2, last_name = $3, date_of_birth = $4, gender = $5,
                 address = $6, phone = $7, email = $8, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(patient.date_of_birth)
        .bind(&patient.gender)
        .bind(&patient.address)
        .bind(&patient.phone)
        .bind(&patient.email)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Patient updated: {}", id);
        Ok(patient)
    }

    /// Deactivates the patient and everything recorded against them
    pub async fn delete_patient(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(
            Entity::Patient,
            id,
            &[
                "UPDATE appointments SET is_active = FALSE, updated_at = NOW()
                 WHERE patient_id = $1 AND is_active",
                "UPDATE medications SET is_active = FALSE, updated_at = NOW()
                 WHERE is_active AND prescription_id IN (SELECT id FROM prescriptions WHERE patient_id = $1)",
                "UPDATE prescriptions SET is_active = FALSE, updated_at = NOW()
                 WHERE patient_id = $1 AND is_active",
                "UPDATE lab_tests SET is_active = FALSE, updated_at = NOW()
                 WHERE patient_id = $1 AND is_active",
                "UPDATE billing_items SET is_active = FALSE, updated_at = NOW()
                 WHERE is_active AND billing_record_id IN (SELECT id FROM billing_records WHERE patient_id = $1)",
                "UPDATE billing_records SET is_active = FALSE, updated_at = NOW()
                 WHERE patient_id = $1 AND is_active",
            ],
        )
        .await
    }
}
