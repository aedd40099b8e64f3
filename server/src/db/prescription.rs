use std::collections::HashMap;

use sqlx::PgConnection;
use uuid::Uuid;

use super::{ensure_active, Database, Entity};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Medication, NewMedication, NewPrescription, Prescription, PrescriptionChanges,
    PrescriptionRecord,
};

async fn insert_medications(
    conn: &mut PgConnection,
    prescription_id: Uuid,
    medications: &[NewMedication],
) -> ApiResult<()> {
    for medication in medications {
        sqlx::query(
            "INSERT INTO medications
                 (id, prescription_id, name, dosage, frequency, duration, instructions,
                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, clock_timestamp(), clock_timestamp())",
        )
        .bind(Uuid::new_v4())
        .bind(prescription_id)
        .bind(&medication.name)
        .bind(&medication.dosage)
        .bind(&medication.frequency)
        .bind(&medication.duration)
        .bind(&medication.instructions)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Pair each record with its active medications, keeping the record order.
/// Medications come back in insertion order (`clock_timestamp()` on insert).
async fn with_medications(
    conn: &mut PgConnection,
    records: Vec<PrescriptionRecord>,
) -> ApiResult<Vec<Prescription>> {
    let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
    let medications = sqlx::query_as::<_, Medication>(
        "SELECT * FROM medications
         WHERE prescription_id = ANY($1) AND is_active
         ORDER BY created_at",
    )
    .bind(&ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut by_prescription: HashMap<Uuid, Vec<Medication>> = HashMap::new();
    for medication in medications {
        by_prescription
            .entry(medication.prescription_id)
            .or_default()
            .push(medication);
    }

    Ok(records
        .into_iter()
        .map(|record| Prescription {
            medications: by_prescription.remove(&record.id).unwrap_or_default(),
            record,
        })
        .collect())
}

impl Database {
    pub async fn list_prescriptions(&self) -> ApiResult<Vec<Prescription>> {
        let mut conn = self.pool.acquire().await?;
        let records = sqlx::query_as::<_, PrescriptionRecord>(
            "SELECT * FROM prescriptions WHERE is_active ORDER BY created_at DESC",
        )
        .fetch_all(&mut *conn)
        .await?;

        let prescriptions = with_medications(&mut *conn, records).await?;
        tracing::debug!("Fetched {} prescriptions", prescriptions.len());
        Ok(prescriptions)
    }

    /// 404 for an unknown patient, 400 for an inactive one
    pub async fn list_patient_prescriptions(&self, patient_id: Uuid) -> ApiResult<Vec<Prescription>> {
        let mut conn = self.pool.acquire().await?;

        let active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM patients WHERE id = $1")
            .bind(patient_id)
            .fetch_optional(&mut *conn)
            .await?;
        match active {
            None => return Err(ApiError::not_found("Patient", patient_id)),
            Some(false) => {
                return Err(ApiError::BadRequest(format!(
                    "Patient with ID {} is inactive",
                    patient_id
                )))
            }
            Some(true) => {}
        }

        let records = sqlx::query_as::<_, PrescriptionRecord>(
            "SELECT * FROM prescriptions
             WHERE patient_id = $1 AND is_active
             ORDER BY created_at DESC",
        )
        .bind(patient_id)
        .fetch_all(&mut *conn)
        .await?;

        with_medications(&mut *conn, records).await
    }

    pub async fn get_prescription(&self, id: Uuid) -> ApiResult<Prescription> {
        let mut conn = self.pool.acquire().await?;
        let record =
            sqlx::query_as::<_, PrescriptionRecord>("SELECT * FROM prescriptions WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| ApiError::not_found("Prescription", id))?;

        let mut found = with_medications(&mut *conn, vec![record]).await?;
        found
            .pop()
            .ok_or_else(|| ApiError::Internal(format!("prescription {} vanished while loading", id)))
    }

    /// Inserts the prescription and its medications atomically
    pub async fn create_prescription(&self, new: NewPrescription) -> ApiResult<Prescription> {
        let mut tx = self.pool.begin().await?;

        ensure_active(&mut *tx, Entity::Patient, new.patient_id).await?;
        ensure_active(&mut *tx, Entity::Doctor, new.doctor_id).await?;

        let record = sqlx::query_as::<_, PrescriptionRecord>(
            "INSERT INTO prescriptions (id, patient_id, doctor_id, diagnosis, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .bind(&new.diagnosis)
        .bind(&new.notes)
        .fetch_one(&mut *tx)
        .await?;
        insert_medications(&mut *tx, record.id, &new.medications).await?;

        let mut created = with_medications(&mut *tx, vec![record]).await?;
        tx.commit().await?;

        let prescription = created
            .pop()
            .ok_or_else(|| ApiError::Internal("created prescription missing".to_string()))?;
        tracing::info!(
            "✓ Prescription created: {} ({} medications)",
            prescription.record.id,
            prescription.medications.len()
        );
        Ok(prescription)
    }

    /// Updates scalar fields; a supplied medication list replaces the active one
    pub async fn update_prescription(
        &self,
        id: Uuid,
        mut changes: PrescriptionChanges,
    ) -> ApiResult<Prescription> {
        let mut tx = self.pool.begin().await?;

        let mut record = sqlx::query_as::<_, PrescriptionRecord>(
            "SELECT * FROM prescriptions WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Prescription", id))?;
        if !record.is_active {
            return Err(ApiError::BadRequest(format!("Prescription with ID {} is inactive", id)));
        }
        changes.apply(&mut record);

        let record = sqlx::query_as::<_, PrescriptionRecord>(
            "UPDATE prescriptions SET diagnosis = $2, notes = $3, updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&record.diagnosis)
        .bind(&record.notes)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(medications) = changes.medications {
            sqlx::query(
                "UPDATE medications SET is_active = FALSE, updated_at = NOW()
                 WHERE prescription_id = $1 AND is_active",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
            insert_medications(&mut *tx, id, &medications).await?;
        }

        let mut updated = with_medications(&mut *tx, vec![record]).await?;
        tx.commit().await?;

        tracing::info!("✓ Prescription updated: {}", id);
        updated
            .pop()
            .ok_or_else(|| ApiError::Internal(format!("prescription {} vanished while updating", id)))
    }

    pub async fn delete_prescription(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(
            Entity::Prescription,
            id,
            &["UPDATE medications SET is_active = FALSE, updated_at = NOW()
               WHERE prescription_id = $1 AND is_active"],
        )
        .await
    }
}
