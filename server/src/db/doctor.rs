use chrono::{NaiveDate, NaiveTime};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Database, Entity};
use crate::error::{ApiError, ApiResult};
use crate::models::{Doctor, DoctorAvailability, DoctorChanges, DoctorFilter, NewDoctor};

impl Database {
    pub async fn list_doctors(&self, filter: DoctorFilter) -> ApiResult<Vec<Doctor>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT * FROM doctors WHERE is_active");
        if let Some(specialization) = filter.specialization.filter(|s| !s.is_empty()) {
            query
                .push(" AND specialization ILIKE ")
                .push_bind(specialization);
        }
        query.push(" ORDER BY created_at");

        let doctors = query.build_query_as::<Doctor>().fetch_all(&self.pool).await?;
        tracing::debug!("Fetched {} doctors", doctors.len());
        Ok(doctors)
    }

    pub async fn get_doctor(&self, id: Uuid) -> ApiResult<Doctor> {
        sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Doctor", id))
    }

    pub async fn create_doctor(&self, new: NewDoctor) -> ApiResult<Doctor> {
        let doctor = sqlx::query_as::<_, Doctor>(
            "INSERT INTO doctors (id, first_name, last_name, specialization, phone, email)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.specialization)
        .bind(&new.phone)
        .bind(&new.email)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("✓ Doctor created: {}", doctor.id);
        Ok(doctor)
    }

    pub async fn update_doctor(&self, id: Uuid, changes: DoctorChanges) -> ApiResult<Doctor> {
        let mut tx = self.pool.begin().await?;

        let mut doctor = sqlx::query_as::<_, Doctor>("SELECT * FROM doctors WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ApiError::not_found("Doctor", id))?;
        changes.apply(&mut doctor);

        let doctor = sqlx::query_as::<_, Doctor>(
            "UPDATE doctors
             SET first_name = $2, last_name = $3, specialization = $4, phone = $5, email = $6,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&doctor.first_name)
        .bind(&doctor.last_name)
        .bind(&doctor.specialization)
        .bind(&doctor.phone)
        .bind(&doctor.email)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!("✓ Doctor updated: {}", id);
        Ok(doctor)
    }

    pub async fn delete_doctor(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(
            Entity::Doctor,
            id,
            &[
                "UPDATE appointments SET is_active = FALSE, updated_at = NOW()
                 WHERE doctor_id = $1 AND is_active",
                "UPDATE medications SET is_active = FALSE, updated_at = NOW()
                 WHERE is_active AND prescription_id IN (SELECT id FROM prescriptions WHERE doctor_id = $1)",
                "UPDATE prescriptions SET is_active = FALSE, updated_at = NOW()
                 WHERE doctor_id = $1 AND is_active",
                "UPDATE lab_tests SET is_active = FALSE, updated_at = NOW()
                 WHERE doctor_id = $1 AND is_active",
            ],
        )
        .await
    }

    /// A slot is free unless an active, scheduled appointment already holds it
    pub async fn doctor_availability(
        &self,
        id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
    ) -> ApiResult<DoctorAvailability> {
        let active = sqlx::query_scalar::<_, bool>("SELECT is_active FROM doctors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        if active != Some(true) {
            return Err(ApiError::not_found("Doctor", id));
        }

        let booked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1 FROM appointments
                 WHERE doctor_id = $1 AND date = $2 AND time = $3
                   AND status = 'scheduled' AND is_active
             )",
        )
        .bind(id)
        .bind(date)
        .bind(time)
        .fetch_one(&self.pool)
        .await?;

        Ok(DoctorAvailability {
            doctor_id: id,
            date,
            time,
            is_available: !booked,
        })
    }
}
