use chrono::{NaiveDate, NaiveTime};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{ensure_active, Database, Entity};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    Appointment, AppointmentChanges, AppointmentFilter, AppointmentStatus, NewAppointment,
};
use crate::validation::parse_date;

/// Selects appointment columns plus display names from `source` aliased as `a`
fn with_names(source: &str) -> String {
    format!(
        "SELECT a.*,
                p.first_name || ' ' || p.last_name AS patient_name,
                d.first_name || ' ' || d.last_name AS doctor_name
         FROM {} a
         JOIN patients p ON p.id = a.patient_id
         JOIN doctors d ON d.id = a.doctor_id",
        source
    )
}

/// Partial unique index backing the slot check under concurrent bookings
const SLOT_INDEX: &str = "uq_appointments_scheduled_slot";

fn slot_taken(date: NaiveDate, time: NaiveTime) -> ApiError {
    ApiError::Conflict(format!(
        "Doctor already has an appointment on {} at {}",
        date,
        time.format("%H:%M")
    ))
}

/// Maps a write that lost the race for a slot to the same 409 as the pre-check
fn map_slot_violation(err: sqlx::Error, date: NaiveDate, time: NaiveTime) -> ApiError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.constraint() == Some(SLOT_INDEX) => {
            slot_taken(date, time)
        }
        _ => err.into(),
    }
}

/// 409 when the doctor already holds an active scheduled booking in that slot
async fn ensure_slot_free(
    conn: &mut PgConnection,
    doctor_id: Uuid,
    date: NaiveDate,
    time: NaiveTime,
    exclude: Option<Uuid>,
) -> ApiResult<()> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (
             SELECT 1 FROM appointments
             WHERE doctor_id = $1 AND date = $2 AND time = $3
               AND status = 'scheduled' AND is_active
               AND ($4::uuid IS NULL OR id <> $4)
         )",
    )
    .bind(doctor_id)
    .bind(date)
    .bind(time)
    .bind(exclude)
    .fetch_one(&mut *conn)
    .await?;

    if taken {
        return Err(slot_taken(date, time));
    }
    Ok(())
}

impl Database {
    pub async fn list_appointments(&self, filter: AppointmentFilter) -> ApiResult<Vec<Appointment>> {
        let mut query = QueryBuilder::<Postgres>::new(with_names("appointments"));
        query.push(" WHERE a.is_active");
        if let Some(patient_id) = filter.patient_id {
            query.push(" AND a.patient_id = ").push_bind(patient_id);
        }
        if let Some(doctor_id) = filter.doctor_id {
            query.push(" AND a.doctor_id = ").push_bind(doctor_id);
        }
        if let Some(status) = filter.status.filter(|s| !s.is_empty()) {
            query.push(" AND a.status = ").push_bind(status);
        }
        if let Some(date) = filter.date.filter(|d| !d.is_empty()) {
            query.push(" AND a.date = ").push_bind(parse_date("date", &date)?);
        }
        query.push(" ORDER BY a.created_at");

        let appointments = query
            .build_query_as::<Appointment>()
            .fetch_all(&self.pool)
            .await?;
        tracing::debug!("Fetched {} appointments", appointments.len());
        Ok(appointments)
    }

    pub async fn get_appointment(&self, id: Uuid) -> ApiResult<Appointment> {
        sqlx::query_as::<_, Appointment>(&format!("{} WHERE a.id = $1", with_names("appointments")))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Appointment", id))
    }

    pub async fn create_appointment(&self, new: NewAppointment) -> ApiResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        ensure_active(&mut *tx, Entity::Patient, new.patient_id).await?;
        ensure_active(&mut *tx, Entity::Doctor, new.doctor_id).await?;
        if new.status == AppointmentStatus::Scheduled {
            ensure_slot_free(&mut *tx, new.doctor_id, new.date, new.time, None).await?;
        }

        let sql = format!(
            "WITH changed AS (
                 INSERT INTO appointments (id, patient_id, doctor_id, date, time, status, notes)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING *
             ) {}",
            with_names("changed")
        );
        let appointment = sqlx::query_as::<_, Appointment>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.patient_id)
            .bind(new.doctor_id)
            .bind(new.date)
            .bind(new.time)
            .bind(new.status.as_str())
            .bind(&new.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_slot_violation(e, new.date, new.time))?;

        tx.commit().await?;
        tracing::info!("✓ Appointment created: {}", appointment.id);
        Ok(appointment)
    }

    pub async fn update_appointment(
        &self,
        id: Uuid,
        changes: AppointmentChanges,
    ) -> ApiResult<Appointment> {
        let mut tx = self.pool.begin().await?;

        let mut appointment = sqlx::query_as::<_, Appointment>(&format!(
            "{} WHERE a.id = $1 FOR UPDATE OF a",
            with_names("appointments")
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Appointment", id))?;

        if let Some(patient_id) = changes.patient_id {
            ensure_active(&mut *tx, Entity::Patient, patient_id).await?;
        }
        if let Some(doctor_id) = changes.doctor_id {
            ensure_active(&mut *tx, Entity::Doctor, doctor_id).await?;
        }
        let recheck = changes.moves_slot();
        changes.apply(&mut appointment);
        if recheck && appointment.is_active && appointment.status == "scheduled" {
            ensure_slot_free(
                &mut *tx,
                appointment.doctor_id,
                appointment.date,
                appointment.time,
                Some(id),
            )
            .await?;
        }

        let sql = format!(
            "WITH changed AS (
                 UPDATE appointments
                 SET patient_id = $2, doctor_id = $3, date = $4, time = $5, status = $6,
                     notes = $7, updated_at = NOW()
                 WHERE id = $1
                 RETURNING *
             ) {}",
            with_names("changed")
        );
        let appointment = sqlx::query_as::<_, Appointment>(&sql)
            .bind(id)
            .bind(appointment.patient_id)
            .bind(appointment.doctor_id)
            .bind(appointment.date)
            .bind(appointment.time)
            .bind(&appointment.status)
            .bind(&appointment.notes)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_slot_violation(e, appointment.date, appointment.time))?;

        tx.commit().await?;
        tracing::info!("✓ Appointment updated: {}", id);
        Ok(appointment)
    }

    pub async fn delete_appointment(&self, id: Uuid) -> ApiResult<()> {
        self.deactivate(Entity::Appointment, id, &[]).await
    }
}
