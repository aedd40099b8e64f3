use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{assign, hhmm};
use crate::error::ApiResult;
use crate::validation::{max_len, non_blank, one_of, parse_date, parse_time, required, required_str};

/// Appointment row joined with the patient's and doctor's display names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub status: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub patient_name: String,
    pub doctor_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

const STATUS_MESSAGE: &str = "Status must be scheduled, completed, or cancelled";

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentPayload {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default)]
pub struct AppointmentChanges {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

fn parse_status(value: &str) -> ApiResult<AppointmentStatus> {
    one_of("status", value, AppointmentStatus::parse, STATUS_MESSAGE)
}

impl AppointmentPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("notes", self.notes.as_deref(), 500)?;
        Ok(())
    }

    pub fn into_new(self) -> ApiResult<NewAppointment> {
        self.check_lengths()?;
        let patient_id = required(self.patient_id, "patient_id")?;
        let doctor_id = required(self.doctor_id, "doctor_id")?;
        let date = required_str(self.date, "date")?;
        let time = required_str(self.time, "time")?;

        Ok(NewAppointment {
            patient_id,
            doctor_id,
            date: parse_date("date", &date)?,
            time: parse_time("time", &time)?,
            status: self
                .status
                .map(|s| parse_status(&s))
                .transpose()?
                .unwrap_or(AppointmentStatus::Scheduled),
            notes: self.notes,
        })
    }

    pub fn into_changes(self) -> ApiResult<AppointmentChanges> {
        self.check_lengths()?;
        Ok(AppointmentChanges {
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            date: non_blank(self.date, "date")?
                .map(|d| parse_date("date", &d))
                .transpose()?,
            time: non_blank(self.time, "time")?
                .map(|t| parse_time("time", &t))
                .transpose()?,
            status: self.status.map(|s| parse_status(&s)).transpose()?,
            notes: self.notes,
        })
    }
}

impl AppointmentChanges {
    /// Whether the doctor's slot moves, so the booking must be re-checked
    pub fn moves_slot(&self) -> bool {
        self.doctor_id.is_some()
            || self.date.is_some()
            || self.time.is_some()
            || self.status == Some(AppointmentStatus::Scheduled)
    }

    pub fn apply(self, appointment: &mut Appointment) {
        assign(&mut appointment.patient_id, self.patient_id);
        assign(&mut appointment.doctor_id, self.doctor_id);
        assign(&mut appointment.date, self.date);
        assign(&mut appointment.time, self.time);
        assign(&mut appointment.status, self.status.map(|s| s.as_str().to_string()));
        assign(&mut appointment.notes, self.notes.map(Some));
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<String>,
    pub date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> AppointmentPayload {
        AppointmentPayload {
            patient_id: Some(Uuid::new_v4()),
            doctor_id: Some(Uuid::new_v4()),
            date: Some("2026-11-02".into()),
            time: Some("09:30".into()),
            status: None,
            notes: Some("Follow-up".into()),
        }
    }

    #[test]
    fn test_status_defaults_to_scheduled() {
        let new = payload().into_new().unwrap();
        assert_eq!(new.status, AppointmentStatus::Scheduled);
        assert_eq!(new.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn test_bad_status_and_time() {
        let err = AppointmentPayload {
            status: Some("done".into()),
            ..payload()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), STATUS_MESSAGE);

        let err = AppointmentPayload {
            time: Some("9:30pm".into()),
            ..payload()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid time format. Use HH:MM");
    }

    #[test]
    fn test_missing_doctor() {
        let err = AppointmentPayload {
            doctor_id: None,
            ..payload()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: doctor_id");
    }

    #[test]
    fn test_apply_status_change() {
        let now = Utc::now();
        let mut appointment = Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            status: "scheduled".into(),
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            patient_name: "John Doe".into(),
            doctor_name: "Gregory House".into(),
        };
        let changes = AppointmentPayload {
            status: Some("completed".into()),
            notes: Some("Seen".into()),
            ..Default::default()
        }
        .into_changes()
        .unwrap();
        assert!(!changes.moves_slot());
        changes.apply(&mut appointment);

        assert_eq!(appointment.status, "completed");
        assert_eq!(appointment.notes.as_deref(), Some("Seen"));
        assert_eq!(appointment.date, NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());
    }

    #[test]
    fn test_serialized_time_is_hhmm() {
        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::nil(),
            patient_id: Uuid::nil(),
            doctor_id: Uuid::nil(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            status: "scheduled".into(),
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
            patient_name: "John Doe".into(),
            doctor_name: "Gregory House".into(),
        };
        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["time"], "16:00");
        assert_eq!(json["date"], "2026-11-02");
        assert_eq!(json["patient_name"], "John Doe");
    }
}
