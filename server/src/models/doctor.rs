use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{assign, hhmm};
use crate::error::{ApiError, ApiResult};
use crate::validation::{max_len, non_blank, parse_date, parse_time, required_str, validate_email, validate_phone};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Default)]
pub struct DoctorChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl DoctorPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("first_name", self.first_name.as_deref(), 50)?;
        max_len("last_name", self.last_name.as_deref(), 50)?;
        max_len("specialization", self.specialization.as_deref(), 100)?;
        max_len("phone", self.phone.as_deref(), 20)?;
        max_len("email", self.email.as_deref(), 100)?;
        Ok(())
    }

    pub fn into_new(self) -> ApiResult<NewDoctor> {
        self.check_lengths()?;
        let first_name = required_str(self.first_name, "first_name")?;
        let last_name = required_str(self.last_name, "last_name")?;
        let specialization = required_str(self.specialization, "specialization")?;
        let phone = required_str(self.phone, "phone")?;
        let email = required_str(self.email, "email")?;
        validate_phone("phone", &phone)?;
        validate_email("email", &email)?;

        Ok(NewDoctor {
            first_name,
            last_name,
            specialization,
            phone,
            email,
        })
    }

    pub fn into_changes(self) -> ApiResult<DoctorChanges> {
        self.check_lengths()?;
        let phone = non_blank(self.phone, "phone")?;
        if let Some(phone) = &phone {
            validate_phone("phone", phone)?;
        }
        let email = non_blank(self.email, "email")?;
        if let Some(email) = &email {
            validate_email("email", email)?;
        }

        Ok(DoctorChanges {
            first_name: non_blank(self.first_name, "first_name")?,
            last_name: non_blank(self.last_name, "last_name")?,
            specialization: non_blank(self.specialization, "specialization")?,
            phone,
            email,
        })
    }
}

impl DoctorChanges {
    pub fn apply(self, doctor: &mut Doctor) {
        assign(&mut doctor.first_name, self.first_name);
        assign(&mut doctor.last_name, self.last_name);
        assign(&mut doctor.specialization, self.specialization);
        assign(&mut doctor.phone, self.phone);
        assign(&mut doctor.email, self.email);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DoctorFilter {
    pub specialization: Option<String>,
}

/// `GET /doctors/:id/availability` query string
#[derive(Debug, Default, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
    pub time: Option<String>,
}

impl AvailabilityQuery {
    pub fn slot(self) -> ApiResult<(NaiveDate, NaiveTime)> {
        match (self.date.filter(|d| !d.is_empty()), self.time.filter(|t| !t.is_empty())) {
            (Some(date), Some(time)) => Ok((parse_date("date", &date)?, parse_time("time", &time)?)),
            _ => Err(ApiError::BadRequest("Date and time are required".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorAvailability {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub is_available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> DoctorPayload {
        DoctorPayload {
            first_name: Some("Gregory".into()),
            last_name: Some("House".into()),
            specialization: Some("Diagnostics".into()),
            phone: Some("+15551234567".into()),
            email: Some("house@example.com".into()),
        }
    }

    #[test]
    fn test_valid_doctor() {
        let new = payload().into_new().unwrap();
        assert_eq!(new.specialization, "Diagnostics");
    }

    #[test]
    fn test_email_is_required() {
        let err = DoctorPayload {
            email: Some(String::new()),
            ..payload()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: email");
    }

    #[test]
    fn test_phone_format() {
        let err = DoctorPayload {
            phone: Some("555-CALL".into()),
            ..payload()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid phone number format");
    }

    #[test]
    fn test_availability_requires_date_and_time() {
        let err = AvailabilityQuery {
            date: Some("2026-01-10".into()),
            time: None,
        }
        .slot()
        .unwrap_err();
        assert_eq!(err.to_string(), "Date and time are required");

        let (date, time) = AvailabilityQuery {
            date: Some("2026-01-10".into()),
            time: Some("10:30".into()),
        }
        .slot()
        .unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
    }
}
