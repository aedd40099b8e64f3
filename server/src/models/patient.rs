use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::assign;
use crate::error::ApiResult;
use crate::validation::{
    max_len, non_blank, one_of, parse_date, required_str, validate_mobile, validate_optional_email,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == value)
    }
}

const GENDER_MESSAGE: &str = "Gender must be Male, Female, or Other";

/// Request body for create and update
#[derive(Debug, Default, Deserialize)]
pub struct PatientPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Default)]
pub struct PatientChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl PatientPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("first_name", self.first_name.as_deref(), 50)?;
        max_len("last_name", self.last_name.as_deref(), 50)?;
        max_len("address", self.address.as_deref(), 200)?;
        max_len("phone", self.phone.as_deref(), 15)?;
        max_len("email", self.email.as_deref(), 100)?;
        Ok(())
    }

    pub fn into_new(self) -> ApiResult<NewPatient> {
        self.check_lengths()?;
        let first_name = required_str(self.first_name, "first_name")?;
        let last_name = required_str(self.last_name, "last_name")?;
        let date_of_birth = required_str(self.date_of_birth, "date_of_birth")?;
        let gender = required_str(self.gender, "gender")?;
        let phone = required_str(self.phone, "phone")?;

        let date_of_birth = parse_date("date_of_birth", &date_of_birth)?;
        let gender = one_of("gender", &gender, Gender::parse, GENDER_MESSAGE)?;
        validate_mobile("phone", &phone)?;
        let email = self.email.unwrap_or_default();
        validate_optional_email("email", &email)?;

        Ok(NewPatient {
            first_name,
            last_name,
            date_of_birth,
            gender,
            address: self.address.unwrap_or_default(),
            phone,
            email,
        })
    }

    pub fn into_changes(self) -> ApiResult<PatientChanges> {
        self.check_lengths()?;
        let date_of_birth = non_blank(self.date_of_birth, "date_of_birth")?
            .map(|d| parse_date("date_of_birth", &d))
            .transpose()?;
        let gender = self
            .gender
            .map(|g| one_of("gender", &g, Gender::parse, GENDER_MESSAGE))
            .transpose()?;
        let phone = non_blank(self.phone, "phone")?;
        if let Some(phone) = &phone {
            validate_mobile("phone", phone)?;
        }
        if let Some(email) = &self.email {
            validate_optional_email("email", email)?;
        }

        Ok(PatientChanges {
            first_name: non_blank(self.first_name, "first_name")?,
            last_name: non_blank(self.last_name, "last_name")?,
            date_of_birth,
            gender,
            address: self.address,
            phone,
            email: self.email,
        })
    }
}

impl PatientChanges {
    pub fn apply(self, patient: &mut Patient) {
        assign(&mut patient.first_name, self.first_name);
        assign(&mut patient.last_name, self.last_name);
        assign(&mut patient.date_of_birth, self.date_of_birth);
        assign(&mut patient.gender, self.gender.map(|g| g.as_str().to_string()));
        assign(&mut patient.address, self.address);
        assign(&mut patient.phone, self.phone);
        assign(&mut patient.email, self.email);
    }
}

/// `GET /patients` query string
#[derive(Debug, Default, Deserialize)]
pub struct PatientFilter {
    pub search: Option<String>,
}
