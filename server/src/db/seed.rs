//! Sample rows for a fresh database. Each table is only seeded while empty.

use chrono::NaiveDate;
use uuid::Uuid;

use super::Database;
use crate::error::ApiResult;
use crate::models::{Gender, NewDoctor, NewMedication, NewPatient, NewPrescription};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

pub fn sample_patients() -> Vec<NewPatient> {
    vec![
        NewPatient {
            first_name: "John".into(),
            last_name: "Doe".into(),
            date_of_birth: date(1990, 1, 1),
            gender: Gender::Male,
            address: "123 Main St".into(),
            phone: "9876543210".into(),
            email: "john@example.com".into(),
        },
        NewPatient {
            first_name: "Jane".into(),
            last_name: "Smith".into(),
            date_of_birth: date(1985, 5, 15),
            gender: Gender::Female,
            address: "456 Oak Ave".into(),
            phone: "8765432109".into(),
            email: "jane@example.com".into(),
        },
    ]
}

pub fn sample_doctors() -> Vec<NewDoctor> {
    vec![
        NewDoctor {
            first_name: "Sarah".into(),
            last_name: "Wilson".into(),
            specialization: "Cardiology".into(),
            phone: "+919812345670".into(),
            email: "sarah.wilson@hospital.example".into(),
        },
        NewDoctor {
            first_name: "Michael".into(),
            last_name: "Chen".into(),
            specialization: "Pediatrics".into(),
            phone: "+919812345671".into(),
            email: "michael.chen@hospital.example".into(),
        },
    ]
}

fn sample_medications() -> Vec<NewMedication> {
    vec![
        NewMedication {
            name: "Amoxicillin".into(),
            dosage: "500mg".into(),
            frequency: "Three times daily".into(),
            duration: Some("7 days".into()),
            instructions: Some("Take after meals".into()),
        },
        NewMedication {
            name: "Paracetamol".into(),
            dosage: "650mg".into(),
            frequency: "As needed".into(),
            duration: Some("5 days".into()),
            instructions: Some("Not more than 4 doses a day".into()),
        },
    ]
}

async fn is_empty(db: &Database, table: &str) -> ApiResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(&format!("SELECT EXISTS (SELECT 1 FROM {})", table))
        .fetch_one(db.pool())
        .await?;
    Ok(!exists)
}

async fn first_active(db: &Database, table: &str) -> ApiResult<Option<Uuid>> {
    let id = sqlx::query_scalar::<_, Uuid>(&format!(
        "SELECT id FROM {} WHERE is_active ORDER BY created_at LIMIT 1",
        table
    ))
    .fetch_optional(db.pool())
    .await?;
    Ok(id)
}

/// Insert the sample patients, doctors and one prescription into empty tables
pub async fn seed_sample_data(db: &Database) -> ApiResult<()> {
    if is_empty(db, "patients").await? {
        for patient in sample_patients() {
            db.create_patient(patient).await?;
        }
    }
    if is_empty(db, "doctors").await? {
        for doctor in sample_doctors() {
            db.create_doctor(doctor).await?;
        }
    }

    if is_empty(db, "prescriptions").await? {
        let patient = first_active(db, "patients").await?;
        let doctor = first_active(db, "doctors").await?;
        if let (Some(patient_id), Some(doctor_id)) = (patient, doctor) {
            db.create_prescription(NewPrescription {
                patient_id,
                doctor_id,
                diagnosis: "Acute bronchitis".into(),
                notes: Some("Review after one week".into()),
                medications: sample_medications(),
            })
            .await?;
        }
    }

    tracing::info!("✓ Sample data ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate_email, validate_mobile, validate_phone};

    #[test]
    fn test_samples_pass_validation() {
        for patient in sample_patients() {
            assert!(validate_mobile("phone", &patient.phone).is_ok());
            assert!(validate_email("email", &patient.email).is_ok());
        }
        for doctor in sample_doctors() {
            assert!(validate_phone("phone", &doctor.phone).is_ok());
            assert!(validate_email("email", &doctor.email).is_ok());
        }
        assert_eq!(sample_medications().len(), 2);
    }
}
