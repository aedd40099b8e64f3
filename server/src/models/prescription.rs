use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::assign;
use crate::error::ApiResult;
use crate::validation::{max_len, non_blank, required, required_str};

/// `prescriptions` row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PrescriptionRecord {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Medication {
    pub id: Uuid,
    pub prescription_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: Option<String>,
    pub instructions: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A prescription together with its active medications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(flatten)]
    pub record: PrescriptionRecord,
    pub medications: Vec<Medication>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MedicationPayload {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMedication {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: Option<String>,
    pub instructions: Option<String>,
}

impl MedicationPayload {
    fn into_new(self, index: usize) -> ApiResult<NewMedication> {
        let field = |name: &str| format!("medications[{}].{}", index, name);
        max_len(&field("name"), self.name.as_deref(), 100)?;
        max_len(&field("dosage"), self.dosage.as_deref(), 50)?;
        max_len(&field("frequency"), self.frequency.as_deref(), 50)?;
        max_len(&field("duration"), self.duration.as_deref(), 50)?;
        Ok(NewMedication {
            name: required_str(self.name, &field("name"))?,
            dosage: required_str(self.dosage, &field("dosage"))?,
            frequency: required_str(self.frequency, &field("frequency"))?,
            duration: self.duration,
            instructions: self.instructions,
        })
    }
}

fn into_medications(payloads: Vec<MedicationPayload>) -> ApiResult<Vec<NewMedication>> {
    payloads
        .into_iter()
        .enumerate()
        .map(|(index, m)| m.into_new(index))
        .collect()
}

#[derive(Debug, Default, Deserialize)]
pub struct PrescriptionPayload {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub medications: Option<Vec<MedicationPayload>>,
}

#[derive(Debug, Clone)]
pub struct NewPrescription {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub diagnosis: String,
    pub notes: Option<String>,
    pub medications: Vec<NewMedication>,
}

/// Updatable prescription fields. `medications`, when present, replaces the whole list.
#[derive(Debug, Default)]
pub struct PrescriptionChanges {
    pub diagnosis: Option<String>,
    pub notes: Option<String>,
    pub medications: Option<Vec<NewMedication>>,
}

impl PrescriptionPayload {
    /// Column widths
    fn check_lengths(&self) -> ApiResult<()> {
        max_len("diagnosis", self.diagnosis.as_deref(), 200)?;
        Ok(())
    }

    pub fn into_new(self) -> ApiResult<NewPrescription> {
        self.check_lengths()?;
        let patient_id = required(self.patient_id, "patient_id")?;
        let doctor_id = required(self.doctor_id, "doctor_id")?;
        let diagnosis = required_str(self.diagnosis, "diagnosis")?;

        Ok(NewPrescription {
            patient_id,
            doctor_id,
            diagnosis,
            notes: self.notes,
            medications: into_medications(self.medications.unwrap_or_default())?,
        })
    }

    /// Patient and doctor are fixed once written; only these fields change.
    pub fn into_changes(self) -> ApiResult<PrescriptionChanges> {
        self.check_lengths()?;
        Ok(PrescriptionChanges {
            diagnosis: non_blank(self.diagnosis, "diagnosis")?,
            notes: self.notes,
            medications: self.medications.map(into_medications).transpose()?,
        })
    }
}

impl PrescriptionChanges {
    /// Applies the scalar fields; medication replacement is a separate write.
    pub fn apply(&mut self, record: &mut PrescriptionRecord) {
        assign(&mut record.diagnosis, self.diagnosis.take());
        assign(&mut record.notes, self.notes.take().map(Some));
    }
}
