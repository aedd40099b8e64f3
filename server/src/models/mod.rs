//! Row types, request payloads and the typed partial updates built from them.
//!
//! Each entity follows the same shape: the row struct (`Patient`) is what the
//! database returns and what the API serializes; the payload
//! (`PatientPayload`) is the raw request body with every field optional;
//! `into_new` validates it into an insertable `NewPatient` and `into_changes`
//! into a `PatientChanges` that only touches the fields that were sent.

pub mod appointment;
pub mod billing;
pub mod dashboard;
pub mod doctor;
pub mod inventory;
pub mod patient;
pub mod prescription;
pub mod user;

pub use appointment::*;
pub use billing::*;
pub use dashboard::*;
pub use doctor::*;
pub use inventory::*;
pub use lab_test::*;
pub use patient::*;
pub use prescription::*;
pub use user::*;

/// Overwrite `slot` only when a new value was supplied.
pub(crate) fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// `HH:MM` (de)serialization for `NaiveTime`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use crate::validation::TIME_FORMAT;

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, TIME_FORMAT).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Slot {
        #[serde(with = "hhmm")]
        time: NaiveTime,
    }

    #[test]
    fn test_hhmm_format() {
        let slot = Slot {
            time: NaiveTime::from_hms_opt(14, 5, 59).unwrap(),
        };
        assert_eq!(serde_json::to_string(&slot).unwrap(), r#"{"time":"14:05"}"#);

        let parsed: Slot = serde_json::from_str(r#"{"time":"09:30"}"#).unwrap();
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(serde_json::from_str::<Slot>(r#"{"time":"9.30"}"#).is_err());
    }

    #[test]
    fn test_assign_keeps_value_when_absent() {
        let mut name = "Jane".to_string();
        assign(&mut name, None);
        assert_eq!(name, "Jane");
        assign(&mut name, Some("Janet".to_string()));
        assert_eq!(name, "Janet");
    }
}
