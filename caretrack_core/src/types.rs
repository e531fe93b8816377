//! Core domain types for the CareTrack system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Medications and their dose schedules
//! - Medication logs (one per dose taken/missed)
//! - Appointments
//! - Health metrics
//!
//! Stored records historically carry two field-naming schemes: legacy
//! camelCase (`medicationId`, `scheduledTime`, `Id`) and the hosted schema's
//! suffixed names (`medication_id_c`, `scheduled_time_c`). Both are accepted
//! here, once, at the serde boundary; records are always written back in the
//! canonical snake_case form.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Status and Kind Enums
// ============================================================================

/// Status of a single dose slot for a given day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    Taken,
    Missed,
    Pending,
}

/// Category of appointment
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentKind {
    Routine,
    Followup,
    Urgent,
    Specialist,
    Lab,
}

/// Kind of health metric reading
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    BloodPressure,
    Glucose,
    Weight,
    Temperature,
    HeartRate,
}

// ============================================================================
// Entities
// ============================================================================

/// A medication with its dose schedule
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    #[serde(default, alias = "Id")]
    pub id: u32,

    #[serde(alias = "Name", alias = "name_c")]
    pub name: String,

    #[serde(alias = "dosage_c")]
    pub dosage: String,

    #[serde(alias = "frequency_c")]
    pub frequency: String,

    /// Ordered "HH:MM" dose slots; may be empty.
    ///
    /// Legacy records store this as a comma-delimited string, newer records
    /// as an array. Both parse into the same normalized sequence.
    #[serde(
        default,
        alias = "times_c",
        deserialize_with = "deserialize_schedule"
    )]
    pub times: Vec<String>,

    #[serde(default, alias = "startDate", alias = "start_date_c")]
    pub start_date: Option<NaiveDate>,

    #[serde(default, alias = "endDate", alias = "end_date_c")]
    pub end_date: Option<NaiveDate>,

    #[serde(default, alias = "refillDate", alias = "refill_date_c")]
    pub refill_date: Option<NaiveDate>,

    #[serde(default, alias = "notes_c")]
    pub notes: Option<String>,
}

/// A record of one dose slot being acted on (or missed)
///
/// Created when a user marks a dose taken; never mutated afterwards in
/// normal flows.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MedicationLog {
    #[serde(default, alias = "Id")]
    pub id: u32,

    /// References `Medication::id`. Legacy records store this as a string.
    #[serde(
        alias = "medicationId",
        alias = "medication_id_c",
        deserialize_with = "deserialize_record_id"
    )]
    pub medication_id: u32,

    #[serde(alias = "scheduledTime", alias = "scheduled_time_c")]
    pub scheduled_time: String,

    #[serde(default, alias = "takenTime", alias = "taken_time_c")]
    pub taken_time: Option<String>,

    #[serde(alias = "status_c")]
    pub status: DoseStatus,

    #[serde(alias = "date_c")]
    pub date: NaiveDate,
}

/// A scheduled appointment with a provider
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    #[serde(default, alias = "Id")]
    pub id: u32,

    #[serde(alias = "Name", alias = "title_c")]
    pub title: String,

    #[serde(alias = "provider_c")]
    pub provider: String,

    #[serde(alias = "location_c")]
    pub location: String,

    #[serde(alias = "date_c")]
    pub date: NaiveDate,

    #[serde(alias = "time_c")]
    pub time: String,

    #[serde(rename = "type", alias = "type_c")]
    pub kind: AppointmentKind,

    #[serde(default, alias = "notes_c")]
    pub notes: Option<String>,
}

/// A single health metric reading
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthMetric {
    #[serde(default, alias = "Id")]
    pub id: u32,

    #[serde(rename = "type", alias = "type_c")]
    pub kind: MetricKind,

    /// Numeric text ("72.5"), or "SYS/DIA" composite for blood pressure.
    /// Legacy records may store plain numbers.
    #[serde(alias = "value_c", deserialize_with = "deserialize_value")]
    pub value: String,

    #[serde(alias = "unit_c")]
    pub unit: String,

    #[serde(alias = "date_c")]
    pub date: NaiveDate,

    #[serde(default, alias = "time_c")]
    pub time: Option<String>,

    #[serde(default, alias = "notes_c")]
    pub notes: Option<String>,
}

impl HealthMetric {
    /// Numeric value for comparisons and averaging.
    ///
    /// Blood-pressure composites ("120/80") compare by the leading systolic
    /// component. Returns None for unparseable values.
    pub fn numeric_value(&self) -> Option<f64> {
        let leading = self.value.split('/').next()?;
        leading.trim().parse::<f64>().ok()
    }
}

// ============================================================================
// Serde normalization helpers
// ============================================================================

/// Accept a dose schedule stored either as a comma-delimited string or as a
/// sequence of time strings; absent or null yields an empty schedule.
fn deserialize_schedule<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSchedule {
        Delimited(String),
        Sequence(Vec<String>),
    }

    let raw = Option::<RawSchedule>::deserialize(deserializer)?;
    Ok(match raw {
        None => Vec::new(),
        Some(RawSchedule::Delimited(s)) => crate::schedule::normalize_times(&s),
        Some(RawSchedule::Sequence(v)) => v
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
    })
}

/// Accept a record id stored either as an integer or as a decimal string.
fn deserialize_record_id<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u32),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(n) => Ok(n),
        RawId::Text(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|e| serde::de::Error::custom(format!("invalid record id '{}': {}", s, e))),
    }
}

/// Accept a metric value stored either as a number or as a string.
fn deserialize_value<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawValue {
        Number(f64),
        Text(String),
    }

    Ok(match RawValue::deserialize(deserializer)? {
        RawValue::Number(n) => {
            if n.fract() == 0.0 {
                format!("{}", n as i64)
            } else {
                format!("{}", n)
            }
        }
        RawValue::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medication_accepts_legacy_camel_case() {
        let json = r#"{
            "Id": 3,
            "Name": "Lisinopril",
            "dosage": "10mg",
            "frequency": "Once daily",
            "times": ["08:00"],
            "refillDate": "2026-09-15"
        }"#;

        let med: Medication = serde_json::from_str(json).unwrap();
        assert_eq!(med.id, 3);
        assert_eq!(med.name, "Lisinopril");
        assert_eq!(med.times, vec!["08:00"]);
        assert_eq!(
            med.refill_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 15).unwrap())
        );
    }

    #[test]
    fn test_medication_accepts_suffixed_schema_fields() {
        let json = r#"{
            "Id": 7,
            "name_c": "Metformin",
            "dosage_c": "500mg",
            "frequency_c": "Twice daily",
            "times_c": "08:00, 20:00",
            "notes_c": "With food"
        }"#;

        let med: Medication = serde_json::from_str(json).unwrap();
        assert_eq!(med.name, "Metformin");
        assert_eq!(med.times, vec!["08:00", "20:00"]);
        assert_eq!(med.notes.as_deref(), Some("With food"));
    }

    #[test]
    fn test_medication_missing_schedule_is_empty() {
        let json = r#"{
            "Id": 1,
            "name": "Vitamin D",
            "dosage": "1000 IU",
            "frequency": "As needed"
        }"#;

        let med: Medication = serde_json::from_str(json).unwrap();
        assert!(med.times.is_empty());
    }

    #[test]
    fn test_log_accepts_string_medication_id() {
        let json = r#"{
            "Id": 10,
            "medicationId": "4",
            "scheduledTime": "08:00",
            "takenTime": "08:12",
            "status": "taken",
            "date": "2026-08-30"
        }"#;

        let log: MedicationLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.medication_id, 4);
        assert_eq!(log.status, DoseStatus::Taken);
    }

    #[test]
    fn test_log_accepts_numeric_medication_id() {
        let json = r#"{
            "Id": 11,
            "medication_id_c": 4,
            "scheduled_time_c": "20:00",
            "status_c": "missed",
            "date_c": "2026-08-29"
        }"#;

        let log: MedicationLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.medication_id, 4);
        assert_eq!(log.status, DoseStatus::Missed);
        assert_eq!(log.taken_time, None);
    }

    #[test]
    fn test_log_serializes_canonical_names() {
        let log = MedicationLog {
            id: 1,
            medication_id: 2,
            scheduled_time: "08:00".into(),
            taken_time: None,
            status: DoseStatus::Pending,
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
        };

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"medication_id\":2"));
        assert!(json.contains("\"scheduled_time\""));
        assert!(!json.contains("medication_id_c"));
    }

    #[test]
    fn test_appointment_kind_round_trips() {
        let json = r#"{
            "Id": 2,
            "title": "Annual physical",
            "provider": "Dr. Okafor",
            "location": "Main St Clinic",
            "date": "2026-09-02",
            "time": "14:30",
            "type": "routine"
        }"#;

        let appt: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appt.kind, AppointmentKind::Routine);

        let out = serde_json::to_string(&appt).unwrap();
        assert!(out.contains("\"type\":\"routine\""));
    }

    #[test]
    fn test_metric_accepts_numeric_value() {
        let json = r#"{
            "Id": 5,
            "type_c": "weight",
            "value_c": 81.4,
            "unit_c": "kg",
            "date_c": "2026-08-28"
        }"#;

        let metric: HealthMetric = serde_json::from_str(json).unwrap();
        assert_eq!(metric.value, "81.4");
        assert_eq!(metric.numeric_value(), Some(81.4));
    }

    #[test]
    fn test_blood_pressure_numeric_value_uses_systolic() {
        let metric = HealthMetric {
            id: 1,
            kind: MetricKind::BloodPressure,
            value: "120/80".into(),
            unit: "mmHg".into(),
            date: NaiveDate::from_ymd_opt(2026, 8, 30).unwrap(),
            time: None,
            notes: None,
        };

        assert_eq!(metric.numeric_value(), Some(120.0));
    }
}
