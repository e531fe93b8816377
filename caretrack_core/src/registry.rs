//! Metric-kind registry and record validation.
//!
//! The registry carries display labels and default units for each supported
//! metric kind; validation checks records before they reach the store.

use crate::{Appointment, HealthMetric, Medication, MetricKind};
use once_cell::sync::Lazy;

/// Display metadata for one metric kind
#[derive(Clone, Debug)]
pub struct MetricKindInfo {
    pub kind: MetricKind,
    pub label: &'static str,
    pub default_unit: &'static str,
}

/// Cached registry of all supported metric kinds, in display order
static METRIC_KINDS: Lazy<Vec<MetricKindInfo>> = Lazy::new(|| {
    vec![
        MetricKindInfo {
            kind: MetricKind::BloodPressure,
            label: "Blood Pressure",
            default_unit: "mmHg",
        },
        MetricKindInfo {
            kind: MetricKind::Glucose,
            label: "Blood Glucose",
            default_unit: "mg/dL",
        },
        MetricKindInfo {
            kind: MetricKind::Weight,
            label: "Weight",
            default_unit: "lbs",
        },
        MetricKindInfo {
            kind: MetricKind::Temperature,
            label: "Temperature",
            default_unit: "°F",
        },
        MetricKindInfo {
            kind: MetricKind::HeartRate,
            label: "Heart Rate",
            default_unit: "bpm",
        },
    ]
});

/// All supported metric kinds, in display order
pub fn metric_kinds() -> &'static [MetricKindInfo] {
    &METRIC_KINDS
}

/// Look up registry metadata for a metric kind
pub fn kind_info(kind: MetricKind) -> &'static MetricKindInfo {
    METRIC_KINDS
        .iter()
        .find(|info| info.kind == kind)
        .expect("registry covers every MetricKind variant")
}

/// Check that a string is a well-formed 24-hour "HH:MM" time of day
pub fn is_valid_time_of_day(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }

    let (hh, mm) = (&value[..2], &value[3..]);
    match (hh.parse::<u8>(), mm.parse::<u8>()) {
        (Ok(h), Ok(m)) => h < 24 && m < 60,
        _ => false,
    }
}

/// Validate a medication record
///
/// Returns a list of validation errors, or empty Vec if valid.
pub fn validate_medication(medication: &Medication) -> Vec<String> {
    let mut errors = Vec::new();

    if medication.name.trim().is_empty() {
        errors.push("Medication has empty name".to_string());
    }
    if medication.dosage.trim().is_empty() {
        errors.push(format!("Medication '{}' has empty dosage", medication.name));
    }

    for slot in &medication.times {
        if !is_valid_time_of_day(slot) {
            errors.push(format!(
                "Medication '{}' has malformed dose time '{}'",
                medication.name, slot
            ));
        }
    }

    if let (Some(start), Some(end)) = (medication.start_date, medication.end_date) {
        if end < start {
            errors.push(format!(
                "Medication '{}' ends before it starts",
                medication.name
            ));
        }
    }

    errors
}

/// Validate an appointment record
pub fn validate_appointment(appointment: &Appointment) -> Vec<String> {
    let mut errors = Vec::new();

    if appointment.title.trim().is_empty() {
        errors.push("Appointment has empty title".to_string());
    }
    if !is_valid_time_of_day(&appointment.time) {
        errors.push(format!(
            "Appointment '{}' has malformed time '{}'",
            appointment.title, appointment.time
        ));
    }

    errors
}

/// Validate a health metric record
///
/// Blood-pressure values must be "SYS/DIA" with both components numeric;
/// every other kind must be a plain number.
pub fn validate_metric(metric: &HealthMetric) -> Vec<String> {
    let mut errors = Vec::new();

    match metric.kind {
        MetricKind::BloodPressure => {
            let parts: Vec<&str> = metric.value.split('/').collect();
            let well_formed = parts.len() == 2
                && parts
                    .iter()
                    .all(|p| p.trim().parse::<f64>().map_or(false, |v| v > 0.0));
            if !well_formed {
                errors.push(format!(
                    "Blood pressure value '{}' is not SYS/DIA",
                    metric.value
                ));
            }
        }
        _ => {
            if metric.value.trim().parse::<f64>().is_err() {
                errors.push(format!(
                    "{} value '{}' is not numeric",
                    kind_info(metric.kind).label,
                    metric.value
                ));
            }
        }
    }

    if let Some(ref time) = metric.time {
        if !is_valid_time_of_day(time) {
            errors.push(format!("Metric has malformed time '{}'", time));
        }
    }

    errors
}
