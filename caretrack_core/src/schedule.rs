//! Dose-schedule engine.
//!
//! Pure functions over in-memory medication and log collections:
//! - Schedule normalization ("08:00, 20:00" or ["08:00", "20:00"])
//! - Per-slot dose status for today
//! - Next-dose selection with wrap-around to tomorrow
//! - Today's adherence percentage
//!
//! Time-of-day values are well-formed 24-hour "HH:MM" strings, so
//! comparisons are lexical throughout.

use crate::{DoseStatus, Medication, MedicationLog};
use chrono::NaiveDate;

/// Parse a comma-delimited schedule field into ordered, trimmed slots.
///
/// Empty segments are dropped; an empty or blank input yields an empty
/// schedule.
pub fn normalize_times(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Select the next dose slot relative to the current time.
///
/// Returns the first slot lexically greater than `now`, wrapping to the
/// first slot of the schedule (tomorrow's first dose) when none remain
/// today. Returns None for an empty schedule; callers must handle that
/// display case.
pub fn next_dose<'a>(times: &'a [String], now: &str) -> Option<&'a str> {
    times
        .iter()
        .find(|t| t.as_str() > now)
        .or_else(|| times.first())
        .map(|t| t.as_str())
}

/// Resolve the status of one dose slot for a medication on a given day.
///
/// Returns Pending when no log matches the medication, day, and slot.
/// When duplicate logs exist for the same slot, the first match in
/// collection order wins.
pub fn dose_status(
    medication_id: u32,
    slot: &str,
    logs: &[MedicationLog],
    day: NaiveDate,
) -> DoseStatus {
    logs.iter()
        .find(|log| {
            log.medication_id == medication_id
                && log.date == day
                && log.scheduled_time == slot
        })
        .map(|log| log.status)
        .unwrap_or(DoseStatus::Pending)
}

/// Resolve the status of every slot in a medication's schedule for a day.
pub fn day_statuses(
    medication: &Medication,
    logs: &[MedicationLog],
    day: NaiveDate,
) -> Vec<(String, DoseStatus)> {
    medication
        .times
        .iter()
        .map(|slot| {
            (
                slot.clone(),
                dose_status(medication.id, slot, logs, day),
            )
        })
        .collect()
}

/// Total dose slots scheduled across all medications.
pub fn total_scheduled_doses(medications: &[Medication]) -> usize {
    medications.iter().map(|m| m.times.len()).sum()
}

/// Adherence for a day as a rounded percentage.
///
/// Counts the day's logs with status Taken against the total scheduled
/// slots across all medications. Returns 0 when nothing is scheduled.
/// The result is clamped to 100 so stray duplicate logs cannot push it
/// past the bound.
pub fn adherence(medications: &[Medication], logs: &[MedicationLog], day: NaiveDate) -> u8 {
    let total = total_scheduled_doses(medications);
    if total == 0 {
        return 0;
    }

    let taken = logs
        .iter()
        .filter(|log| log.date == day && log.status == DoseStatus::Taken)
        .count();

    ((taken as f64 / total as f64) * 100.0).min(100.0).round() as u8
}
