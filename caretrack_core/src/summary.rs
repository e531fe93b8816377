//! Dashboard and page summaries.
//!
//! Pure computations over already-fetched collections: medication filters,
//! appointment views, the next-appointment label, and per-kind metric
//! statistics.

use crate::{Appointment, HealthMetric, Medication, MetricKind};
use chrono::{Duration, NaiveDate};

// ============================================================================
// Medications
// ============================================================================

/// Medication list filter
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MedicationFilter {
    All,
    /// No end date, or end date today or later
    Active,
    /// Refill date within the warning window
    RefillNeeded,
}

/// Whether a medication's refill date falls within the warning window.
pub fn refill_due(medication: &Medication, today: NaiveDate, warning_days: i64) -> bool {
    medication
        .refill_date
        .map(|d| d <= today + Duration::days(warning_days))
        .unwrap_or(false)
}

/// Filter a medication list the way the medications page does.
pub fn filter_medications<'a>(
    medications: &'a [Medication],
    filter: MedicationFilter,
    today: NaiveDate,
    refill_warning_days: i64,
) -> Vec<&'a Medication> {
    medications
        .iter()
        .filter(|med| match filter {
            MedicationFilter::All => true,
            MedicationFilter::Active => med.end_date.map(|d| d >= today).unwrap_or(true),
            MedicationFilter::RefillNeeded => refill_due(med, today, refill_warning_days),
        })
        .collect()
}

/// Medications with at least one dose slot scheduled.
pub fn medications_due_today<'a>(medications: &'a [Medication]) -> Vec<&'a Medication> {
    medications.iter().filter(|m| !m.times.is_empty()).collect()
}

// ============================================================================
// Appointments
// ============================================================================

/// Appointment list view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppointmentView {
    Today,
    /// Today or later, soonest first
    Upcoming,
    /// Strictly before today, most recent first
    Past,
    All,
}

/// Select and order appointments for a view.
pub fn appointments_view(
    appointments: &[Appointment],
    view: AppointmentView,
    today: NaiveDate,
) -> Vec<Appointment> {
    let mut selected: Vec<Appointment> = appointments
        .iter()
        .filter(|a| match view {
            AppointmentView::Today => a.date == today,
            AppointmentView::Upcoming => a.date >= today,
            AppointmentView::Past => a.date < today,
            AppointmentView::All => true,
        })
        .cloned()
        .collect();

    match view {
        AppointmentView::Past => {
            selected.sort_by(|a, b| (b.date, b.time.as_str()).cmp(&(a.date, a.time.as_str())))
        }
        _ => selected.sort_by(|a, b| (a.date, a.time.as_str()).cmp(&(b.date, b.time.as_str()))),
    }

    selected
}

/// Human label for the next upcoming appointment.
///
/// "Today", "Tomorrow", a short date ("Sep 02"), or "None scheduled".
pub fn next_appointment_label(appointments: &[Appointment], today: NaiveDate) -> String {
    let upcoming = appointments_view(appointments, AppointmentView::Upcoming, today);

    match upcoming.first() {
        None => "None scheduled".to_string(),
        Some(appt) if appt.date == today => "Today".to_string(),
        Some(appt) if appt.date == today + Duration::days(1) => "Tomorrow".to_string(),
        Some(appt) => appt.date.format("%b %d").to_string(),
    }
}

// ============================================================================
// Health metrics
// ============================================================================

/// Direction of the most recent reading relative to the one before it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricTrend {
    Up,
    Down,
}

/// Summary statistics for one metric kind
#[derive(Clone, Debug)]
pub struct MetricStats {
    pub kind: MetricKind,
    pub latest_value: String,
    pub unit: String,
    /// Mean of the recent window's numeric values
    pub average: f64,
    /// Total readings of this kind, across all time
    pub count: usize,
    /// None with fewer than two readings
    pub trend: Option<MetricTrend>,
}

/// Readings of one kind, most recent first.
pub fn readings_by_kind(metrics: &[HealthMetric], kind: MetricKind) -> Vec<HealthMetric> {
    let mut readings: Vec<HealthMetric> = metrics
        .iter()
        .filter(|m| m.kind == kind)
        .cloned()
        .collect();
    readings.sort_by(|a, b| (b.date, b.time.as_deref()).cmp(&(a.date, a.time.as_deref())));
    readings
}

/// All readings, most recent first, capped at `limit`.
pub fn recent_metrics(metrics: &[HealthMetric], limit: usize) -> Vec<HealthMetric> {
    let mut sorted: Vec<HealthMetric> = metrics.to_vec();
    sorted.sort_by(|a, b| (b.date, b.time.as_deref()).cmp(&(a.date, a.time.as_deref())));
    sorted.truncate(limit);
    sorted
}

/// Compute summary statistics for one metric kind.
///
/// The average and trend use at most `recent_readings` of the most recent
/// values; blood-pressure composites contribute their systolic component.
/// Returns None when there are no readings of this kind.
pub fn metric_stats(
    metrics: &[HealthMetric],
    kind: MetricKind,
    recent_readings: usize,
) -> Option<MetricStats> {
    let readings = readings_by_kind(metrics, kind);
    let latest = readings.first()?;

    let window: Vec<f64> = readings
        .iter()
        .take(recent_readings)
        .filter_map(|m| m.numeric_value())
        .collect();

    let average = if window.is_empty() {
        0.0
    } else {
        window.iter().sum::<f64>() / window.len() as f64
    };

    let trend = match (latest.numeric_value(), readings.get(1).and_then(|m| m.numeric_value())) {
        (Some(current), Some(previous)) => Some(if current > previous {
            MetricTrend::Up
        } else {
            MetricTrend::Down
        }),
        _ => None,
    };

    Some(MetricStats {
        kind,
        latest_value: latest.value.clone(),
        unit: latest.unit.clone(),
        average,
        count: readings.len(),
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppointmentKind;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2026, 8, 30)
    }

    fn med(name: &str, end_date: Option<NaiveDate>, refill_date: Option<NaiveDate>) -> Medication {
        Medication {
            id: 0,
            name: name.into(),
            dosage: "10mg".into(),
            frequency: "daily".into(),
            times: vec!["08:00".into()],
            start_date: None,
            end_date,
            refill_date,
            notes: None,
        }
    }

    fn appt(title: &str, d: NaiveDate, time: &str) -> Appointment {
        Appointment {
            id: 0,
            title: title.into(),
            provider: "Dr. Okafor".into(),
            location: "Main St Clinic".into(),
            date: d,
            time: time.into(),
            kind: AppointmentKind::Routine,
            notes: None,
        }
    }

    fn reading(kind: MetricKind, value: &str, d: NaiveDate) -> HealthMetric {
        HealthMetric {
            id: 0,
            kind,
            value: value.into(),
            unit: "u".into(),
            date: d,
            time: None,
            notes: None,
        }
    }

    #[test]
    fn test_active_filter_keeps_open_ended_medications() {
        let meds = vec![
            med("open", None, None),
            med("current", Some(today()), None),
            med("ended", Some(date(2026, 8, 1)), None),
        ];

        let active = filter_medications(&meds, MedicationFilter::Active, today(), 7);
        let names: Vec<&str> = active.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["open", "current"]);
    }

    #[test]
    fn test_refill_needed_filter_uses_warning_window() {
        let meds = vec![
            med("due", None, Some(date(2026, 9, 3))),
            med("later", None, Some(date(2026, 10, 1))),
            med("none", None, None),
        ];

        let due = filter_medications(&meds, MedicationFilter::RefillNeeded, today(), 7);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "due");
    }

    #[test]
    fn test_medications_due_today_requires_schedule() {
        let mut no_schedule = med("unscheduled", None, None);
        no_schedule.times.clear();
        let meds = vec![med("scheduled", None, None), no_schedule];

        let due = medications_due_today(&meds);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "scheduled");
    }

    #[test]
    fn test_upcoming_view_includes_today_sorted_ascending() {
        let appts = vec![
            appt("later", date(2026, 9, 5), "10:00"),
            appt("today", today(), "14:00"),
            appt("past", date(2026, 8, 1), "09:00"),
        ];

        let upcoming = appointments_view(&appts, AppointmentView::Upcoming, today());
        let titles: Vec<&str> = upcoming.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["today", "later"]);
    }

    #[test]
    fn test_past_view_most_recent_first() {
        let appts = vec![
            appt("oldest", date(2026, 7, 1), "09:00"),
            appt("recent", date(2026, 8, 20), "09:00"),
            appt("today", today(), "09:00"),
        ];

        let past = appointments_view(&appts, AppointmentView::Past, today());
        let titles: Vec<&str> = past.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["recent", "oldest"]);
    }

    #[test]
    fn test_same_day_appointments_ordered_by_time() {
        let appts = vec![
            appt("afternoon", today(), "14:00"),
            appt("morning", today(), "09:00"),
        ];

        let view = appointments_view(&appts, AppointmentView::Today, today());
        assert_eq!(view[0].title, "morning");
    }

    #[test]
    fn test_next_appointment_labels() {
        assert_eq!(next_appointment_label(&[], today()), "None scheduled");

        let today_appt = vec![appt("a", today(), "10:00")];
        assert_eq!(next_appointment_label(&today_appt, today()), "Today");

        let tomorrow_appt = vec![appt("a", date(2026, 8, 31), "10:00")];
        assert_eq!(next_appointment_label(&tomorrow_appt, today()), "Tomorrow");

        let later = vec![appt("a", date(2026, 9, 2), "10:00")];
        assert_eq!(next_appointment_label(&later, today()), "Sep 02");

        // Past appointments never produce a label
        let past = vec![appt("a", date(2026, 8, 1), "10:00")];
        assert_eq!(next_appointment_label(&past, today()), "None scheduled");
    }

    #[test]
    fn test_metric_stats_latest_average_and_trend() {
        let metrics = vec![
            reading(MetricKind::Weight, "80", date(2026, 8, 27)),
            reading(MetricKind::Weight, "82", date(2026, 8, 29)),
            reading(MetricKind::Glucose, "95", date(2026, 8, 29)),
        ];

        let stats = metric_stats(&metrics, MetricKind::Weight, 10).unwrap();
        assert_eq!(stats.latest_value, "82");
        assert_eq!(stats.count, 2);
        assert!((stats.average - 81.0).abs() < f64::EPSILON);
        assert_eq!(stats.trend, Some(MetricTrend::Up));
    }

    #[test]
    fn test_metric_stats_single_reading_has_no_trend() {
        let metrics = vec![reading(MetricKind::HeartRate, "62", today())];

        let stats = metric_stats(&metrics, MetricKind::HeartRate, 10).unwrap();
        assert_eq!(stats.trend, None);
    }

    #[test]
    fn test_metric_stats_absent_kind_is_none() {
        assert!(metric_stats(&[], MetricKind::Glucose, 10).is_none());
    }

    #[test]
    fn test_blood_pressure_trend_uses_systolic() {
        let metrics = vec![
            reading(MetricKind::BloodPressure, "118/79", date(2026, 8, 28)),
            reading(MetricKind::BloodPressure, "124/80", date(2026, 8, 29)),
        ];

        let stats = metric_stats(&metrics, MetricKind::BloodPressure, 10).unwrap();
        assert_eq!(stats.latest_value, "124/80");
        assert_eq!(stats.trend, Some(MetricTrend::Up));
        assert!((stats.average - 121.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recent_metrics_sorted_and_capped() {
        let metrics = vec![
            reading(MetricKind::Weight, "80", date(2026, 8, 25)),
            reading(MetricKind::Weight, "81", date(2026, 8, 27)),
            reading(MetricKind::Weight, "82", date(2026, 8, 29)),
        ];

        let recent = recent_metrics(&metrics, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].value, "82");
        assert_eq!(recent[1].value, "81");
    }
}
