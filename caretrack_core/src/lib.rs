#![forbid(unsafe_code)]

//! Core domain model and business logic for the CareTrack system.
//!
//! This crate provides:
//! - Domain types (medications, dose logs, appointments, health metrics)
//! - The dose-schedule engine (next dose, per-slot status, adherence)
//! - A table-scoped JSON record store
//! - Dashboard and page summaries
//! - CSV export

pub mod types;
pub mod error;
pub mod registry;
pub mod config;
pub mod logging;
pub mod store;
pub mod schedule;
pub mod summary;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use registry::{kind_info, metric_kinds, MetricKindInfo};
pub use store::{RecordStore, TableRecord};
pub use schedule::{adherence, day_statuses, dose_status, next_dose, normalize_times};
pub use summary::{
    appointments_view, filter_medications, metric_stats, next_appointment_label,
    AppointmentView, MedicationFilter, MetricStats, MetricTrend,
};
pub use export::export_logs;
