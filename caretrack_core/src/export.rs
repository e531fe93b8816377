//! CSV export for medication logs.
//!
//! Appends log rows to a CSV file, writing headers only when the file is
//! empty, and syncs to disk before reporting success.

use crate::{DoseStatus, Medication, MedicationLog, Result};
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: u32,
    medication_id: u32,
    medication: String,
    date: String,
    scheduled_time: String,
    taken_time: Option<String>,
    status: DoseStatus,
}

impl CsvRow {
    fn new(log: &MedicationLog, medications: &[Medication]) -> Self {
        let medication = medications
            .iter()
            .find(|m| m.id == log.medication_id)
            .map(|m| m.name.clone())
            .unwrap_or_default();

        CsvRow {
            id: log.id,
            medication_id: log.medication_id,
            medication,
            date: log.date.to_string(),
            scheduled_time: log.scheduled_time.clone(),
            taken_time: log.taken_time.clone(),
            status: log.status,
        }
    }
}

/// Append medication logs to a CSV file and return the row count.
///
/// Medication names are resolved from the medication list; logs that
/// reference a missing medication export with an empty name rather than
/// failing the whole export.
pub fn export_logs(
    medications: &[Medication],
    logs: &[MedicationLog],
    csv_path: &Path,
) -> Result<usize> {
    if logs.is_empty() {
        tracing::info!("No medication logs to export");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only when the file has no content yet
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for log in logs {
        writer.serialize(CsvRow::new(log, medications))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} medication logs to {:?}", logs.len(), csv_path);
    Ok(logs.len())
}
