//! Table-scoped record store with file locking.
//!
//! Each entity table lives in its own JSON file under the data directory
//! (`medications.json`, `medication_logs.json`, `appointments.json`,
//! `health_metrics.json`). Reads take a shared lock; writes go through a
//! locked temp file and an atomic rename.
//!
//! A missing or corrupted table degrades to an empty collection with a
//! warning rather than failing the caller; record-level operations on a
//! missing id return [`Error::NotFound`].

use crate::{Appointment, Error, HealthMetric, Medication, MedicationLog, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A record that belongs to a named table and carries a store-assigned id.
pub trait TableRecord: Serialize + DeserializeOwned + Clone {
    /// Table name, used for file naming and error reporting.
    const TABLE: &'static str;

    fn id(&self) -> u32;
    fn set_id(&mut self, id: u32);
}

impl TableRecord for Medication {
    const TABLE: &'static str = "medications";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

impl TableRecord for MedicationLog {
    const TABLE: &'static str = "medication_logs";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

impl TableRecord for Appointment {
    const TABLE: &'static str = "appointments";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

impl TableRecord for HealthMetric {
    const TABLE: &'static str = "health_metrics";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

/// JSON-file-backed record store, one file per table.
pub struct RecordStore {
    data_dir: PathBuf,
}

impl RecordStore {
    /// Create a store rooted at the given data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn table_path<T: TableRecord>(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", T::TABLE))
    }

    /// List all records in a table.
    ///
    /// A missing table yields an empty collection. A table that cannot be
    /// read or parsed also yields an empty collection, with a warning, so
    /// that one damaged file never takes down an entire page load.
    pub fn list<T: TableRecord>(&self) -> Result<Vec<T>> {
        let path = self.table_path::<T>();
        Ok(load_table(&path, T::TABLE))
    }

    /// Fetch a single record by id.
    pub fn get<T: TableRecord>(&self, id: u32) -> Result<T> {
        self.list::<T>()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or(Error::NotFound {
                table: T::TABLE,
                id,
            })
    }

    /// Insert a record, assigning the next available id.
    ///
    /// Ids are max existing + 1, starting at 1; any id on the incoming
    /// record is ignored. Returns the record as stored.
    pub fn create<T: TableRecord>(&self, mut record: T) -> Result<T> {
        let mut records = self.list::<T>()?;
        let next_id = records.iter().map(|r| r.id()).max().unwrap_or(0) + 1;
        record.set_id(next_id);
        records.push(record.clone());
        self.save_table::<T>(&records)?;

        tracing::debug!("Created {} record {}", T::TABLE, next_id);
        Ok(record)
    }

    /// Replace the record with the given id.
    ///
    /// The stored id always wins over whatever the payload carries.
    pub fn update<T: TableRecord>(&self, id: u32, mut record: T) -> Result<T> {
        let mut records = self.list::<T>()?;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(Error::NotFound {
                table: T::TABLE,
                id,
            })?;

        record.set_id(id);
        records[index] = record.clone();
        self.save_table::<T>(&records)?;

        tracing::debug!("Updated {} record {}", T::TABLE, id);
        Ok(record)
    }

    /// Remove and return the record with the given id.
    pub fn delete<T: TableRecord>(&self, id: u32) -> Result<T> {
        let mut records = self.list::<T>()?;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(Error::NotFound {
                table: T::TABLE,
                id,
            })?;

        let deleted = records.remove(index);
        self.save_table::<T>(&records)?;

        tracing::debug!("Deleted {} record {}", T::TABLE, id);
        Ok(deleted)
    }

    /// Atomically write a full table by:
    /// 1. Writing to a locked temp file
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    fn save_table<T: TableRecord>(&self, records: &[T]) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;

        let temp = NamedTempFile::new_in(&self.data_dir)?;

        // Exclusive lock on the temp file to serialize concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(records)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(self.table_path::<T>())
            .map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} {} records", records.len(), T::TABLE);
        Ok(())
    }
}

/// Load a table file with shared locking.
///
/// Any failure along the way (open, lock, read, parse) degrades to an
/// empty table with a warning.
fn load_table<T: DeserializeOwned>(path: &Path, table: &str) -> Vec<T> {
    if !path.exists() {
        tracing::debug!("No {} table file found, treating as empty", table);
        return Vec::new();
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {} table {:?}: {}. Treating as empty.", table, path, e);
            return Vec::new();
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {} table {:?}: {}. Treating as empty.", table, path, e);
        return Vec::new();
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    if let Err(e) = reader.read_to_string(&mut contents) {
        let _ = file.unlock();
        tracing::warn!("Failed to read {} table {:?}: {}. Treating as empty.", table, path, e);
        return Vec::new();
    }

    let _ = file.unlock();

    match serde_json::from_str::<Vec<T>>(&contents) {
        Ok(records) => {
            tracing::debug!("Loaded {} {} records", records.len(), table);
            records
        }
        Err(e) => {
            tracing::warn!("Failed to parse {} table {:?}: {}. Treating as empty.", table, path, e);
            Vec::new()
        }
    }
}
