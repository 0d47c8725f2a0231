use anyhow::{Context, Result};
use csv::{Reader, Writer};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{
    AddressRepository, CarRepository, DriverRepository, ExpenseRepository, ReferenceRepository,
    ServiceRecordRepository,
};
use crate::storage::traits::Connection;

/// CsvConnection owns the data directory and reads and writes whole tables
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: Arc<PathBuf>,
}

impl CsvConnection {
    /// Create a new CSV connection, creating the directory if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
        }

        Ok(Self {
            base_directory: Arc::new(base_path),
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn table_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Read every row of a table; a missing file is an empty table
    pub fn read_table<R: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<R>> {
        let file_path = self.table_path(file_name);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open {}", file_path.display()))?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut rows = Vec::new();
        for (index, record) in csv_reader.deserialize().enumerate() {
            let row: R = record.with_context(|| {
                format!("Malformed row {} in {}", index + 1, file_path.display())
            })?;
            rows.push(row);
        }

        debug!("Read {} rows from {}", rows.len(), file_name);
        Ok(rows)
    }

    /// Replace a table atomically using a temp file
    pub fn write_table<R: Serialize>(&self, file_name: &str, rows: &[R]) -> Result<()> {
        let file_path = self.table_path(file_name);
        let temp_path = file_path.with_extension("tmp");

        {
            let file = File::create(&temp_path)
                .with_context(|| format!("Failed to create {}", temp_path.display()))?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));
            for row in rows {
                csv_writer.serialize(row)?;
            }
            csv_writer.flush()?;
        }

        fs::rename(&temp_path, &file_path)
            .with_context(|| format!("Failed to replace {}", file_path.display()))?;

        debug!("Wrote {} rows to {}", rows.len(), file_name);
        Ok(())
    }

    /// Write the default reference tables if the store has none yet
    pub fn ensure_reference_data(&self) -> Result<()> {
        self.create_reference_repository().ensure_seeded()
    }
}

/// Next surrogate key: one past the largest key in use
pub fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().unwrap_or(0) + 1
}

impl Connection for CsvConnection {
    type AddressRepository = AddressRepository;
    type DriverRepository = DriverRepository;
    type CarRepository = CarRepository;
    type ServiceRecordRepository = ServiceRecordRepository;
    type ExpenseRepository = ExpenseRepository;
    type ReferenceRepository = ReferenceRepository;

    fn create_address_repository(&self) -> Self::AddressRepository {
        AddressRepository::new(self.clone())
    }

    fn create_driver_repository(&self) -> Self::DriverRepository {
        DriverRepository::new(self.clone())
    }

    fn create_car_repository(&self) -> Self::CarRepository {
        CarRepository::new(self.clone())
    }

    fn create_service_record_repository(&self) -> Self::ServiceRecordRepository {
        ServiceRecordRepository::new(self.clone())
    }

    fn create_expense_repository(&self) -> Self::ExpenseRepository {
        ExpenseRepository::new(self.clone())
    }

    fn create_reference_repository(&self) -> Self::ReferenceRepository {
        ReferenceRepository::new(self.clone())
    }
}
