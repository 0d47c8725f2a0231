//! # Fleet Records Backend
//!
//! Record keeping for a small vehicle fleet: cars, drivers, maintenance history and
//! expenses, kept in a file-based store, plus per-car reports.
//!
//! ## Layers
//!
//! - [`storage`]: storage traits and the CSV/YAML record store
//! - [`domain`]: entity services, mileage reconciliation, timeline layout, reports
//! - [`render`]: document renderers (PDF, JSON)
//! - [`io`]: seams the presentation layer plugs into
//!
//! [`Backend`] wires the services to one data directory.

pub mod config;
pub mod domain;
pub mod io;
pub mod render;
pub mod storage;

use anyhow::{Context, Result};
use log::info;
use shared::{GenerateReportRequest, GenerateReportResponse};
use std::path::{Path, PathBuf};

use config::AppConfig;
use domain::{
    CarService, DriverService, ExpenseService, ReportService, ServiceRecordService, TimelineEngine,
};
use render::DocumentRenderer;
use storage::CsvConnection;

/// All services over one record store
#[derive(Clone)]
pub struct Backend {
    pub data_directory: PathBuf,
    pub config: AppConfig,
    pub car_service: CarService<CsvConnection>,
    pub driver_service: DriverService<CsvConnection>,
    pub service_record_service: ServiceRecordService<CsvConnection>,
    pub expense_service: ExpenseService<CsvConnection>,
    pub report_service: ReportService<CsvConnection>,
}

impl Backend {
    /// Open (creating if needed) the store in `data_directory`
    pub fn open<P: AsRef<Path>>(data_directory: P) -> Result<Self> {
        let data_directory = data_directory.as_ref().to_path_buf();
        let connection = CsvConnection::new(&data_directory)?;
        let config = AppConfig::load_or_create(&data_directory)?;
        connection
            .ensure_reference_data()
            .context("Failed to prepare reference data")?;

        info!("Opened fleet records at {}", data_directory.display());
        Ok(Self::with_config(connection, config))
    }

    /// Open the store in the default data directory
    pub fn open_default() -> Result<Self> {
        let data_directory = config::resolve_data_directory(None)?;
        Self::open(data_directory)
    }

    pub fn with_config(connection: CsvConnection, config: AppConfig) -> Self {
        let validation = config.validation.clone();
        Self {
            data_directory: connection.base_directory().to_path_buf(),
            car_service: CarService::new(&connection, validation.clone()),
            driver_service: DriverService::new(&connection, validation.clone()),
            service_record_service: ServiceRecordService::new(&connection, validation.clone()),
            expense_service: ExpenseService::new(&connection, validation),
            report_service: ReportService::new(
                &connection,
                config.report.clone(),
                TimelineEngine::new(config.timeline.clone()),
            ),
            config,
        }
    }

    /// Generate a report to the requested destination
    pub fn generate_report(
        &self,
        request: &GenerateReportRequest,
        renderer: &dyn DocumentRenderer,
    ) -> Result<GenerateReportResponse> {
        let outcome = self.report_service.generate(
            request.kind,
            request.car_id,
            Path::new(&request.destination),
            renderer,
        )?;

        Ok(GenerateReportResponse {
            success: true,
            message: format!("Report saved to: {}", outcome.path.display()),
            file_path: outcome.path.display().to_string(),
            warnings: outcome.warnings,
        })
    }
}
