//! # Report Generation
//!
//! Builds the three per-car reports as renderer-independent documents:
//!
//! - **Car summary**: the car's attributes, one line each
//! - **Expense ledger**: every expense in a grid table
//! - **Maintenance timeline**: the service history laid out by [`TimelineEngine`]
//!
//! The configured font is loaded for every report. A font that cannot be loaded
//! is not fatal: the report is still produced with the fallback family and the
//! problem is returned as a warning.

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use shared::ReportKind;
use std::fs;
use std::path::{Path, PathBuf};

use super::models::car::Car;
use super::models::report::{Block, PageSize, ReportDocument, Table};
use super::record_table::RecordTableFormatter;
use super::timeline::{TimelineEngine, TimelineEvent, TimelineLayout};
use crate::config::ReportConfig;
use crate::render::{DocumentRenderer, FontFace};
use crate::storage::traits::{
    CarStorage, Connection, DriverStorage, ExpenseStorage, ReferenceDataStorage,
    ServiceRecordStorage,
};

const SUMMARY_FONT_SIZE: f64 = 12.0;
const BODY_FONT_SIZE: f64 = 10.0;
const TITLE_GAP: f64 = 12.0;
const LINE_GAP: f64 = 6.0;
const LEDGER_COLUMN_WIDTHS: [f64; 3] = [200.0, 100.0, 100.0];

pub const NO_EXPENSES: &str = "No expenses recorded.";
pub const NO_SERVICES: &str = "No maintenance records.";
pub const NO_SERVICE_DATES: &str = "No service date data.";

/// A written report and any non-fatal problems met on the way
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOutcome {
    pub path: PathBuf,
    pub warnings: Vec<String>,
}

#[derive(Clone)]
pub struct ReportService<C: Connection> {
    car_repository: C::CarRepository,
    driver_repository: C::DriverRepository,
    service_repository: C::ServiceRecordRepository,
    expense_repository: C::ExpenseRepository,
    reference_repository: C::ReferenceRepository,
    timeline: TimelineEngine,
    formatter: RecordTableFormatter,
    config: ReportConfig,
}

impl<C: Connection> ReportService<C> {
    pub fn new(connection: &C, config: ReportConfig, timeline: TimelineEngine) -> Self {
        Self {
            car_repository: connection.create_car_repository(),
            driver_repository: connection.create_driver_repository(),
            service_repository: connection.create_service_record_repository(),
            expense_repository: connection.create_expense_repository(),
            reference_repository: connection.create_reference_repository(),
            timeline,
            formatter: RecordTableFormatter::new(),
            config,
        }
    }

    /// Build and render a report for a car
    pub fn generate(
        &self,
        kind: ReportKind,
        car_id: i64,
        destination: &Path,
        renderer: &dyn DocumentRenderer,
    ) -> Result<ReportOutcome> {
        info!("Generating {} report for car {}", kind, car_id);

        let document = self.build(kind, car_id)?;
        let (font, font_warning) = self.load_font();

        renderer
            .render(&document, &font, destination)
            .with_context(|| format!("Failed to write report to {}", destination.display()))?;

        info!("Saved {} report to {}", kind, destination.display());
        Ok(ReportOutcome {
            path: destination.to_path_buf(),
            warnings: font_warning.into_iter().collect(),
        })
    }

    pub fn build(&self, kind: ReportKind, car_id: i64) -> Result<ReportDocument> {
        let car = self
            .car_repository
            .get_car(car_id)?
            .ok_or_else(|| anyhow!("Car not found: {}", car_id))?;

        match kind {
            ReportKind::CarSummary => self.car_summary(&car),
            ReportKind::ExpenseLedger => self.expense_ledger(&car),
            ReportKind::MaintenanceTimeline => self.maintenance_timeline(&car),
        }
    }

    /// Configured font, or the bare family name and a warning
    pub fn load_font(&self) -> (FontFace, Option<String>) {
        let family = self.config.font_family.clone();
        let Some(path) = &self.config.font_path else {
            return (FontFace::fallback(family), None);
        };

        let loaded = fs::read(path)
            .map_err(|e| e.to_string())
            .and_then(|bytes| {
                if looks_like_font(&bytes) {
                    Ok(bytes)
                } else {
                    Err("not a TrueType or OpenType font".to_string())
                }
            });

        match loaded {
            Ok(bytes) => (
                FontFace {
                    family,
                    data: Some(bytes),
                },
                None,
            ),
            Err(reason) => {
                let message = format!("Failed to load font {}: {}", path.display(), reason);
                warn!("{}", message);
                (FontFace::fallback(family), Some(message))
            }
        }
    }

    fn new_document(&self, kind: ReportKind, title: String) -> ReportDocument {
        let mut document = ReportDocument::new(
            kind,
            title,
            PageSize {
                width: self.config.page_width,
                height: self.config.page_height,
            },
            self.config.margin,
        );
        document.push(Block::Spacer(TITLE_GAP));
        document
    }

    pub fn car_summary(&self, car: &Car) -> Result<ReportDocument> {
        let mut document =
            self.new_document(ReportKind::CarSummary, format!("Car report: {}", car.title()));

        let status = match self.reference_repository.get_status(car.status_id)? {
            Some(status) => status.label,
            None => {
                warn!("Car {} refers to unknown status {}", car.id, car.status_id);
                "Unknown".to_string()
            }
        };
        let driver = match car.driver_id {
            Some(driver_id) => self
                .driver_repository
                .get_driver(driver_id)?
                .map(|d| d.full_name()),
            None => None,
        };

        let lines = [
            format!("Make: {}", car.make),
            format!("Model: {}", car.model),
            format!("Plate: {}", car.plate),
            format!("Mileage: {} km", car.mileage),
            format!("Year: {}", car.year),
            format!("Status: {}", status),
            format!("Driver: {}", driver.as_deref().unwrap_or("Unassigned")),
        ];
        for text in lines {
            document.push(Block::Paragraph {
                text,
                font_size: SUMMARY_FONT_SIZE,
            });
            document.push(Block::Spacer(LINE_GAP));
        }
        Ok(document)
    }

    pub fn expense_ledger(&self, car: &Car) -> Result<ReportDocument> {
        let mut document = self.new_document(
            ReportKind::ExpenseLedger,
            format!("Expense report: {}", car.title()),
        );

        let expenses = self.expense_repository.list_expenses(car.id)?;
        if expenses.is_empty() {
            document.push(Block::Paragraph {
                text: NO_EXPENSES.to_string(),
                font_size: BODY_FONT_SIZE,
            });
            return Ok(document);
        }

        let expense_types = self.reference_repository.list_expense_types()?;
        let rows = expenses
            .iter()
            .map(|expense| {
                let label = expense_types
                    .iter()
                    .find(|t| t.id == expense.expense_type_id)
                    .map(|t| t.label.as_str());
                let row = self.formatter.expense_row(expense, label);
                vec![row.expense_type, row.amount, row.date]
            })
            .collect();

        document.push(Block::Table(Table {
            header: vec!["Expense type".into(), "Amount".into(), "Date".into()],
            rows,
            column_widths: LEDGER_COLUMN_WIDTHS.to_vec(),
            font_size: BODY_FONT_SIZE,
        }));
        Ok(document)
    }

    pub fn maintenance_timeline(&self, car: &Car) -> Result<ReportDocument> {
        let mut document = self.new_document(
            ReportKind::MaintenanceTimeline,
            format!("Service schedule: {}", car.title()),
        );

        let records = self.service_repository.list_service_records(car.id)?;
        if records.is_empty() {
            document.push(Block::Paragraph {
                text: NO_SERVICES.to_string(),
                font_size: BODY_FONT_SIZE,
            });
            return Ok(document);
        }

        let work_types = self.reference_repository.list_work_types()?;
        let events: Vec<TimelineEvent> = records
            .into_iter()
            .map(|record| TimelineEvent {
                service_id: record.id,
                date_service: record.date_service,
                next_date: record.next_date,
                odometer: record.odometer,
                work_type: work_types
                    .iter()
                    .find(|w| w.id == record.work_type_id)
                    .map(|w| w.label.clone()),
                conclusion: record.conclusion,
            })
            .collect();

        match self.timeline.layout(&events) {
            TimelineLayout::NoData => document.push(Block::Paragraph {
                text: NO_SERVICE_DATES.to_string(),
                font_size: BODY_FONT_SIZE,
            }),
            TimelineLayout::Drawing { drawing, .. } => document.push(Block::Figure(drawing)),
        }
        Ok(document)
    }
}

/// TrueType, OpenType or TrueType collection magic
fn looks_like_font(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}
