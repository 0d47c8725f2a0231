//! # Domain Layer
//!
//! Business logic for the fleet: entity services, mileage reconciliation, the
//! service timeline layout and report generation. Services own their repositories
//! and are generic over the storage [`Connection`](crate::storage::Connection).

pub mod car_service;
pub mod commands;
pub mod driver_service;
pub mod errors;
pub mod expense_service;
pub mod fleet_cursor;
pub mod mileage;
pub mod models;
pub mod photo;
pub mod record_table;
pub mod report_service;
pub mod service_record_service;
pub mod timeline;
pub mod validation;

pub use car_service::CarService;
pub use driver_service::DriverService;
pub use errors::ValidationError;
pub use expense_service::ExpenseService;
pub use fleet_cursor::FleetCursor;
pub use mileage::{MileageReconciler, ReconcileOutcome};
pub use report_service::{ReportOutcome, ReportService};
pub use service_record_service::ServiceRecordService;
pub use timeline::{TimelineConfig, TimelineEngine, TimelineLayout};
