use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a message shown to the user by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    /// Operation succeeded, purely informational
    Info,
    /// Operation was blocked, usually by a validation failure
    Warning,
    /// Operation failed in the store or the renderer
    Error,
}

/// A message the presentation layer should display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Warning,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Display projection of a car for the main fleet view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarCard {
    pub car_id: i64,
    /// "Make Model"
    pub title: String,
    pub plate: String,
    /// Mileage with unit, e.g. "51200 km"
    pub mileage: String,
    pub year: i32,
    pub status: String,
    /// Driver full name or "Unassigned"
    pub driver_name: String,
    /// Set when a driver is assigned, used to open the driver details
    pub driver_id: Option<i64>,
    pub has_photo: bool,
    pub is_archived: bool,
}

/// Overview of the whole fleet shown on launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetOverview {
    pub active_cars: Vec<CarCard>,
    pub archived_count: usize,
}

/// Entry of the archive list: "Make Model (PLATE)"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveListItem {
    pub car_id: i64,
    pub label: String,
}

/// One formatted row of the maintenance table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceTableRow {
    pub service_id: i64,
    /// Service date (YYYY-MM-DD), empty when unknown
    pub date_service: String,
    pub work_type: String,
    /// Next due date (YYYY-MM-DD), empty when not planned
    pub next_date: String,
    /// Odometer reading at service time, empty when unknown
    pub odometer: String,
    pub conclusion: String,
}

/// One formatted row of the expense table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTableRow {
    pub expense_id: i64,
    pub expense_type: String,
    /// Amount with two decimal places
    pub amount: String,
    /// Expense date (YYYY-MM-DD)
    pub date: String,
}

/// The three report variants available for a car
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    CarSummary,
    ExpenseLedger,
    MaintenanceTimeline,
}

impl ReportKind {
    /// Title of the save dialog for this report
    pub fn dialog_title(&self) -> &'static str {
        match self {
            ReportKind::CarSummary => "Save car report",
            ReportKind::ExpenseLedger => "Save expense report",
            ReportKind::MaintenanceTimeline => "Save service schedule",
        }
    }

    /// File name proposed to the user, e.g. "Report_Lada_Vesta.pdf"
    pub fn suggested_file_name(&self, make: &str, model: &str, extension: &str) -> String {
        let prefix = match self {
            ReportKind::CarSummary => "Report",
            ReportKind::ExpenseLedger => "Expenses",
            ReportKind::MaintenanceTimeline => "Service_Schedule",
        };
        format!("{}_{}_{}.{}", prefix, make, model, extension)
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::CarSummary => write!(f, "car summary"),
            ReportKind::ExpenseLedger => write!(f, "expense ledger"),
            ReportKind::MaintenanceTimeline => write!(f, "maintenance timeline"),
        }
    }
}

/// Request to generate a report to a chosen destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReportRequest {
    pub car_id: i64,
    pub kind: ReportKind,
    pub destination: String,
}

/// Outcome of a report generation, reported back to the UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateReportResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    /// Non-fatal problems, e.g. the configured font could not be loaded
    pub warnings: Vec<String>,
}
