//! User actions as the presentation layer triggers them.
//!
//! Each action runs one service operation and reports the result through the
//! [`Notifier`]: success as information, rejected input as a warning, anything
//! else as an error. Failures never propagate to the caller; the return value
//! only tells the view whether it needs to refresh.
//!
//! The actions also own the [`FleetCursor`] for the main view. Adding a car moves it
//! to the new car, editing keeps it on the edited car, a search hit jumps to the
//! match, and archive or restore reload the active list.

use log::error;
use shared::{GenerateReportRequest, GenerateReportResponse, Notification, ReportKind};

use super::collaborators::{Notifier, SavePathPicker};
use crate::domain::commands::car::{CreateCarCommand, UpdateCarCommand};
use crate::domain::commands::driver::{CreateDriverCommand, UpdateDriverCommand};
use crate::domain::commands::expense::{CreateExpenseCommand, UpdateExpenseCommand};
use crate::domain::commands::service::{
    CreateServiceCommand, ServiceMutationResult, UpdateServiceCommand,
};
use crate::domain::errors::ValidationError;
use crate::domain::fleet_cursor::FleetCursor;
use crate::domain::models::car::Car;
use crate::domain::models::driver::Driver;
use crate::domain::models::expense::Expense;
use crate::render::{DocumentRenderer, PdfRenderer};
use crate::Backend;

const SUCCESS: &str = "Success";
const ERROR: &str = "Error";
const CONFIRMATION: &str = "Confirmation";

pub struct FleetActions<'a> {
    backend: &'a Backend,
    notifier: &'a dyn Notifier,
    picker: &'a dyn SavePathPicker,
    renderer: &'a dyn DocumentRenderer,
    cursor: FleetCursor,
}

impl<'a> FleetActions<'a> {
    /// Actions rendering reports as PDF, with the cursor on the first active car
    pub fn new(
        backend: &'a Backend,
        notifier: &'a dyn Notifier,
        picker: &'a dyn SavePathPicker,
    ) -> Self {
        let mut actions = Self {
            backend,
            notifier,
            picker,
            renderer: &PdfRenderer,
            cursor: FleetCursor::default(),
        };
        actions.reload_cursor();
        actions
    }

    pub fn with_renderer(mut self, renderer: &'a dyn DocumentRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn cursor(&self) -> &FleetCursor {
        &self.cursor
    }

    /// Id of the car the main view shows
    pub fn current_car_id(&self) -> Option<i64> {
        self.cursor.current()
    }

    pub fn next_car(&mut self) -> Option<i64> {
        self.cursor.next()
    }

    pub fn previous_car(&mut self) -> Option<i64> {
        self.cursor.previous()
    }

    /// Refresh the active list; a read failure is reported and leaves the cursor as is
    fn reload_cursor(&mut self) -> Option<i64> {
        match self.backend.car_service.list_active_cars() {
            Ok(cars) => self.cursor.reload(cars.iter().map(|car| car.id).collect()),
            Err(err) => {
                self.report_failure(err);
                self.cursor.current()
            }
        }
    }

    /// Route a result to the notifier
    fn report<T>(&self, result: anyhow::Result<T>, success: &str) -> Option<T> {
        match result {
            Ok(value) => {
                self.notifier.notify(Notification::info(SUCCESS, success));
                Some(value)
            }
            Err(err) => {
                self.report_failure(err);
                None
            }
        }
    }

    fn report_failure(&self, err: anyhow::Error) {
        match err.downcast_ref::<ValidationError>() {
            Some(validation) => {
                self.notifier
                    .notify(Notification::warning(ERROR, validation.to_string()));
            }
            None => {
                error!("Operation failed: {:#}", err);
                self.notifier
                    .notify(Notification::error(ERROR, format!("{:#}", err)));
            }
        }
    }

    pub fn add_car(&mut self, command: CreateCarCommand) -> Option<Car> {
        let car = self.report(
            self.backend.car_service.create_car(command),
            "Car added successfully!",
        )?;
        self.reload_cursor();
        self.cursor.select_last();
        Some(car)
    }

    pub fn edit_car(&mut self, command: UpdateCarCommand) -> Option<Car> {
        let car = self.report(
            self.backend.car_service.update_car(command),
            "Car details updated!",
        )?;
        self.reload_cursor();
        self.cursor.select_car(car.id);
        Some(car)
    }

    /// Archive after the user confirms; false when cancelled or failed
    pub fn archive_car(&mut self, car_id: i64) -> bool {
        let car = match self.backend.car_service.require_car(car_id) {
            Ok(car) => car,
            Err(err) => {
                self.report_failure(err);
                return false;
            }
        };

        let question = format!("Move {} ({}) to the archive?", car.title(), car.plate);
        if !self.notifier.confirm(CONFIRMATION, &question) {
            return false;
        }

        let archived = self
            .report(
                self.backend.car_service.archive_car(car_id),
                "Car moved to the archive.",
            )
            .is_some();
        if archived {
            self.reload_cursor();
        }
        archived
    }

    pub fn restore_car(&mut self, car_id: i64) -> bool {
        let restored = self
            .report(
                self.backend.car_service.restore_car(car_id),
                "Car restored from the archive.",
            )
            .is_some();
        if restored {
            self.reload_cursor();
        }
        restored
    }

    /// Move the cursor to the first matching active car and return its position
    pub fn search_car(&mut self, query: &str) -> Option<usize> {
        match self.backend.car_service.search_active(query) {
            Ok(Some(position)) => {
                self.reload_cursor();
                self.cursor.select_index(position);
                Some(position)
            }
            Ok(None) => {
                self.notifier
                    .notify(Notification::info("Search", "Car not found."));
                None
            }
            Err(err) => {
                self.report_failure(err);
                None
            }
        }
    }

    pub fn add_driver(&self, command: CreateDriverCommand) -> Option<Driver> {
        self.report(
            self.backend.driver_service.create_driver(command),
            "Driver added successfully!",
        )
    }

    pub fn edit_driver(&self, command: UpdateDriverCommand) -> Option<Driver> {
        self.report(
            self.backend.driver_service.update_driver(command),
            "Driver details updated!",
        )
    }

    /// Delete after the user confirms; false when cancelled or failed
    pub fn delete_driver(&self, driver_id: i64) -> bool {
        let driver = match self.backend.driver_service.require_driver(driver_id) {
            Ok(driver) => driver,
            Err(err) => {
                self.report_failure(err);
                return false;
            }
        };

        let question = format!("Delete driver {}?", driver.short_name());
        if !self.notifier.confirm(CONFIRMATION, &question) {
            return false;
        }

        self.report(
            self.backend.driver_service.delete_driver(driver_id),
            "Driver deleted.",
        )
        .is_some()
    }

    pub fn add_service(&self, command: CreateServiceCommand) -> Option<ServiceMutationResult> {
        self.report(
            self.backend.service_record_service.create_service(command),
            "Service record added!",
        )
    }

    pub fn edit_service(&self, command: UpdateServiceCommand) -> Option<ServiceMutationResult> {
        self.report(
            self.backend.service_record_service.update_service(command),
            "Service record updated!",
        )
    }

    pub fn delete_service(&self, service_id: i64) -> Option<ServiceMutationResult> {
        self.report(
            self.backend.service_record_service.delete_service(service_id),
            "Service record deleted.",
        )
    }

    pub fn add_expense(&self, command: CreateExpenseCommand) -> Option<Expense> {
        self.report(
            self.backend.expense_service.create_expense(command),
            "Expense added!",
        )
    }

    pub fn edit_expense(&self, command: UpdateExpenseCommand) -> Option<Expense> {
        self.report(
            self.backend.expense_service.update_expense(command),
            "Expense updated!",
        )
    }

    pub fn delete_expense(&self, expense_id: i64) -> Option<Expense> {
        self.report(
            self.backend.expense_service.delete_expense(expense_id),
            "Expense deleted.",
        )
    }

    /// Ask for a destination and write the report; `None` when cancelled or failed
    pub fn generate_report(&self, kind: ReportKind, car_id: i64) -> Option<GenerateReportResponse> {
        let car = match self.backend.car_service.require_car(car_id) {
            Ok(car) => car,
            Err(err) => {
                self.report_failure(err);
                return None;
            }
        };

        let extension = self.renderer.extension();
        let suggested = kind.suggested_file_name(&car.make, &car.model, extension);
        let filter = format!("{} files (*.{})", extension.to_uppercase(), extension);
        let destination = self
            .picker
            .pick_save_path(kind.dialog_title(), &suggested, &filter)?;

        let request = GenerateReportRequest {
            car_id,
            kind,
            destination: destination.display().to_string(),
        };

        match self.backend.generate_report(&request, self.renderer) {
            Ok(response) => {
                for warning in &response.warnings {
                    self.notifier
                        .notify(Notification::warning("Font", warning.as_str()));
                }
                self.notifier
                    .notify(Notification::info(SUCCESS, response.message.as_str()));
                Some(response)
            }
            Err(err) => {
                self.report_failure(err);
                None
            }
        }
    }
}
