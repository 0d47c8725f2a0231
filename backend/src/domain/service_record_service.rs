use anyhow::{anyhow, Result};
use chrono::{Months, NaiveDate};
use log::info;
use shared::ServiceTableRow;

use super::commands::service::{
    CreateServiceCommand, ServiceForm, ServiceMutationResult, UpdateServiceCommand,
};
use super::errors::ValidationError;
use super::mileage::MileageReconciler;
use super::models::car::Car;
use super::models::lookup::WorkType;
use super::models::service_record::ServiceRecord;
use super::record_table::RecordTableFormatter;
use super::validation;
use crate::config::ValidationConfig;
use crate::storage::traits::{CarStorage, Connection, ReferenceDataStorage, ServiceRecordStorage};

/// Months between a service and the suggested next one
const NEXT_SERVICE_MONTHS: u32 = 6;

/// Service for a car's maintenance history.
///
/// Every create, update and delete is followed by mileage reconciliation.
#[derive(Clone)]
pub struct ServiceRecordService<C: Connection> {
    service_repository: C::ServiceRecordRepository,
    car_repository: C::CarRepository,
    reference_repository: C::ReferenceRepository,
    reconciler: MileageReconciler<C>,
    formatter: RecordTableFormatter,
    validation: ValidationConfig,
}

impl<C: Connection> ServiceRecordService<C> {
    pub fn new(connection: &C, validation: ValidationConfig) -> Self {
        Self {
            service_repository: connection.create_service_record_repository(),
            car_repository: connection.create_car_repository(),
            reference_repository: connection.create_reference_repository(),
            reconciler: MileageReconciler::new(connection),
            formatter: RecordTableFormatter::new(),
            validation,
        }
    }

    /// Prefilled add-service form: serviced today, next service in six months,
    /// odometer at the car's current mileage
    pub fn draft_for(&self, car: &Car, today: NaiveDate) -> Result<ServiceForm> {
        let work_type = self
            .reference_repository
            .list_work_types()?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No work types are configured"))?;

        Ok(ServiceForm {
            date_service: Some(today),
            work_type_id: work_type.id,
            next_date: today.checked_add_months(Months::new(NEXT_SERVICE_MONTHS)),
            odometer: car.mileage.to_string(),
            conclusion: String::new(),
        })
    }

    pub fn create_service(&self, command: CreateServiceCommand) -> Result<ServiceMutationResult> {
        info!("Adding service record for car {}", command.car_id);

        if self.car_repository.get_car(command.car_id)?.is_none() {
            return Err(anyhow!("Car not found: {}", command.car_id));
        }

        let mut record = self.validate_form(&command.form)?;
        record.car_id = command.car_id;
        let stored = self.service_repository.store_service_record(&record)?;

        let reconciliation = self.reconciler.reconcile(stored.car_id)?;
        Ok(ServiceMutationResult {
            record: stored,
            reconciliation,
        })
    }

    pub fn update_service(&self, command: UpdateServiceCommand) -> Result<ServiceMutationResult> {
        info!("Updating service record {}", command.service_id);

        let existing = self.require_service(command.service_id)?;
        let mut record = self.validate_form(&command.form)?;
        record.id = existing.id;
        record.car_id = existing.car_id;
        self.service_repository.update_service_record(&record)?;

        let reconciliation = self.reconciler.reconcile(record.car_id)?;
        Ok(ServiceMutationResult {
            record,
            reconciliation,
        })
    }

    pub fn delete_service(&self, service_id: i64) -> Result<ServiceMutationResult> {
        info!("Deleting service record {}", service_id);

        let record = self.require_service(service_id)?;
        self.service_repository.delete_service_record(service_id)?;

        let reconciliation = self.reconciler.reconcile(record.car_id)?;
        Ok(ServiceMutationResult {
            record,
            reconciliation,
        })
    }

    pub fn require_service(&self, service_id: i64) -> Result<ServiceRecord> {
        self.service_repository
            .get_service_record(service_id)?
            .ok_or_else(|| anyhow!("Service record not found: {}", service_id))
    }

    /// Records of a car, oldest first, undated last
    pub fn list_for_car(&self, car_id: i64) -> Result<Vec<ServiceRecord>> {
        self.service_repository.list_service_records(car_id)
    }

    pub fn list_work_types(&self) -> Result<Vec<WorkType>> {
        self.reference_repository.list_work_types()
    }

    /// Display rows of the maintenance table
    pub fn service_table(&self, car_id: i64) -> Result<Vec<ServiceTableRow>> {
        let work_types = self.reference_repository.list_work_types()?;
        Ok(self
            .list_for_car(car_id)?
            .iter()
            .map(|record| {
                let label = work_types
                    .iter()
                    .find(|w| w.id == record.work_type_id)
                    .map(|w| w.label.as_str());
                self.formatter.service_row(record, label)
            })
            .collect())
    }

    /// Validated record with placeholder ids
    fn validate_form(&self, form: &ServiceForm) -> Result<ServiceRecord> {
        let odometer = validation::integer_in_range(
            "mileage at service",
            &form.odometer,
            0,
            self.validation.max_mileage,
        )?;

        if self
            .reference_repository
            .get_work_type(form.work_type_id)?
            .is_none()
        {
            return Err(ValidationError::UnknownReference {
                kind: "work type",
                id: form.work_type_id,
            }
            .into());
        }

        Ok(ServiceRecord {
            id: 0,
            car_id: 0,
            date_service: form.date_service,
            work_type_id: form.work_type_id,
            next_date: form.next_date,
            odometer: Some(odometer),
            conclusion: validation::optional_text(&form.conclusion),
        })
    }
}
