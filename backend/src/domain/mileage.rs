//! # Mileage Reconciliation
//!
//! A car's mileage follows its most recent maintenance: after any change to the
//! service history, the odometer reading of the latest dated record becomes the
//! car's mileage. Records without a date are ignored. When two records share the
//! latest date, the one entered last (highest id) wins.

use anyhow::{anyhow, Result};
use log::{debug, info};

use super::models::service_record::ServiceRecord;
use crate::storage::traits::{CarStorage, Connection, ServiceRecordStorage};

/// What reconciliation did to the car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Updated { from: u32, to: u32 },
    /// Mileage already matched the latest record
    Unchanged,
    /// No dated service record exists, mileage left as is
    NoServiceHistory,
    /// The latest record has no odometer reading, mileage left as is
    MissingOdometer,
}

/// Latest dated record, ties broken by highest id
pub fn latest_dated_record(records: &[ServiceRecord]) -> Option<&ServiceRecord> {
    records
        .iter()
        .filter(|record| record.date_service.is_some())
        .max_by_key(|record| (record.date_service, record.id))
}

#[derive(Clone)]
pub struct MileageReconciler<C: Connection> {
    car_repository: C::CarRepository,
    service_repository: C::ServiceRecordRepository,
}

impl<C: Connection> MileageReconciler<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            car_repository: connection.create_car_repository(),
            service_repository: connection.create_service_record_repository(),
        }
    }

    /// Align the car's mileage with its latest dated service record
    pub fn reconcile(&self, car_id: i64) -> Result<ReconcileOutcome> {
        let mut car = self
            .car_repository
            .get_car(car_id)?
            .ok_or_else(|| anyhow!("Car {} not found", car_id))?;
        let records = self.service_repository.list_service_records(car_id)?;

        let Some(latest) = latest_dated_record(&records) else {
            debug!("Car {} has no dated service records, mileage kept", car_id);
            return Ok(ReconcileOutcome::NoServiceHistory);
        };

        let Some(odometer) = latest.odometer else {
            debug!(
                "Latest service record {} of car {} has no odometer, mileage kept",
                latest.id, car_id
            );
            return Ok(ReconcileOutcome::MissingOdometer);
        };

        if car.mileage == odometer {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let from = car.mileage;
        car.mileage = odometer;
        self.car_repository.update_car(&car)?;

        info!(
            "Car {} mileage reconciled from {} to {} (service record {})",
            car_id, from, odometer, latest.id
        );
        Ok(ReconcileOutcome::Updated { from, to: odometer })
    }
}
