use anyhow::{bail, Result};
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

use super::connection::{next_id, CsvConnection};
use crate::domain::models::service_record::ServiceRecord;
use crate::storage::traits::ServiceRecordStorage;

const SERVICE_RECORDS_FILE: &str = "service_records.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ServiceRecordRow {
    id: i64,
    car_id: i64,
    date_service: Option<NaiveDate>,
    work_type_id: i64,
    next_date: Option<NaiveDate>,
    odometer: Option<u32>,
    conclusion: Option<String>,
}

impl From<ServiceRecordRow> for ServiceRecord {
    fn from(row: ServiceRecordRow) -> Self {
        ServiceRecord {
            id: row.id,
            car_id: row.car_id,
            date_service: row.date_service,
            work_type_id: row.work_type_id,
            next_date: row.next_date,
            odometer: row.odometer,
            conclusion: row.conclusion,
        }
    }
}

impl From<&ServiceRecord> for ServiceRecordRow {
    fn from(record: &ServiceRecord) -> Self {
        ServiceRecordRow {
            id: record.id,
            car_id: record.car_id,
            date_service: record.date_service,
            work_type_id: record.work_type_id,
            next_date: record.next_date,
            odometer: record.odometer,
            conclusion: record.conclusion.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ServiceRecordRepository {
    connection: CsvConnection,
}

impl ServiceRecordRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rows(&self) -> Result<Vec<ServiceRecordRow>> {
        self.connection.read_table(SERVICE_RECORDS_FILE)
    }
}

impl ServiceRecordStorage for ServiceRecordRepository {
    fn store_service_record(&self, record: &ServiceRecord) -> Result<ServiceRecord> {
        let mut rows = self.read_rows()?;
        let mut stored = record.clone();
        stored.id = next_id(rows.iter().map(|row| row.id));

        rows.push(ServiceRecordRow::from(&stored));
        self.connection.write_table(SERVICE_RECORDS_FILE, &rows)?;

        info!("Stored service record {} for car {}", stored.id, stored.car_id);
        Ok(stored)
    }

    fn get_service_record(&self, service_id: i64) -> Result<Option<ServiceRecord>> {
        Ok(self
            .read_rows()?
            .into_iter()
            .find(|row| row.id == service_id)
            .map(ServiceRecord::from))
    }

    fn list_service_records(&self, car_id: i64) -> Result<Vec<ServiceRecord>> {
        let mut records: Vec<ServiceRecord> = self
            .read_rows()?
            .into_iter()
            .filter(|row| row.car_id == car_id)
            .map(ServiceRecord::from)
            .collect();
        records.sort_by_key(|record| (record.date_service.is_none(), record.date_service, record.id));
        Ok(records)
    }

    fn update_service_record(&self, record: &ServiceRecord) -> Result<()> {
        let mut rows = self.read_rows()?;
        match rows.iter_mut().find(|row| row.id == record.id) {
            Some(row) => *row = ServiceRecordRow::from(record),
            None => bail!("Service record {} not found for update", record.id),
        }
        self.connection.write_table(SERVICE_RECORDS_FILE, &rows)
    }

    fn delete_service_record(&self, service_id: i64) -> Result<bool> {
        let mut rows = self.read_rows()?;
        let before = rows.len();
        rows.retain(|row| row.id != service_id);
        if rows.len() == before {
            return Ok(false);
        }
        self.connection.write_table(SERVICE_RECORDS_FILE, &rows)?;
        info!("Deleted service record {}", service_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{date, sample_service, TestHelper};

    #[test]
    fn test_records_are_ordered_by_date_with_undated_last() {
        let helper = TestHelper::new().unwrap();
        let repo = &helper.service_repo;
        repo.store_service_record(&sample_service(1, None, Some(900))).unwrap();
        repo.store_service_record(&sample_service(1, Some(date(2023, 6, 1)), Some(2000)))
            .unwrap();
        repo.store_service_record(&sample_service(1, Some(date(2023, 1, 10)), Some(1000)))
            .unwrap();
        repo.store_service_record(&sample_service(2, Some(date(2022, 1, 1)), Some(5)))
            .unwrap();

        let records = repo.list_service_records(1).unwrap();
        let dates: Vec<Option<NaiveDate>> = records.iter().map(|r| r.date_service).collect();
        assert_eq!(
            dates,
            vec![Some(date(2023, 1, 10)), Some(date(2023, 6, 1)), None]
        );
    }

    #[test]
    fn test_update_and_delete_service_record() {
        let helper = TestHelper::new().unwrap();
        let repo = &helper.service_repo;
        let mut stored = repo
            .store_service_record(&sample_service(1, Some(date(2023, 1, 10)), Some(1000)))
            .unwrap();

        stored.odometer = None;
        stored.conclusion = Some("Replaced pads".to_string());
        repo.update_service_record(&stored).unwrap();
        assert_eq!(repo.get_service_record(stored.id).unwrap(), Some(stored.clone()));

        assert!(repo.delete_service_record(stored.id).unwrap());
        assert!(repo.list_service_records(1).unwrap().is_empty());
    }
}
