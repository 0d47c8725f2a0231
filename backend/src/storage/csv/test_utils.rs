//! Test utilities: a store in a temporary directory that is removed when the
//! environment is dropped, even if the test panics.

use anyhow::Result;
use chrono::NaiveDate;
use tempfile::TempDir;

use super::connection::CsvConnection;
use super::{
    AddressRepository, CarRepository, DriverRepository, ExpenseRepository, ReferenceRepository,
    ServiceRecordRepository,
};
use crate::domain::models::car::Car;
use crate::domain::models::driver::Driver;
use crate::domain::models::service_record::ServiceRecord;
use crate::storage::traits::Connection;

pub struct TestEnvironment {
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

/// Repositories over a seeded test store
pub struct TestHelper {
    pub env: TestEnvironment,
    pub address_repo: AddressRepository,
    pub driver_repo: DriverRepository,
    pub car_repo: CarRepository,
    pub service_repo: ServiceRecordRepository,
    pub expense_repo: ExpenseRepository,
    pub reference_repo: ReferenceRepository,
}

impl TestHelper {
    pub fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        env.connection.ensure_reference_data()?;
        Ok(Self {
            address_repo: env.connection.create_address_repository(),
            driver_repo: env.connection.create_driver_repository(),
            car_repo: env.connection.create_car_repository(),
            service_repo: env.connection.create_service_record_repository(),
            expense_repo: env.connection.create_expense_repository(),
            reference_repo: env.connection.create_reference_repository(),
            env,
        })
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn sample_car(plate: &str) -> Car {
    Car {
        id: 0,
        make: "Lada".to_string(),
        model: "Vesta".to_string(),
        plate: plate.to_string(),
        mileage: 1000,
        year: 2020,
        photo: None,
        status_id: 1,
        driver_id: None,
        is_archived: false,
    }
}

pub fn sample_driver(surname: &str, given_name: &str) -> Driver {
    Driver {
        id: 0,
        surname: surname.to_string(),
        given_name: given_name.to_string(),
        patronymic: None,
        phone: "790012345678".to_string(),
        experience_years: Some(5),
        license_series: "7701".to_string(),
        license_number: "123456".to_string(),
        address_id: None,
        photo: None,
    }
}

pub fn sample_service(car_id: i64, date_service: Option<NaiveDate>, odometer: Option<u32>) -> ServiceRecord {
    ServiceRecord {
        id: 0,
        car_id,
        date_service,
        work_type_id: 1,
        next_date: None,
        odometer,
        conclusion: None,
    }
}
