//! # Storage Traits
//!
//! These traits keep the domain services independent of how records are persisted.
//! All operations are synchronous.
//!
//! Every `store_*` method ignores the id of the record it is given, allocates the next
//! free key and returns the stored copy.

use anyhow::Result;

use crate::domain::models::address::Address;
use crate::domain::models::car::Car;
use crate::domain::models::driver::Driver;
use crate::domain::models::expense::Expense;
use crate::domain::models::lookup::{ExpenseType, Status, WorkType};
use crate::domain::models::service_record::ServiceRecord;

pub trait AddressStorage: Send + Sync {
    fn store_address(&self, address: &Address) -> Result<Address>;

    fn get_address(&self, address_id: i64) -> Result<Option<Address>>;

    /// Update an existing address; fails if it does not exist
    fn update_address(&self, address: &Address) -> Result<()>;
}

pub trait DriverStorage: Send + Sync {
    fn store_driver(&self, driver: &Driver) -> Result<Driver>;

    fn get_driver(&self, driver_id: i64) -> Result<Option<Driver>>;

    /// All drivers ordered by surname, then name
    fn list_drivers(&self) -> Result<Vec<Driver>>;

    fn update_driver(&self, driver: &Driver) -> Result<()>;

    /// Returns true if the driver was found and deleted
    fn delete_driver(&self, driver_id: i64) -> Result<bool>;
}

pub trait CarStorage: Send + Sync {
    fn store_car(&self, car: &Car) -> Result<Car>;

    fn get_car(&self, car_id: i64) -> Result<Option<Car>>;

    /// Active or archived cars in insertion order
    fn list_cars(&self, archived: bool) -> Result<Vec<Car>>;

    /// Case-insensitive plate lookup across active and archived cars
    fn find_car_by_plate(&self, plate: &str) -> Result<Option<Car>>;

    /// Cars currently assigned to a driver
    fn list_cars_by_driver(&self, driver_id: i64) -> Result<Vec<Car>>;

    fn update_car(&self, car: &Car) -> Result<()>;
}

pub trait ServiceRecordStorage: Send + Sync {
    fn store_service_record(&self, record: &ServiceRecord) -> Result<ServiceRecord>;

    fn get_service_record(&self, service_id: i64) -> Result<Option<ServiceRecord>>;

    /// Records of a car ordered by service date ascending, undated records last
    fn list_service_records(&self, car_id: i64) -> Result<Vec<ServiceRecord>>;

    fn update_service_record(&self, record: &ServiceRecord) -> Result<()>;

    fn delete_service_record(&self, service_id: i64) -> Result<bool>;
}

pub trait ExpenseStorage: Send + Sync {
    fn store_expense(&self, expense: &Expense) -> Result<Expense>;

    fn get_expense(&self, expense_id: i64) -> Result<Option<Expense>>;

    /// Expenses of a car in insertion order
    fn list_expenses(&self, car_id: i64) -> Result<Vec<Expense>>;

    fn update_expense(&self, expense: &Expense) -> Result<()>;

    fn delete_expense(&self, expense_id: i64) -> Result<bool>;
}

/// Read-only access to the reference tables
pub trait ReferenceDataStorage: Send + Sync {
    fn list_statuses(&self) -> Result<Vec<Status>>;

    fn get_status(&self, status_id: i64) -> Result<Option<Status>>;

    fn list_work_types(&self) -> Result<Vec<WorkType>>;

    fn get_work_type(&self, work_type_id: i64) -> Result<Option<WorkType>>;

    fn list_expense_types(&self) -> Result<Vec<ExpenseType>>;

    fn get_expense_type(&self, expense_type_id: i64) -> Result<Option<ExpenseType>>;
}

/// Factory for the repositories of one storage backend
pub trait Connection: Send + Sync + Clone {
    type AddressRepository: AddressStorage + Clone;
    type DriverRepository: DriverStorage + Clone;
    type CarRepository: CarStorage + Clone;
    type ServiceRecordRepository: ServiceRecordStorage + Clone;
    type ExpenseRepository: ExpenseStorage + Clone;
    type ReferenceRepository: ReferenceDataStorage + Clone;

    fn create_address_repository(&self) -> Self::AddressRepository;
    fn create_driver_repository(&self) -> Self::DriverRepository;
    fn create_car_repository(&self) -> Self::CarRepository;
    fn create_service_record_repository(&self) -> Self::ServiceRecordRepository;
    fn create_expense_repository(&self) -> Self::ExpenseRepository;
    fn create_reference_repository(&self) -> Self::ReferenceRepository;
}
