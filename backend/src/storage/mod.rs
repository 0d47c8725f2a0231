//! # Storage Layer
//!
//! Storage traits used by the domain services, and the CSV-backed record store
//! that implements them.

pub mod csv;
pub mod traits;

pub use csv::CsvConnection;
pub use traits::{
    AddressStorage, CarStorage, Connection, DriverStorage, ExpenseStorage, ReferenceDataStorage,
    ServiceRecordStorage,
};
