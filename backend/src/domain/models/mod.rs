pub mod address;
pub mod car;
pub mod driver;
pub mod expense;
pub mod lookup;
pub mod report;
pub mod service_record;
