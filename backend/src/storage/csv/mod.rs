//! # CSV Storage Module
//!
//! File-based record store. Each entity lives in its own CSV file in the data
//! directory; reference tables live in a YAML file.
//!
//! ## Files
//!
//! - `addresses.csv`, `drivers.csv`, `cars.csv`, `service_records.csv`, `expenses.csv`
//! - `reference_data.yaml` (statuses, work types, expense types)
//!
//! Photos are stored inline as base64. A cell that fails to decode reads as no
//! photo but stays in the file until a new photo replaces it. Every write replaces the whole file through a
//! temp file and a rename, so a crash never leaves a half-written table.
//!
//! ```csv
//! id,make,model,plate,mileage,year,status_id,driver_id,is_archived,photo
//! 1,Lada,Vesta,A123BC77,51200,2020,1,3,false,
//! ```

pub mod address_repository;
pub mod car_repository;
pub mod connection;
pub mod driver_repository;
pub mod expense_repository;
pub mod reference_repository;
pub mod service_record_repository;

#[cfg(test)]
pub mod test_utils;

pub use address_repository::AddressRepository;
pub use car_repository::CarRepository;
pub use connection::CsvConnection;
pub use driver_repository::DriverRepository;
pub use expense_repository::ExpenseRepository;
pub use reference_repository::ReferenceRepository;
pub use service_record_repository::ServiceRecordRepository;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::warn;

pub(crate) fn encode_photo(photo: Option<&[u8]>) -> Option<String> {
    photo.map(|bytes| STANDARD.encode(bytes))
}

/// Photo cell for a rewritten row. A new photo is encoded; without one, a stored
/// cell that does not decode is kept verbatim so rewriting the row never loses it.
pub(crate) fn carry_photo(photo: Option<&[u8]>, stored: Option<&str>) -> Option<String> {
    match photo {
        Some(bytes) => Some(STANDARD.encode(bytes)),
        None => stored
            .filter(|raw| STANDARD.decode(raw).is_err())
            .map(str::to_string),
    }
}

/// Malformed photo data is dropped rather than failing the whole table
pub(crate) fn decode_photo(encoded: Option<&str>, owner: &str) -> Option<Vec<u8>> {
    let encoded = encoded?;
    match STANDARD.decode(encoded) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            warn!("Discarding unreadable photo data for {}: {}", owner, e);
            None
        }
    }
}
