use anyhow::{bail, Result};
use log::info;
use serde::{Deserialize, Serialize};

use super::connection::{next_id, CsvConnection};
use super::{carry_photo, decode_photo, encode_photo};
use crate::domain::models::driver::Driver;
use crate::storage::traits::DriverStorage;

const DRIVERS_FILE: &str = "drivers.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DriverRow {
    id: i64,
    surname: String,
    given_name: String,
    patronymic: Option<String>,
    phone: String,
    experience_years: Option<u32>,
    license_series: String,
    license_number: String,
    address_id: Option<i64>,
    photo: Option<String>,
}

impl DriverRow {
    fn from_domain(driver: &Driver) -> Self {
        DriverRow {
            id: driver.id,
            surname: driver.surname.clone(),
            given_name: driver.given_name.clone(),
            patronymic: driver.patronymic.clone(),
            phone: driver.phone.clone(),
            experience_years: driver.experience_years,
            license_series: driver.license_series.clone(),
            license_number: driver.license_number.clone(),
            address_id: driver.address_id,
            photo: encode_photo(driver.photo.as_deref()),
        }
    }

    fn into_domain(self) -> Driver {
        let photo = decode_photo(self.photo.as_deref(), &format!("driver {}", self.id));
        Driver {
            id: self.id,
            surname: self.surname,
            given_name: self.given_name,
            patronymic: self.patronymic,
            phone: self.phone,
            experience_years: self.experience_years,
            license_series: self.license_series,
            license_number: self.license_number,
            address_id: self.address_id,
            photo,
        }
    }
}

#[derive(Clone)]
pub struct DriverRepository {
    connection: CsvConnection,
}

impl DriverRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rows(&self) -> Result<Vec<DriverRow>> {
        self.connection.read_table(DRIVERS_FILE)
    }
}

impl DriverStorage for DriverRepository {
    fn store_driver(&self, driver: &Driver) -> Result<Driver> {
        let mut rows = self.read_rows()?;
        let mut stored = driver.clone();
        stored.id = next_id(rows.iter().map(|row| row.id));

        rows.push(DriverRow::from_domain(&stored));
        self.connection.write_table(DRIVERS_FILE, &rows)?;

        info!("Stored driver {} ({})", stored.id, stored.short_name());
        Ok(stored)
    }

    fn get_driver(&self, driver_id: i64) -> Result<Option<Driver>> {
        Ok(self
            .read_rows()?
            .into_iter()
            .find(|row| row.id == driver_id)
            .map(DriverRow::into_domain))
    }

    fn list_drivers(&self) -> Result<Vec<Driver>> {
        let mut drivers: Vec<Driver> = self
            .read_rows()?
            .into_iter()
            .map(DriverRow::into_domain)
            .collect();
        drivers.sort_by(|a, b| {
            a.surname
                .cmp(&b.surname)
                .then_with(|| a.given_name.cmp(&b.given_name))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(drivers)
    }

    fn update_driver(&self, driver: &Driver) -> Result<()> {
        let mut rows = self.read_rows()?;
        match rows.iter_mut().find(|row| row.id == driver.id) {
            Some(row) => {
                let photo = carry_photo(driver.photo.as_deref(), row.photo.as_deref());
                *row = DriverRow::from_domain(driver);
                row.photo = photo;
            }
            None => bail!("Driver {} not found for update", driver.id),
        }
        self.connection.write_table(DRIVERS_FILE, &rows)
    }

    fn delete_driver(&self, driver_id: i64) -> Result<bool> {
        let mut rows = self.read_rows()?;
        let before = rows.len();
        rows.retain(|row| row.id != driver_id);
        if rows.len() == before {
            return Ok(false);
        }
        self.connection.write_table(DRIVERS_FILE, &rows)?;
        info!("Deleted driver {}", driver_id);
        Ok(true)
    }
}
