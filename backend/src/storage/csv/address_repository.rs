use anyhow::{bail, Result};
use log::info;
use serde::{Deserialize, Serialize};

use super::connection::{next_id, CsvConnection};
use crate::domain::models::address::Address;
use crate::storage::traits::AddressStorage;

const ADDRESSES_FILE: &str = "addresses.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AddressRow {
    id: i64,
    region: Option<String>,
    city: Option<String>,
    street: Option<String>,
    house: Option<u32>,
    postal_index: Option<u32>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: row.id,
            region: row.region,
            city: row.city,
            street: row.street,
            house: row.house,
            postal_index: row.postal_index,
        }
    }
}

impl From<&Address> for AddressRow {
    fn from(address: &Address) -> Self {
        AddressRow {
            id: address.id,
            region: address.region.clone(),
            city: address.city.clone(),
            street: address.street.clone(),
            house: address.house,
            postal_index: address.postal_index,
        }
    }
}

#[derive(Clone)]
pub struct AddressRepository {
    connection: CsvConnection,
}

impl AddressRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rows(&self) -> Result<Vec<AddressRow>> {
        self.connection.read_table(ADDRESSES_FILE)
    }
}

impl AddressStorage for AddressRepository {
    fn store_address(&self, address: &Address) -> Result<Address> {
        let mut rows = self.read_rows()?;
        let mut stored = address.clone();
        stored.id = next_id(rows.iter().map(|row| row.id));

        rows.push(AddressRow::from(&stored));
        self.connection.write_table(ADDRESSES_FILE, &rows)?;

        info!("Stored address {}", stored.id);
        Ok(stored)
    }

    fn get_address(&self, address_id: i64) -> Result<Option<Address>> {
        Ok(self
            .read_rows()?
            .into_iter()
            .find(|row| row.id == address_id)
            .map(Address::from))
    }

    fn update_address(&self, address: &Address) -> Result<()> {
        let mut rows = self.read_rows()?;
        match rows.iter_mut().find(|row| row.id == address.id) {
            Some(row) => *row = AddressRow::from(address),
            None => bail!("Address {} not found for update", address.id),
        }
        self.connection.write_table(ADDRESSES_FILE, &rows)
    }
}
