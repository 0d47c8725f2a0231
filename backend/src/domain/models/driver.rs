use serde::{Deserialize, Serialize};

use super::address::Address;

/// A person who may be assigned to cars
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub surname: String,
    pub given_name: String,
    pub patronymic: Option<String>,
    pub phone: String,
    /// Driving experience in years
    pub experience_years: Option<u32>,
    pub license_series: String,
    pub license_number: String,
    pub address_id: Option<i64>,
    pub photo: Option<Vec<u8>>,
}

impl Driver {
    /// "Surname Name Patronymic", without a trailing blank when there is no patronymic
    pub fn full_name(&self) -> String {
        match self.patronymic.as_deref() {
            Some(patronymic) => format!("{} {} {}", self.surname, self.given_name, patronymic),
            None => self.short_name(),
        }
    }

    /// "Surname Name", used in selectors and confirmations
    pub fn short_name(&self) -> String {
        format!("{} {}", self.surname, self.given_name)
    }
}

/// Driver together with the resolved address, for the details view
#[derive(Debug, Clone, PartialEq)]
pub struct DriverDetails {
    pub driver: Driver,
    pub address: Option<Address>,
}
