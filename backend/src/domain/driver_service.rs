use anyhow::{anyhow, Result};
use log::{info, warn};

use super::commands::driver::{
    AddressForm, CreateDriverCommand, DeleteDriverResult, DriverForm, UpdateDriverCommand,
};
use super::errors::ValidationError;
use super::models::address::Address;
use super::models::driver::{Driver, DriverDetails};
use super::photo::{photo_view, PhotoView};
use super::validation;
use crate::config::ValidationConfig;
use crate::storage::traits::{AddressStorage, CarStorage, Connection, DriverStorage};

/// Which phone length rule applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormMode {
    Create,
    Edit,
}

struct ValidatedDriver {
    surname: String,
    given_name: String,
    patronymic: Option<String>,
    phone: String,
    experience_years: Option<u32>,
    license_series: String,
    license_number: String,
    /// `None` when every address field was left blank
    address: Option<Address>,
}

/// Service for managing drivers and their addresses
#[derive(Clone)]
pub struct DriverService<C: Connection> {
    driver_repository: C::DriverRepository,
    address_repository: C::AddressRepository,
    car_repository: C::CarRepository,
    validation: ValidationConfig,
}

impl<C: Connection> DriverService<C> {
    pub fn new(connection: &C, validation: ValidationConfig) -> Self {
        Self {
            driver_repository: connection.create_driver_repository(),
            address_repository: connection.create_address_repository(),
            car_repository: connection.create_car_repository(),
            validation,
        }
    }

    pub fn create_driver(&self, command: CreateDriverCommand) -> Result<Driver> {
        info!(
            "Creating driver: {} {}",
            command.form.surname.trim(),
            command.form.given_name.trim()
        );

        let fields = self.validate_form(&command.form, FormMode::Create)?;
        let address_id = match &fields.address {
            Some(address) => Some(self.address_repository.store_address(address)?.id),
            None => None,
        };

        let driver = Driver {
            id: 0,
            surname: fields.surname,
            given_name: fields.given_name,
            patronymic: fields.patronymic,
            phone: fields.phone,
            experience_years: fields.experience_years,
            license_series: fields.license_series,
            license_number: fields.license_number,
            address_id,
            photo: command.form.photo,
        };

        let stored = self.driver_repository.store_driver(&driver)?;
        info!("Created driver {} with ID: {}", stored.short_name(), stored.id);
        Ok(stored)
    }

    /// Edit a driver. Clearing every address field detaches the address.
    ///
    /// The driver row is written before an existing address is changed in place. If the
    /// address write then fails, the previous driver row is put back. A new address is
    /// stored first since an unreferenced address row is harmless.
    pub fn update_driver(&self, command: UpdateDriverCommand) -> Result<Driver> {
        info!("Updating driver: {}", command.driver_id);

        let previous = self.require_driver(command.driver_id)?;
        let fields = self.validate_form(&command.form, FormMode::Edit)?;

        let existing_address = match previous.address_id {
            Some(address_id) => self.address_repository.get_address(address_id)?,
            None => None,
        };

        let mut driver = previous.clone();
        let mut address_in_place = None;
        driver.address_id = match fields.address {
            Some(mut address) => match &existing_address {
                Some(existing) => {
                    address.id = existing.id;
                    address_in_place = Some(address);
                    Some(existing.id)
                }
                None => Some(self.address_repository.store_address(&address)?.id),
            },
            None => None,
        };

        driver.surname = fields.surname;
        driver.given_name = fields.given_name;
        driver.patronymic = fields.patronymic;
        driver.phone = fields.phone;
        driver.experience_years = fields.experience_years;
        driver.license_series = fields.license_series;
        driver.license_number = fields.license_number;
        if let Some(photo) = command.form.photo {
            driver.photo = Some(photo);
        }

        self.driver_repository.update_driver(&driver)?;

        if let Some(address) = address_in_place {
            if let Err(err) = self.address_repository.update_address(&address) {
                if let Err(rollback) = self.driver_repository.update_driver(&previous) {
                    warn!(
                        "Failed to restore driver {} after address error: {}",
                        previous.id, rollback
                    );
                }
                return Err(err.context(format!(
                    "Failed to update address {} of driver {}",
                    address.id, driver.id
                )));
            }
        }

        info!("Updated driver {} ({})", driver.id, driver.short_name());
        Ok(driver)
    }

    /// Unassign the driver from every car, then delete it
    pub fn delete_driver(&self, driver_id: i64) -> Result<DeleteDriverResult> {
        info!("Deleting driver: {}", driver_id);

        let driver = self.require_driver(driver_id)?;

        let mut detached_cars = Vec::new();
        for mut car in self.car_repository.list_cars_by_driver(driver_id)? {
            car.driver_id = None;
            self.car_repository.update_car(&car)?;
            info!("Unassigned driver {} from car {}", driver_id, car.id);
            detached_cars.push(car);
        }

        self.driver_repository.delete_driver(driver_id)?;
        info!(
            "Deleted driver {} ({} cars unassigned)",
            driver_id,
            detached_cars.len()
        );

        Ok(DeleteDriverResult {
            driver,
            detached_cars,
        })
    }

    pub fn get_driver(&self, driver_id: i64) -> Result<Option<Driver>> {
        self.driver_repository.get_driver(driver_id)
    }

    pub fn require_driver(&self, driver_id: i64) -> Result<Driver> {
        self.driver_repository
            .get_driver(driver_id)?
            .ok_or_else(|| anyhow!("Driver not found: {}", driver_id))
    }

    pub fn list_drivers(&self) -> Result<Vec<Driver>> {
        self.driver_repository.list_drivers()
    }

    /// Driver with the resolved address
    pub fn driver_details(&self, driver_id: i64) -> Result<DriverDetails> {
        let driver = self.require_driver(driver_id)?;
        let address = match driver.address_id {
            Some(address_id) => self.address_repository.get_address(address_id)?,
            None => None,
        };
        Ok(DriverDetails { driver, address })
    }

    pub fn driver_photo(&self, driver_id: i64, max_width: u32, max_height: u32) -> Result<PhotoView> {
        let driver = self.require_driver(driver_id)?;
        Ok(photo_view(driver.photo.as_deref(), max_width, max_height))
    }

    fn validate_form(&self, form: &DriverForm, mode: FormMode) -> Result<ValidatedDriver> {
        let surname = validation::required("surname", &form.surname)?;
        let given_name = validation::required("name", &form.given_name)?;
        let phone = validation::required("phone", &form.phone)?;
        let license_series = validation::required("licence series", &form.license_series)?;
        let license_number = validation::required("licence number", &form.license_number)?;

        let expected_phone_length = match mode {
            FormMode::Create => self.validation.phone_length_on_create,
            FormMode::Edit => self.validation.phone_length_on_edit,
        };
        if phone.chars().count() != expected_phone_length {
            return Err(ValidationError::PhoneLength {
                expected: expected_phone_length,
            }
            .into());
        }
        if license_series.len() != 4 || !validation::is_all_digits(license_series) {
            return Err(ValidationError::LicenseSeries.into());
        }
        if license_number.len() != 6 || !validation::is_all_digits(license_number) {
            return Err(ValidationError::LicenseNumber.into());
        }
        if !validation::is_all_digits(phone) {
            return Err(ValidationError::PhoneNotDigits.into());
        }

        let experience_years = validation::optional_integer_in_range(
            "experience",
            &form.experience,
            0,
            self.validation.max_experience_years,
        )?;
        let address = self.validate_address(&form.address)?;

        Ok(ValidatedDriver {
            surname: surname.to_string(),
            given_name: given_name.to_string(),
            patronymic: validation::optional_text(&form.patronymic),
            phone: phone.to_string(),
            experience_years,
            license_series: license_series.to_string(),
            license_number: license_number.to_string(),
            address,
        })
    }

    fn validate_address(&self, form: &AddressForm) -> Result<Option<Address>, ValidationError> {
        if form.is_empty() {
            return Ok(None);
        }
        Ok(Some(Address {
            id: 0,
            region: validation::optional_text(&form.region),
            city: validation::optional_text(&form.city),
            street: validation::optional_text(&form.street),
            house: validation::optional_integer_in_range(
                "house",
                &form.house,
                0,
                self.validation.max_house_number,
            )?,
            postal_index: validation::optional_integer_in_range(
                "postal index",
                &form.postal_index,
                0,
                self.validation.max_postal_index,
            )?,
        }))
    }
}
