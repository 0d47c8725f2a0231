use anyhow::{anyhow, Result};
use log::{info, warn};
use shared::{ArchiveListItem, CarCard, FleetOverview};

use super::commands::car::{CarForm, CreateCarCommand, UpdateCarCommand};
use super::errors::ValidationError;
use super::models::car::Car;
use super::models::lookup::Status;
use super::photo::{photo_view, PhotoView};
use super::validation;
use crate::config::ValidationConfig;
use crate::storage::traits::{CarStorage, Connection, DriverStorage, ReferenceDataStorage};

const UNASSIGNED: &str = "Unassigned";
const UNKNOWN_STATUS: &str = "Unknown";

/// Form fields after validation
struct ValidatedCar {
    make: String,
    model: String,
    plate: String,
    mileage: u32,
    year: i32,
}

/// Service for registering, editing, archiving and finding cars
#[derive(Clone)]
pub struct CarService<C: Connection> {
    car_repository: C::CarRepository,
    driver_repository: C::DriverRepository,
    reference_repository: C::ReferenceRepository,
    validation: ValidationConfig,
}

impl<C: Connection> CarService<C> {
    pub fn new(connection: &C, validation: ValidationConfig) -> Self {
        Self {
            car_repository: connection.create_car_repository(),
            driver_repository: connection.create_driver_repository(),
            reference_repository: connection.create_reference_repository(),
            validation,
        }
    }

    /// Register a new active car
    pub fn create_car(&self, command: CreateCarCommand) -> Result<Car> {
        info!("Creating car: plate={}", command.form.plate.trim());

        let fields = self.validate_form(&command.form, None)?;
        let car = Car {
            id: 0,
            make: fields.make,
            model: fields.model,
            plate: fields.plate,
            mileage: fields.mileage,
            year: fields.year,
            photo: command.form.photo,
            status_id: command.form.status_id,
            driver_id: command.form.driver_id,
            is_archived: false,
        };

        let stored = self.car_repository.store_car(&car)?;
        info!("Created car {} with ID: {}", stored.title(), stored.id);
        Ok(stored)
    }

    /// Edit an existing car; the photo is only replaced when a new one is given
    pub fn update_car(&self, command: UpdateCarCommand) -> Result<Car> {
        info!("Updating car: {}", command.car_id);

        let mut car = self.require_car(command.car_id)?;
        let fields = self.validate_form(&command.form, Some(car.id))?;

        car.make = fields.make;
        car.model = fields.model;
        car.plate = fields.plate;
        car.mileage = fields.mileage;
        car.year = fields.year;
        car.status_id = command.form.status_id;
        car.driver_id = command.form.driver_id;
        if let Some(photo) = command.form.photo {
            car.photo = Some(photo);
        }

        self.car_repository.update_car(&car)?;
        info!("Updated car {} ({})", car.id, car.plate);
        Ok(car)
    }

    pub fn get_car(&self, car_id: i64) -> Result<Option<Car>> {
        self.car_repository.get_car(car_id)
    }

    pub fn require_car(&self, car_id: i64) -> Result<Car> {
        self.car_repository
            .get_car(car_id)?
            .ok_or_else(|| anyhow!("Car not found: {}", car_id))
    }

    /// Move a car out of the active fleet
    pub fn archive_car(&self, car_id: i64) -> Result<Car> {
        self.set_archived(car_id, true)
    }

    /// Bring an archived car back into the active fleet
    pub fn restore_car(&self, car_id: i64) -> Result<Car> {
        self.set_archived(car_id, false)
    }

    fn set_archived(&self, car_id: i64, archived: bool) -> Result<Car> {
        let mut car = self.require_car(car_id)?;
        if car.is_archived == archived {
            warn!("Car {} already has is_archived={}", car_id, archived);
            return Ok(car);
        }

        car.is_archived = archived;
        self.car_repository.update_car(&car)?;
        info!(
            "{} car {} ({})",
            if archived { "Archived" } else { "Restored" },
            car.id,
            car.plate
        );
        Ok(car)
    }

    pub fn list_active_cars(&self) -> Result<Vec<Car>> {
        self.car_repository.list_cars(false)
    }

    pub fn list_archived_cars(&self) -> Result<Vec<Car>> {
        self.car_repository.list_cars(true)
    }

    /// Position of the first active car matching the query, in active-list order
    pub fn search_active(&self, query: &str) -> Result<Option<usize>> {
        if query.trim().is_empty() {
            return Err(ValidationError::EmptySearchQuery.into());
        }
        let position = self
            .list_active_cars()?
            .iter()
            .position(|car| car.matches_query(query));
        if position.is_none() {
            info!("No active car matches '{}'", query.trim());
        }
        Ok(position)
    }

    /// Archived cars matching the query; a blank query lists the whole archive
    pub fn search_archive(&self, query: &str) -> Result<Vec<ArchiveListItem>> {
        let cars = self.list_archived_cars()?;
        Ok(cars
            .iter()
            .filter(|car| query.trim().is_empty() || car.matches_query(query))
            .map(|car| ArchiveListItem {
                car_id: car.id,
                label: car.archive_label(),
            })
            .collect())
    }

    /// Car photo fitted into a `max_width` x `max_height` frame
    pub fn car_photo(&self, car_id: i64, max_width: u32, max_height: u32) -> Result<PhotoView> {
        let car = self.require_car(car_id)?;
        Ok(photo_view(car.photo.as_deref(), max_width, max_height))
    }

    pub fn list_statuses(&self) -> Result<Vec<Status>> {
        self.reference_repository.list_statuses()
    }

    /// Status label, "Unknown" when the reference is missing
    pub fn status_label(&self, status_id: i64) -> Result<String> {
        Ok(match self.reference_repository.get_status(status_id)? {
            Some(status) => status.label,
            None => {
                warn!("Status {} is not in the reference data", status_id);
                UNKNOWN_STATUS.to_string()
            }
        })
    }

    /// Display projection of a car
    pub fn car_card(&self, car: &Car) -> Result<CarCard> {
        let driver = match car.driver_id {
            Some(driver_id) => self.driver_repository.get_driver(driver_id)?,
            None => None,
        };

        Ok(CarCard {
            car_id: car.id,
            title: car.title(),
            plate: car.plate.clone(),
            mileage: format!("{} km", car.mileage),
            year: car.year,
            status: self.status_label(car.status_id)?,
            driver_name: driver
                .as_ref()
                .map(|d| d.full_name())
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            driver_id: driver.map(|d| d.id),
            has_photo: car.photo.is_some(),
            is_archived: car.is_archived,
        })
    }

    /// Cards for the whole active fleet plus the archive size
    pub fn fleet_overview(&self) -> Result<FleetOverview> {
        let active_cars = self
            .list_active_cars()?
            .iter()
            .map(|car| self.car_card(car))
            .collect::<Result<Vec<_>>>()?;
        let archived_count = self.list_archived_cars()?.len();

        Ok(FleetOverview {
            active_cars,
            archived_count,
        })
    }

    fn validate_form(&self, form: &CarForm, exclude_id: Option<i64>) -> Result<ValidatedCar> {
        let rules = &self.validation;

        let make = validation::required("make", &form.make)?;
        let model = validation::required("model", &form.model)?;
        let plate = validation::required("plate", &form.plate)?;
        validation::required("mileage", &form.mileage)?;
        validation::required("year", &form.year)?;

        let mileage = validation::integer_in_range("mileage", &form.mileage, 0, rules.max_mileage)?;
        let year =
            validation::integer_in_range("year", &form.year, rules.min_year, rules.max_year)?;

        if plate.chars().count() > rules.max_plate_length {
            return Err(ValidationError::PlateTooLong {
                max: rules.max_plate_length,
            }
            .into());
        }

        if let Some(existing) = self.car_repository.find_car_by_plate(plate)? {
            if Some(existing.id) != exclude_id {
                return Err(ValidationError::DuplicatePlate(plate.to_string()).into());
            }
        }

        if self.reference_repository.get_status(form.status_id)?.is_none() {
            return Err(ValidationError::UnknownReference {
                kind: "status",
                id: form.status_id,
            }
            .into());
        }

        if let Some(driver_id) = form.driver_id {
            if self.driver_repository.get_driver(driver_id)?.is_none() {
                return Err(ValidationError::UnknownReference {
                    kind: "driver",
                    id: driver_id,
                }
                .into());
            }
        }

        Ok(ValidatedCar {
            make: make.to_string(),
            model: model.to_string(),
            plate: plate.to_string(),
            mileage,
            year,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::expense::Expense;
    use crate::storage::csv::test_utils::{date, sample_driver, sample_service, TestHelper};
    use crate::storage::csv::CsvConnection;
    use crate::storage::traits::{ExpenseStorage, ServiceRecordStorage};
    use rust_decimal_macros::dec;
    use std::fs;

    fn service(helper: &TestHelper) -> CarService<CsvConnection> {
        CarService::new(&helper.env.connection, ValidationConfig::default())
    }

    fn form(plate: &str) -> CarForm {
        CarForm {
            make: "Lada".to_string(),
            model: "Vesta".to_string(),
            plate: plate.to_string(),
            mileage: "15000".to_string(),
            year: "2020".to_string(),
            status_id: 1,
            driver_id: None,
            photo: None,
        }
    }

    fn validation_error(result: Result<Car>) -> ValidationError {
        result
            .unwrap_err()
            .downcast::<ValidationError>()
            .expect("expected a validation error")
    }

    #[test]
    fn test_create_car() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);

        let car = service
            .create_car(CreateCarCommand { form: form(" A123BC77 ") })
            .unwrap();
        assert_eq!(car.plate, "A123BC77");
        assert_eq!(car.mileage, 15000);
        assert!(!car.is_archived);
        assert_eq!(service.list_active_cars().unwrap().len(), 1);
    }

    #[test]
    fn test_create_car_rejects_bad_input() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);

        let mut missing = form("A123BC77");
        missing.model = "  ".to_string();
        assert_eq!(
            validation_error(service.create_car(CreateCarCommand { form: missing })),
            ValidationError::MissingField("model")
        );

        let mut long_plate = form("A123BC7777");
        long_plate.plate = "A123BC7777".to_string();
        assert_eq!(
            validation_error(service.create_car(CreateCarCommand { form: long_plate })),
            ValidationError::PlateTooLong { max: 9 }
        );

        let mut bad_year = form("A123BC77");
        bad_year.year = "1899".to_string();
        assert!(matches!(
            validation_error(service.create_car(CreateCarCommand { form: bad_year })),
            ValidationError::OutOfRange { field: "year", .. }
        ));

        let mut bad_mileage = form("A123BC77");
        bad_mileage.mileage = "12k".to_string();
        assert_eq!(
            validation_error(service.create_car(CreateCarCommand { form: bad_mileage })),
            ValidationError::NotANumber { field: "mileage" }
        );

        let mut bad_status = form("A123BC77");
        bad_status.status_id = 99;
        assert_eq!(
            validation_error(service.create_car(CreateCarCommand { form: bad_status })),
            ValidationError::UnknownReference {
                kind: "status",
                id: 99
            }
        );

        assert!(service.list_active_cars().unwrap().is_empty());
    }

    #[test]
    fn test_plate_must_be_unique_ignoring_case_even_in_archive() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        let car = service.create_car(CreateCarCommand { form: form("A123BC77") }).unwrap();
        service.archive_car(car.id).unwrap();

        assert_eq!(
            validation_error(service.create_car(CreateCarCommand { form: form("a123bc77") })),
            ValidationError::DuplicatePlate("a123bc77".to_string())
        );
    }

    #[test]
    fn test_update_keeps_own_plate_and_photo() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        let mut with_photo = form("A123BC77");
        with_photo.photo = Some(vec![1, 2, 3]);
        let car = service.create_car(CreateCarCommand { form: with_photo }).unwrap();

        let mut edit = form("A123BC77");
        edit.mileage = "16000".to_string();
        let updated = service
            .update_car(UpdateCarCommand {
                car_id: car.id,
                form: edit,
            })
            .unwrap();

        assert_eq!(updated.mileage, 16000);
        assert_eq!(updated.photo, Some(vec![1, 2, 3]));

        // stored bytes are not an image, the frame shows a placeholder
        assert_eq!(
            service.car_photo(car.id, 300, 200).unwrap(),
            PhotoView::Placeholder(crate::domain::photo::PHOTO_LOAD_FAILED)
        );
    }

    #[test]
    fn test_archive_and_restore() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        let car = service.create_car(CreateCarCommand { form: form("A123BC77") }).unwrap();

        service.archive_car(car.id).unwrap();
        assert!(service.list_active_cars().unwrap().is_empty());
        assert_eq!(service.list_archived_cars().unwrap().len(), 1);

        service.restore_car(car.id).unwrap();
        assert_eq!(service.list_active_cars().unwrap().len(), 1);
        assert!(service.list_archived_cars().unwrap().is_empty());
    }

    #[test]
    fn test_archive_round_trip_leaves_car_and_history_untouched() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        let mut with_photo = form("A123BC77");
        with_photo.photo = Some(vec![9, 8, 7]);
        let car = service.create_car(CreateCarCommand { form: with_photo }).unwrap();
        helper
            .service_repo
            .store_service_record(&sample_service(car.id, Some(date(2023, 1, 10)), Some(48000)))
            .unwrap();
        helper
            .service_repo
            .store_service_record(&sample_service(car.id, None, None))
            .unwrap();
        helper
            .expense_repo
            .store_expense(&Expense {
                id: 0,
                car_id: car.id,
                expense_type_id: 2,
                amount: dec!(1234.50),
                date: date(2023, 2, 1),
            })
            .unwrap();

        let snapshot = |helper: &TestHelper| {
            (
                helper.car_repo.get_car(car.id).unwrap(),
                helper.service_repo.list_service_records(car.id).unwrap(),
                helper.expense_repo.list_expenses(car.id).unwrap(),
                fs::read(helper.env.base_path.join("service_records.csv")).unwrap(),
                fs::read(helper.env.base_path.join("expenses.csv")).unwrap(),
            )
        };
        let before = snapshot(&helper);

        service.archive_car(car.id).unwrap();
        assert!(service.list_active_cars().unwrap().is_empty());
        assert_eq!(service.list_archived_cars().unwrap().len(), 1);
        service.restore_car(car.id).unwrap();
        assert_eq!(service.list_active_cars().unwrap().len(), 1);
        assert!(service.list_archived_cars().unwrap().is_empty());

        assert_eq!(snapshot(&helper), before);
    }

    #[test]
    fn test_archive_round_trip_keeps_unreadable_photo_bytes() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        let car = service.create_car(CreateCarCommand { form: form("A123BC77") }).unwrap();
        let cars_file = helper.env.base_path.join("cars.csv");
        let corrupted = fs::read_to_string(&cars_file)
            .unwrap()
            .replace("false,\n", "false,@@notbase64@@\n");
        fs::write(&cars_file, &corrupted).unwrap();

        service.archive_car(car.id).unwrap();
        service.restore_car(car.id).unwrap();

        assert_eq!(fs::read_to_string(&cars_file).unwrap(), corrupted);
    }

    #[test]
    fn test_search_active_and_archive() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        service.create_car(CreateCarCommand { form: form("A111AA77") }).unwrap();
        let mut kia = form("B222BB77");
        kia.make = "Kia".to_string();
        kia.model = "Rio".to_string();
        let kia = service.create_car(CreateCarCommand { form: kia }).unwrap();

        assert_eq!(service.search_active("kia rio").unwrap(), Some(1));
        assert_eq!(service.search_active("a111").unwrap(), Some(0));
        assert_eq!(service.search_active("volvo").unwrap(), None);
        let empty = service.search_active("   ").unwrap_err();
        assert_eq!(
            empty.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EmptySearchQuery)
        );

        service.archive_car(kia.id).unwrap();
        let all = service.search_archive("").unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].label, "Kia Rio (B222BB77)");
        assert!(service.search_archive("lada").unwrap().is_empty());
    }

    #[test]
    fn test_car_card_resolves_driver_and_status() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        let mut driver = sample_driver("Petrov", "Ivan");
        driver.patronymic = Some("Sergeevich".to_string());
        let driver = helper.driver_repo.store_driver(&driver).unwrap();

        let mut assigned = form("A111AA77");
        assigned.driver_id = Some(driver.id);
        let car = service.create_car(CreateCarCommand { form: assigned }).unwrap();
        let card = service.car_card(&car).unwrap();

        assert_eq!(card.title, "Lada Vesta");
        assert_eq!(card.mileage, "15000 km");
        assert_eq!(card.status, "In service");
        assert_eq!(card.driver_name, "Petrov Ivan Sergeevich");
        assert_eq!(card.driver_id, Some(driver.id));

        let unassigned = service.create_car(CreateCarCommand { form: form("B222BB77") }).unwrap();
        assert_eq!(service.car_card(&unassigned).unwrap().driver_name, "Unassigned");
    }

    #[test]
    fn test_fleet_overview() {
        let helper = TestHelper::new().unwrap();
        let service = service(&helper);
        service.create_car(CreateCarCommand { form: form("A111AA77") }).unwrap();
        let archived = service.create_car(CreateCarCommand { form: form("B222BB77") }).unwrap();
        service.archive_car(archived.id).unwrap();

        let overview = service.fleet_overview().unwrap();
        assert_eq!(overview.active_cars.len(), 1);
        assert_eq!(overview.archived_count, 1);
    }
}
