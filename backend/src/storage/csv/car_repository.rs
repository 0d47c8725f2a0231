use anyhow::{bail, Result};
use log::info;
use serde::{Deserialize, Serialize};

use super::connection::{next_id, CsvConnection};
use super::{carry_photo, decode_photo, encode_photo};
use crate::domain::models::car::Car;
use crate::storage::traits::CarStorage;

const CARS_FILE: &str = "cars.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CarRow {
    id: i64,
    make: String,
    model: String,
    plate: String,
    mileage: u32,
    year: i32,
    status_id: i64,
    driver_id: Option<i64>,
    is_archived: bool,
    photo: Option<String>,
}

impl CarRow {
    fn from_domain(car: &Car) -> Self {
        CarRow {
            id: car.id,
            make: car.make.clone(),
            model: car.model.clone(),
            plate: car.plate.clone(),
            mileage: car.mileage,
            year: car.year,
            status_id: car.status_id,
            driver_id: car.driver_id,
            is_archived: car.is_archived,
            photo: encode_photo(car.photo.as_deref()),
        }
    }

    fn into_domain(self) -> Car {
        let photo = decode_photo(self.photo.as_deref(), &format!("car {}", self.id));
        Car {
            id: self.id,
            make: self.make,
            model: self.model,
            plate: self.plate,
            mileage: self.mileage,
            year: self.year,
            photo,
            status_id: self.status_id,
            driver_id: self.driver_id,
            is_archived: self.is_archived,
        }
    }
}

#[derive(Clone)]
pub struct CarRepository {
    connection: CsvConnection,
}

impl CarRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rows(&self) -> Result<Vec<CarRow>> {
        self.connection.read_table(CARS_FILE)
    }

    fn read_cars(&self) -> Result<Vec<Car>> {
        Ok(self.read_rows()?.into_iter().map(CarRow::into_domain).collect())
    }
}

impl CarStorage for CarRepository {
    fn store_car(&self, car: &Car) -> Result<Car> {
        let mut rows = self.read_rows()?;
        let mut stored = car.clone();
        stored.id = next_id(rows.iter().map(|row| row.id));

        rows.push(CarRow::from_domain(&stored));
        self.connection.write_table(CARS_FILE, &rows)?;

        info!("Stored car {} ({})", stored.id, stored.plate);
        Ok(stored)
    }

    fn get_car(&self, car_id: i64) -> Result<Option<Car>> {
        Ok(self
            .read_rows()?
            .into_iter()
            .find(|row| row.id == car_id)
            .map(CarRow::into_domain))
    }

    fn list_cars(&self, archived: bool) -> Result<Vec<Car>> {
        let mut cars: Vec<Car> = self
            .read_cars()?
            .into_iter()
            .filter(|car| car.is_archived == archived)
            .collect();
        cars.sort_by_key(|car| car.id);
        Ok(cars)
    }

    fn find_car_by_plate(&self, plate: &str) -> Result<Option<Car>> {
        let wanted = plate.trim().to_lowercase();
        Ok(self
            .read_rows()?
            .into_iter()
            .find(|row| row.plate.trim().to_lowercase() == wanted)
            .map(CarRow::into_domain))
    }

    fn list_cars_by_driver(&self, driver_id: i64) -> Result<Vec<Car>> {
        Ok(self
            .read_cars()?
            .into_iter()
            .filter(|car| car.driver_id == Some(driver_id))
            .collect())
    }

    fn update_car(&self, car: &Car) -> Result<()> {
        let mut rows = self.read_rows()?;
        match rows.iter_mut().find(|row| row.id == car.id) {
            Some(row) => {
                let photo = carry_photo(car.photo.as_deref(), row.photo.as_deref());
                *row = CarRow::from_domain(car);
                row.photo = photo;
            }
            None => bail!("Car {} not found for update", car.id),
        }
        self.connection.write_table(CARS_FILE, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{sample_car, TestHelper};
    use std::fs;

    #[test]
    fn test_list_cars_splits_active_and_archived() {
        let helper = TestHelper::new().unwrap();
        let first = helper.car_repo.store_car(&sample_car("A111AA77")).unwrap();
        let mut second = helper.car_repo.store_car(&sample_car("B222BB77")).unwrap();
        second.is_archived = true;
        helper.car_repo.update_car(&second).unwrap();

        let active = helper.car_repo.list_cars(false).unwrap();
        let archived = helper.car_repo.list_cars(true).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, first.id);
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].id, second.id);
    }

    #[test]
    fn test_find_car_by_plate_ignores_case() {
        let helper = TestHelper::new().unwrap();
        let stored = helper.car_repo.store_car(&sample_car("A111AA77")).unwrap();

        let found = helper.car_repo.find_car_by_plate("a111aa77").unwrap();
        assert_eq!(found.map(|car| car.id), Some(stored.id));
        assert!(helper.car_repo.find_car_by_plate("X000XX00").unwrap().is_none());
    }

    #[test]
    fn test_list_cars_by_driver() {
        let helper = TestHelper::new().unwrap();
        let mut car = sample_car("A111AA77");
        car.driver_id = Some(5);
        helper.car_repo.store_car(&car).unwrap();
        helper.car_repo.store_car(&sample_car("B222BB77")).unwrap();

        let assigned = helper.car_repo.list_cars_by_driver(5).unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].plate, "A111AA77");
    }

    #[test]
    fn test_unreadable_photo_survives_updates() {
        let helper = TestHelper::new().unwrap();
        let mut car = helper.car_repo.store_car(&sample_car("A111AA77")).unwrap();
        let path = helper.env.base_path.join(CARS_FILE);
        let corrupted = fs::read_to_string(&path)
            .unwrap()
            .replace("false,\n", "false,@@notbase64@@\n");
        fs::write(&path, &corrupted).unwrap();

        let loaded = helper.car_repo.get_car(car.id).unwrap().unwrap();
        assert_eq!(loaded.photo, None);

        car.mileage = 2000;
        helper.car_repo.update_car(&car).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains(",@@notbase64@@"));

        car.photo = Some(vec![1, 2, 3]);
        helper.car_repo.update_car(&car).unwrap();
        let replaced = fs::read_to_string(&path).unwrap();
        assert!(!replaced.contains("@@notbase64@@"));
        assert_eq!(
            helper.car_repo.get_car(car.id).unwrap().unwrap().photo,
            Some(vec![1, 2, 3])
        );
    }

    #[test]
    fn test_update_missing_car_fails() {
        let helper = TestHelper::new().unwrap();
        let mut car = sample_car("A111AA77");
        car.id = 10;
        assert!(helper.car_repo.update_car(&car).is_err());
    }
}
