//! Command and result types for the entity services.
//!
//! Forms carry raw text exactly as typed; the services trim, parse and validate it.

pub mod car {
    /// Field values of the add/edit car form
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct CarForm {
        pub make: String,
        pub model: String,
        pub plate: String,
        pub mileage: String,
        pub year: String,
        pub status_id: i64,
        pub driver_id: Option<i64>,
        /// Replacement photo; on edit `None` keeps the existing one
        pub photo: Option<Vec<u8>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateCarCommand {
        pub form: CarForm,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct UpdateCarCommand {
        pub car_id: i64,
        pub form: CarForm,
    }
}

pub mod driver {
    use crate::domain::models::car::Car;
    use crate::domain::models::driver::Driver;

    /// Address part of the driver form
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct AddressForm {
        pub region: String,
        pub city: String,
        pub street: String,
        pub house: String,
        pub postal_index: String,
    }

    impl AddressForm {
        /// True when every address field is blank
        pub fn is_empty(&self) -> bool {
            [
                &self.region,
                &self.city,
                &self.street,
                &self.house,
                &self.postal_index,
            ]
            .iter()
            .all(|value| value.trim().is_empty())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct DriverForm {
        pub surname: String,
        pub given_name: String,
        pub patronymic: String,
        pub phone: String,
        pub experience: String,
        pub license_series: String,
        pub license_number: String,
        pub address: AddressForm,
        /// Replacement photo; on edit `None` keeps the existing one
        pub photo: Option<Vec<u8>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateDriverCommand {
        pub form: DriverForm,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct UpdateDriverCommand {
        pub driver_id: i64,
        pub form: DriverForm,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct DeleteDriverResult {
        pub driver: Driver,
        /// Cars that lost their driver assignment
        pub detached_cars: Vec<Car>,
    }
}

pub mod service {
    use chrono::NaiveDate;

    use crate::domain::mileage::ReconcileOutcome;
    use crate::domain::models::service_record::ServiceRecord;

    /// Field values of the add/edit service form
    #[derive(Debug, Clone, PartialEq)]
    pub struct ServiceForm {
        pub date_service: Option<NaiveDate>,
        pub work_type_id: i64,
        pub next_date: Option<NaiveDate>,
        pub odometer: String,
        pub conclusion: String,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateServiceCommand {
        pub car_id: i64,
        pub form: ServiceForm,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct UpdateServiceCommand {
        pub service_id: i64,
        pub form: ServiceForm,
    }

    /// A service record write together with the mileage reconciliation it triggered
    #[derive(Debug, Clone, PartialEq)]
    pub struct ServiceMutationResult {
        /// The created, updated or deleted record
        pub record: ServiceRecord,
        pub reconciliation: ReconcileOutcome,
    }
}

pub mod expense {
    use chrono::NaiveDate;

    #[derive(Debug, Clone, PartialEq)]
    pub struct ExpenseForm {
        pub expense_type_id: i64,
        pub amount: String,
        pub date: NaiveDate,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct CreateExpenseCommand {
        pub car_id: i64,
        pub form: ExpenseForm,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct UpdateExpenseCommand {
        pub expense_id: i64,
        pub form: ExpenseForm,
    }
}
