use anyhow::{anyhow, Result};
use log::info;
use rust_decimal::Decimal;
use shared::ExpenseTableRow;

use super::commands::expense::{CreateExpenseCommand, ExpenseForm, UpdateExpenseCommand};
use super::errors::ValidationError;
use super::models::expense::Expense;
use super::models::lookup::ExpenseType;
use super::record_table::RecordTableFormatter;
use super::validation;
use crate::config::ValidationConfig;
use crate::storage::traits::{CarStorage, Connection, ExpenseStorage, ReferenceDataStorage};

/// Service for money spent on cars
#[derive(Clone)]
pub struct ExpenseService<C: Connection> {
    expense_repository: C::ExpenseRepository,
    car_repository: C::CarRepository,
    reference_repository: C::ReferenceRepository,
    formatter: RecordTableFormatter,
    validation: ValidationConfig,
}

impl<C: Connection> ExpenseService<C> {
    pub fn new(connection: &C, validation: ValidationConfig) -> Self {
        Self {
            expense_repository: connection.create_expense_repository(),
            car_repository: connection.create_car_repository(),
            reference_repository: connection.create_reference_repository(),
            formatter: RecordTableFormatter::new(),
            validation,
        }
    }

    pub fn create_expense(&self, command: CreateExpenseCommand) -> Result<Expense> {
        info!("Adding expense for car {}", command.car_id);

        if self.car_repository.get_car(command.car_id)?.is_none() {
            return Err(anyhow!("Car not found: {}", command.car_id));
        }

        let (expense_type_id, amount) = self.validate_form(&command.form)?;
        let expense = Expense {
            id: 0,
            car_id: command.car_id,
            expense_type_id,
            amount,
            date: command.form.date,
        };
        self.expense_repository.store_expense(&expense)
    }

    pub fn update_expense(&self, command: UpdateExpenseCommand) -> Result<Expense> {
        info!("Updating expense {}", command.expense_id);

        let mut expense = self.require_expense(command.expense_id)?;
        let (expense_type_id, amount) = self.validate_form(&command.form)?;
        expense.expense_type_id = expense_type_id;
        expense.amount = amount;
        expense.date = command.form.date;

        self.expense_repository.update_expense(&expense)?;
        Ok(expense)
    }

    pub fn delete_expense(&self, expense_id: i64) -> Result<Expense> {
        info!("Deleting expense {}", expense_id);

        let expense = self.require_expense(expense_id)?;
        self.expense_repository.delete_expense(expense_id)?;
        Ok(expense)
    }

    pub fn require_expense(&self, expense_id: i64) -> Result<Expense> {
        self.expense_repository
            .get_expense(expense_id)?
            .ok_or_else(|| anyhow!("Expense not found: {}", expense_id))
    }

    pub fn list_for_car(&self, car_id: i64) -> Result<Vec<Expense>> {
        self.expense_repository.list_expenses(car_id)
    }

    pub fn list_expense_types(&self) -> Result<Vec<ExpenseType>> {
        self.reference_repository.list_expense_types()
    }

    pub fn total_for_car(&self, car_id: i64) -> Result<Decimal> {
        Ok(self.list_for_car(car_id)?.iter().map(|e| e.amount).sum())
    }

    /// Display rows of the expense table
    pub fn expense_table(&self, car_id: i64) -> Result<Vec<ExpenseTableRow>> {
        let expense_types = self.reference_repository.list_expense_types()?;
        Ok(self
            .list_for_car(car_id)?
            .iter()
            .map(|expense| {
                let label = expense_types
                    .iter()
                    .find(|t| t.id == expense.expense_type_id)
                    .map(|t| t.label.as_str());
                self.formatter.expense_row(expense, label)
            })
            .collect())
    }

    fn validate_form(&self, form: &ExpenseForm) -> Result<(i64, Decimal)> {
        let amount = validation::amount(&form.amount, self.validation.max_amount)?;

        if self
            .reference_repository
            .get_expense_type(form.expense_type_id)?
            .is_none()
        {
            return Err(ValidationError::UnknownReference {
                kind: "expense type",
                id: form.expense_type_id,
            }
            .into());
        }

        Ok((form.expense_type_id, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{date, sample_car, TestHelper};
    use crate::storage::csv::CsvConnection;
    use rust_decimal_macros::dec;

    fn setup() -> (TestHelper, ExpenseService<CsvConnection>, i64) {
        let helper = TestHelper::new().unwrap();
        let service = ExpenseService::new(&helper.env.connection, ValidationConfig::default());
        let car = helper.car_repo.store_car(&sample_car("A111AA77")).unwrap();
        (helper, service, car.id)
    }

    fn form(amount: &str) -> ExpenseForm {
        ExpenseForm {
            expense_type_id: 1,
            amount: amount.to_string(),
            date: date(2024, 3, 1),
        }
    }

    #[test]
    fn test_create_and_list_expenses() {
        let (_helper, service, car_id) = setup();
        service
            .create_expense(CreateExpenseCommand {
                car_id,
                form: form("1500"),
            })
            .unwrap();
        service
            .create_expense(CreateExpenseCommand {
                car_id,
                form: form("250.75"),
            })
            .unwrap();

        assert_eq!(service.total_for_car(car_id).unwrap(), dec!(1750.75));
        let rows = service.expense_table(car_id).unwrap();
        assert_eq!(rows[0].expense_type, "Fuel");
        assert_eq!(rows[0].amount, "1500.00");
        assert_eq!(rows[0].date, "2024-03-01");
        assert_eq!(rows[1].amount, "250.75");
    }

    #[test]
    fn test_invalid_amount_is_rejected() {
        let (_helper, service, car_id) = setup();
        let err = service
            .create_expense(CreateExpenseCommand {
                car_id,
                form: form("-1"),
            })
            .unwrap_err();
        assert_eq!(
            err.downcast::<ValidationError>().unwrap(),
            ValidationError::NegativeAmount
        );
        assert!(service.list_for_car(car_id).unwrap().is_empty());
    }

    #[test]
    fn test_update_and_delete_expense() {
        let (_helper, service, car_id) = setup();
        let expense = service
            .create_expense(CreateExpenseCommand {
                car_id,
                form: form("100"),
            })
            .unwrap();

        let mut edit = form("120.50");
        edit.expense_type_id = 2;
        let updated = service
            .update_expense(UpdateExpenseCommand {
                expense_id: expense.id,
                form: edit,
            })
            .unwrap();
        assert_eq!(updated.amount, dec!(120.50));
        assert_eq!(updated.expense_type_id, 2);

        service.delete_expense(expense.id).unwrap();
        assert!(service.list_for_car(car_id).unwrap().is_empty());
        assert!(service.delete_expense(expense.id).is_err());
    }
}
