use anyhow::{bail, Result};
use chrono::NaiveDate;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::connection::{next_id, CsvConnection};
use crate::domain::models::expense::Expense;
use crate::storage::traits::ExpenseStorage;

const EXPENSES_FILE: &str = "expenses.csv";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExpenseRow {
    id: i64,
    car_id: i64,
    expense_type_id: i64,
    amount: Decimal,
    date: NaiveDate,
}

impl From<ExpenseRow> for Expense {
    fn from(row: ExpenseRow) -> Self {
        Expense {
            id: row.id,
            car_id: row.car_id,
            expense_type_id: row.expense_type_id,
            amount: row.amount,
            date: row.date,
        }
    }
}

impl From<&Expense> for ExpenseRow {
    fn from(expense: &Expense) -> Self {
        ExpenseRow {
            id: expense.id,
            car_id: expense.car_id,
            expense_type_id: expense.expense_type_id,
            amount: expense.amount,
            date: expense.date,
        }
    }
}

#[derive(Clone)]
pub struct ExpenseRepository {
    connection: CsvConnection,
}

impl ExpenseRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_rows(&self) -> Result<Vec<ExpenseRow>> {
        self.connection.read_table(EXPENSES_FILE)
    }
}

impl ExpenseStorage for ExpenseRepository {
    fn store_expense(&self, expense: &Expense) -> Result<Expense> {
        let mut rows = self.read_rows()?;
        let mut stored = expense.clone();
        stored.id = next_id(rows.iter().map(|row| row.id));

        rows.push(ExpenseRow::from(&stored));
        self.connection.write_table(EXPENSES_FILE, &rows)?;

        info!("Stored expense {} for car {}: {}", stored.id, stored.car_id, stored.amount);
        Ok(stored)
    }

    fn get_expense(&self, expense_id: i64) -> Result<Option<Expense>> {
        Ok(self
            .read_rows()?
            .into_iter()
            .find(|row| row.id == expense_id)
            .map(Expense::from))
    }

    fn list_expenses(&self, car_id: i64) -> Result<Vec<Expense>> {
        Ok(self
            .read_rows()?
            .into_iter()
            .filter(|row| row.car_id == car_id)
            .map(Expense::from)
            .collect())
    }

    fn update_expense(&self, expense: &Expense) -> Result<()> {
        let mut rows = self.read_rows()?;
        match rows.iter_mut().find(|row| row.id == expense.id) {
            Some(row) => *row = ExpenseRow::from(expense),
            None => bail!("Expense {} not found for update", expense.id),
        }
        self.connection.write_table(EXPENSES_FILE, &rows)
    }

    fn delete_expense(&self, expense_id: i64) -> Result<bool> {
        let mut rows = self.read_rows()?;
        let before = rows.len();
        rows.retain(|row| row.id != expense_id);
        if rows.len() == before {
            return Ok(false);
        }
        self.connection.write_table(EXPENSES_FILE, &rows)?;
        info!("Deleted expense {}", expense_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{date, TestHelper};
    use rust_decimal_macros::dec;

    fn expense(car_id: i64, amount: Decimal) -> Expense {
        Expense {
            id: 0,
            car_id,
            expense_type_id: 1,
            amount,
            date: date(2024, 3, 1),
        }
    }

    #[test]
    fn test_amount_keeps_exact_value() {
        let helper = TestHelper::new().unwrap();
        let stored = helper.expense_repo.store_expense(&expense(1, dec!(1234.56))).unwrap();

        let loaded = helper.expense_repo.get_expense(stored.id).unwrap().unwrap();
        assert_eq!(loaded.amount, dec!(1234.56));
    }

    #[test]
    fn test_list_expenses_filters_by_car() {
        let helper = TestHelper::new().unwrap();
        helper.expense_repo.store_expense(&expense(1, dec!(10))).unwrap();
        helper.expense_repo.store_expense(&expense(2, dec!(20))).unwrap();
        helper.expense_repo.store_expense(&expense(1, dec!(30))).unwrap();

        let amounts: Vec<Decimal> = helper
            .expense_repo
            .list_expenses(1)
            .unwrap()
            .iter()
            .map(|e| e.amount)
            .collect();
        assert_eq!(amounts, vec![dec!(10), dec!(30)]);
    }
}
