use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Money spent on a car
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub car_id: i64,
    pub expense_type_id: i64,
    /// Non-negative, two decimal places at most
    pub amount: Decimal,
    pub date: NaiveDate,
}
