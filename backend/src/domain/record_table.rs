//! Table formatting for maintenance and expense records.
//!
//! Turns stored records into the display rows the presentation layer and the
//! expense ledger report show: ISO dates, amounts with two decimals, blanks for
//! unknown values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::{ExpenseTableRow, ServiceTableRow};

use super::models::expense::Expense;
use super::models::service_record::ServiceRecord;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats records for table display
#[derive(Debug, Clone, Default)]
pub struct RecordTableFormatter;

impl RecordTableFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format_date(&self, date: Option<NaiveDate>) -> String {
        date.map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// "1500.00"
    pub fn format_amount(&self, amount: Decimal) -> String {
        let mut rounded = amount.round_dp(2);
        rounded.rescale(2);
        rounded.to_string()
    }

    pub fn service_row(&self, record: &ServiceRecord, work_type: Option<&str>) -> ServiceTableRow {
        ServiceTableRow {
            service_id: record.id,
            date_service: self.format_date(record.date_service),
            work_type: work_type.unwrap_or_default().to_string(),
            next_date: self.format_date(record.next_date),
            odometer: record.odometer.map(|o| o.to_string()).unwrap_or_default(),
            conclusion: record.conclusion.clone().unwrap_or_default(),
        }
    }

    pub fn expense_row(&self, expense: &Expense, expense_type: Option<&str>) -> ExpenseTableRow {
        ExpenseTableRow {
            expense_id: expense.id,
            expense_type: expense_type.unwrap_or_default().to_string(),
            amount: self.format_amount(expense.amount),
            date: self.format_date(Some(expense.date)),
        }
    }
}
