use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A maintenance event on a car.
///
/// Dates and odometer may be unknown for imported history; undated records are kept
/// but take no part in mileage reconciliation or the service timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub id: i64,
    pub car_id: i64,
    pub date_service: Option<NaiveDate>,
    pub work_type_id: i64,
    /// Planned date of the next service
    pub next_date: Option<NaiveDate>,
    /// Odometer reading at service time
    pub odometer: Option<u32>,
    pub conclusion: Option<String>,
}
