//! Reference tables: car status, kind of maintenance work, kind of expense.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkType {
    pub id: i64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseType {
    pub id: i64,
    pub label: String,
}

/// All reference tables as stored in `reference_data.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub statuses: Vec<Status>,
    pub work_types: Vec<WorkType>,
    pub expense_types: Vec<ExpenseType>,
}

impl Default for ReferenceData {
    fn default() -> Self {
        fn labelled<T>(labels: &[&str], make: impl Fn(i64, String) -> T) -> Vec<T> {
            labels
                .iter()
                .enumerate()
                .map(|(index, label)| make(index as i64 + 1, label.to_string()))
                .collect()
        }

        Self {
            statuses: labelled(&["In service", "Under repair", "Out of service"], |id, label| {
                Status { id, label }
            }),
            work_types: labelled(
                &[
                    "Scheduled maintenance",
                    "Oil change",
                    "Tyre replacement",
                    "Brake repair",
                    "Diagnostics",
                ],
                |id, label| WorkType { id, label },
            ),
            expense_types: labelled(
                &["Fuel", "Repair", "Insurance", "Washing", "Parking"],
                |id, label| ExpenseType { id, label },
            ),
        }
    }
}
