use serde::{Deserialize, Serialize};

/// Postal address of a driver. Every component is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub region: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house: Option<u32>,
    pub postal_index: Option<u32>,
}

impl Address {
    /// Single-line form used in driver details, skipping blank parts
    pub fn display_line(&self) -> String {
        let house = self.house.map(|h| h.to_string());
        let index = self.postal_index.map(|i| i.to_string());
        [
            index.as_deref(),
            self.region.as_deref(),
            self.city.as_deref(),
            self.street.as_deref(),
            house.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }
}
