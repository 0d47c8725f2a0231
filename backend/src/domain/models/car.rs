use serde::{Deserialize, Serialize};

/// A vehicle in the fleet.
///
/// Cars are never deleted; retiring one sets `is_archived`, which hides it from the
/// active fleet and lists it in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub make: String,
    pub model: String,
    /// Registration plate, unique across the fleet ignoring case
    pub plate: String,
    /// Current odometer reading in km
    pub mileage: u32,
    pub year: i32,
    pub photo: Option<Vec<u8>>,
    pub status_id: i64,
    pub driver_id: Option<i64>,
    pub is_archived: bool,
}

impl Car {
    /// "Make Model"
    pub fn title(&self) -> String {
        format!("{} {}", self.make, self.model)
    }

    /// "Make Model (PLATE)", the archive list label
    pub fn archive_label(&self) -> String {
        format!("{} {} ({})", self.make, self.model, self.plate)
    }

    /// Case-insensitive substring match on the plate or on "Make Model"
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        self.plate.to_lowercase().contains(&needle) || self.title().to_lowercase().contains(&needle)
    }
}
