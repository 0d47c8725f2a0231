//! Browsing position in the active fleet.
//!
//! The main view shows one car at a time and steps through the active list with
//! previous/next, wrapping at both ends.

/// Index into the ordered list of active car ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetCursor {
    car_ids: Vec<i64>,
    index: usize,
}

impl FleetCursor {
    pub fn new(car_ids: Vec<i64>) -> Self {
        Self { car_ids, index: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.car_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.car_ids.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Id of the car on screen, `None` for an empty fleet
    pub fn current(&self) -> Option<i64> {
        self.car_ids.get(self.index).copied()
    }

    pub fn next(&mut self) -> Option<i64> {
        if self.car_ids.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.car_ids.len();
        self.current()
    }

    pub fn previous(&mut self) -> Option<i64> {
        if self.car_ids.is_empty() {
            return None;
        }
        self.index = (self.index + self.car_ids.len() - 1) % self.car_ids.len();
        self.current()
    }

    /// Jump to a position, e.g. a search hit; out-of-range positions are ignored
    pub fn select_index(&mut self, index: usize) -> Option<i64> {
        if index < self.car_ids.len() {
            self.index = index;
        }
        self.current()
    }

    /// Jump to a car after editing it; falls back to the first car when it is no
    /// longer in the list
    pub fn select_car(&mut self, car_id: i64) -> Option<i64> {
        self.index = self
            .car_ids
            .iter()
            .position(|id| *id == car_id)
            .unwrap_or(0);
        self.current()
    }

    /// Jump to the newest car, used after adding one
    pub fn select_last(&mut self) -> Option<i64> {
        self.index = self.car_ids.len().saturating_sub(1);
        self.current()
    }

    /// Replace the list after the fleet changed, staying on the same car when it is
    /// still active and otherwise clamping to the list
    pub fn reload(&mut self, car_ids: Vec<i64>) -> Option<i64> {
        let current = self.current();
        self.car_ids = car_ids;
        self.index = match current.and_then(|id| self.car_ids.iter().position(|c| *c == id)) {
            Some(position) => position,
            None => self.index.min(self.car_ids.len().saturating_sub(1)),
        };
        self.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps() {
        let mut cursor = FleetCursor::new(vec![10, 20, 30]);
        assert_eq!(cursor.current(), Some(10));
        assert_eq!(cursor.previous(), Some(30));
        assert_eq!(cursor.next(), Some(10));
        assert_eq!(cursor.next(), Some(20));
        assert_eq!(cursor.select_last(), Some(30));
        assert_eq!(cursor.next(), Some(10));
        assert_eq!(cursor.select_car(20), Some(20));
        assert_eq!(cursor.select_car(99), Some(10));
    }

    #[test]
    fn test_empty_fleet() {
        let mut cursor = FleetCursor::default();
        assert!(cursor.is_empty());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.previous(), None);
        assert_eq!(cursor.select_last(), None);
    }

    #[test]
    fn test_reload_keeps_or_clamps_position() {
        let mut cursor = FleetCursor::new(vec![10, 20, 30]);
        cursor.select_index(2);

        assert_eq!(cursor.reload(vec![5, 10, 20, 30]), Some(30));
        assert_eq!(cursor.index(), 3);

        // the current car was archived
        assert_eq!(cursor.reload(vec![5, 10]), Some(10));
        assert_eq!(cursor.reload(vec![]), None);
    }
}
