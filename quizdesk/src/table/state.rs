use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggle(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    /// Orient a natural-order comparison. Ties stay ties.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Ascending
    }
}

/// Sort state of one registered table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub active_column: Option<String>,
    pub direction: SortOrder,
}

impl TableState {
    pub fn new(default_column: Option<&str>) -> Self {
        Self {
            active_column: default_column.map(|c| c.to_string()),
            direction: SortOrder::Ascending,
        }
    }

    /// Apply a header click and return the direction to sort with
    pub fn on_header_click(&mut self, column: &str) -> SortOrder {
        if self.active_column.as_deref() == Some(column) {
            self.direction = self.direction.toggle();
        } else {
            self.active_column = Some(column.to_string());
            self.direction = SortOrder::Ascending;
        }
        self.direction
    }

    pub fn is_active(&self, column: &str) -> bool {
        self.active_column.as_deref() == Some(column)
    }
}
