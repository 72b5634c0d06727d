//! State update events
//!
//! Every posted update produces one `ItemUpdate`, whether or not the value
//! differs from the item's previous state.

use std::time::Instant;

/// A decimal state update posted for an item
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    /// The item that received the update
    pub item_name: String,

    /// The new decimal state
    pub value: i64,

    /// When the update was posted
    pub timestamp: Instant,
}

impl ItemUpdate {
    /// Create a new update stamped with the current time
    pub fn new(item_name: impl Into<String>, value: i64) -> Self {
        Self {
            item_name: item_name.into(),
            value,
            timestamp: Instant::now(),
        }
    }
}

impl PartialEq for ItemUpdate {
    fn eq(&self, other: &Self) -> bool {
        // Timestamps are excluded; two updates are equal if they carry the same state
        self.item_name == other.item_name && self.value == other.value
    }
}
