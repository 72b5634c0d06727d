//! Event publishing and the in-process item bus
//!
//! - `EventPublisher`: the seam a binding posts state updates through
//! - `ItemBus`: an in-process publisher that keeps the last state of each
//!   item and queues every update for blocking consumers

use std::collections::HashMap;
use std::sync::{mpsc, Arc, Mutex, RwLock};

use crate::error::PublishError;
use crate::event::ItemUpdate;
use crate::iter::UpdateIterator;

/// Destination for item state updates
///
/// Implemented by whatever host the binding runs inside.
pub trait EventPublisher: Send + Sync {
    /// Post a decimal state update for an item
    fn post_update(&self, item_name: &str, value: i64) -> Result<(), PublishError>;
}

/// In-process item bus
///
/// Cloning is cheap and all clones share the same states and update queue.
///
/// The bus owns the receiving end of its queue, so the queue never closes:
/// `post_update` on an `ItemBus` always succeeds and never returns
/// [`PublishError::Closed`]. The queue is unbounded; updates accumulate until
/// a consumer drains them through [`ItemBus::iter`]. Hosts that only read
/// [`ItemBus::state`] should call [`ItemBus::clear_queue`] periodically.
///
/// # Example
///
/// ```rust
/// use item_bus::{EventPublisher, ItemBus};
///
/// let bus = ItemBus::new();
/// bus.post_update("Power_Total", 1500).unwrap();
///
/// assert_eq!(bus.state("Power_Total"), Some(1500));
/// assert_eq!(bus.iter().try_recv().map(|u| u.value), Some(1500));
/// ```
#[derive(Clone)]
pub struct ItemBus {
    /// Last posted state per item
    states: Arc<RwLock<HashMap<String, i64>>>,

    /// Channel sender for updates
    update_tx: mpsc::Sender<ItemUpdate>,

    /// Channel receiver for updates (wrapped for cloning)
    update_rx: Arc<Mutex<mpsc::Receiver<ItemUpdate>>>,
}

impl ItemBus {
    /// Create an empty bus
    pub fn new() -> Self {
        let (update_tx, update_rx) = mpsc::channel();

        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
            update_tx,
            update_rx: Arc::new(Mutex::new(update_rx)),
        }
    }

    /// Last state posted for an item
    pub fn state(&self, item_name: &str) -> Option<i64> {
        self.states.read().ok()?.get(item_name).copied()
    }

    /// Names of all items that have received at least one update
    pub fn item_names(&self) -> Vec<String> {
        self.states
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of items that have received at least one update
    pub fn item_count(&self) -> usize {
        self.states.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Blocking iterator over posted updates
    pub fn iter(&self) -> UpdateIterator {
        UpdateIterator::new(Arc::clone(&self.update_rx))
    }

    /// Drop every queued update, keeping the recorded states
    ///
    /// Returns the number of updates dropped.
    pub fn clear_queue(&self) -> usize {
        self.iter().try_iter().count()
    }
}

impl EventPublisher for ItemBus {
    fn post_update(&self, item_name: &str, value: i64) -> Result<(), PublishError> {
        if let Ok(mut states) = self.states.write() {
            states.insert(item_name.to_string(), value);
        }

        self.update_tx
            .send(ItemUpdate::new(item_name, value))
            .map_err(|_| PublishError::Closed(item_name.to_string()))
    }
}

impl Default for ItemBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ItemBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemBus")
            .field("item_count", &self.item_count())
            .finish()
    }
}
