//! Blocking iteration over posted item updates
//!
//! Provides the same consumption patterns for every bus subscriber:
//! - Blocking: `recv()`, `for update in iter`
//! - Non-blocking: `try_recv()`, `try_iter()`
//! - Timeout: `recv_timeout()`

use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use crate::event::ItemUpdate;

/// Blocking iterator over item updates
///
/// All clones of a bus share one receiver, so each update is delivered to
/// exactly one consumer.
///
/// # Example
///
/// ```rust,ignore
/// for update in bus.iter() {
///     println!("{} -> {}", update.item_name, update.value);
/// }
/// ```
pub struct UpdateIterator {
    rx: Arc<Mutex<mpsc::Receiver<ItemUpdate>>>,
}

impl UpdateIterator {
    pub(crate) fn new(rx: Arc<Mutex<mpsc::Receiver<ItemUpdate>>>) -> Self {
        Self { rx }
    }

    /// Block until the next update is available
    ///
    /// Returns `None` if the channel is closed.
    pub fn recv(&self) -> Option<ItemUpdate> {
        self.rx.lock().ok()?.recv().ok()
    }

    /// Block until the next update or timeout expires
    pub fn recv_timeout(&self, timeout: Duration) -> Option<ItemUpdate> {
        self.rx.lock().ok()?.recv_timeout(timeout).ok()
    }

    /// Try to receive an update without blocking
    pub fn try_recv(&self) -> Option<ItemUpdate> {
        self.rx.lock().ok()?.try_recv().ok()
    }

    /// Non-blocking iterator over the updates currently queued
    pub fn try_iter(&self) -> TryIter<'_> {
        TryIter { inner: self }
    }
}

impl Iterator for UpdateIterator {
    type Item = ItemUpdate;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

/// Non-blocking iterator over currently queued updates
pub struct TryIter<'a> {
    inner: &'a UpdateIterator,
}

impl Iterator for TryIter<'_> {
    type Item = ItemUpdate;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}
