//! LiveData dispatch
//!
//! Turns one gateway response into item updates. Every failure here is local:
//! a bad document drops that response, a bad item drops that item, and the
//! caller always gets control back.

use std::sync::Arc;

use item_bus::EventPublisher;
use ted_client::{LiveData, TedError};

use crate::provider::BindingProvider;

/// Parse `response` from `device_id` and publish a value for every item bound
/// to that gateway.
///
/// Returns the number of updates published.
pub fn process_live_data(
    device_id: &str,
    response: &str,
    providers: &[Arc<dyn BindingProvider>],
    publisher: &dyn EventPublisher,
) -> usize {
    let doc = match LiveData::parse(response) {
        Ok(doc) => doc,
        Err(TedError::UnexpectedRoot(root)) => {
            tracing::debug!(device_id, root = %root, "ignoring document that is not LiveData");
            return 0;
        }
        Err(e) => {
            tracing::error!(device_id, "XML error {}", e);
            return 0;
        }
    };

    let mut published = 0;

    for provider in providers {
        for item_name in provider.item_names() {
            if provider.gateway_for_item(&item_name).as_deref() != Some(device_id) {
                continue;
            }

            let path = provider.element_path_for_item(&item_name);
            if publish_item(&doc, &item_name, &path, publisher) {
                published += 1;
            }
        }
    }

    published
}

/// Resolve and publish one item, returning whether an update was posted
fn publish_item(doc: &LiveData, item_name: &str, path: &[String], publisher: &dyn EventPublisher) -> bool {
    let value = match doc.integer(path) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            tracing::warn!(
                item = item_name,
                path = %path.join("."),
                "LiveData value is not an integer: {}",
                e
            );
            return false;
        }
        None => {
            tracing::debug!(item = item_name, path = %path.join("."), "element not found in LiveData");
            return false;
        }
    };

    match publisher.post_update(item_name, value) {
        Ok(()) => {
            tracing::trace!(item = item_name, value, "posted update");
            true
        }
        Err(e) => {
            tracing::warn!(item = item_name, "failed to post update: {}", e);
            false
        }
    }
}
