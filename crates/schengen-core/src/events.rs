//! Queue lifecycle events.
//!
//! Every queue state change produces a typed [`QueueEvent`] published on an
//! [`EventBus`]. Hosts subscribe for notifications (e.g. surfacing a
//! permanently failed item to the user) instead of registering ad hoc
//! callbacks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::sync::Priority;

/// Event emitted by the sync queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// An item was appended to the queue.
    ItemAdded {
        item_id: String,
        priority: Priority,
        at: DateTime<Utc>,
    },
    /// An item was delivered and removed from the queue.
    ItemSynced {
        item_id: String,
        attempts: u32,
        at: DateTime<Utc>,
    },
    /// A delivery attempt failed. When `permanent` is set the item has
    /// exhausted its attempts and is retained in the failed set; it is
    /// never silently dropped.
    ItemFailed {
        item_id: String,
        attempts: u32,
        permanent: bool,
        at: DateTime<Utc>,
    },
    /// A drain pass finished.
    QueueProcessed {
        delivered: usize,
        failed: usize,
        remaining: usize,
        at: DateTime<Utc>,
    },
}

const BUS_CAPACITY: usize = 256;

/// Broadcast fan-out for [`QueueEvent`]s. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Dropped silently when nobody is subscribed.
    pub fn emit(&self, event: QueueEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
