//! Durable retry queue over a delivery transport.
//!
//! The persisted item list is the only shared mutable state: every
//! mutation (enqueue, remove-on-success, increment-on-failure) happens
//! under one lock and is followed by a whole-list JSON snapshot to disk,
//! so an enqueue landing mid-drain is neither lost nor double-processed.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::events::{EventBus, QueueEvent};
use crate::storage::data_dir;

use super::transport::Transport;
use super::types::{QueueItem, SyncError};

const QUEUE_FILE: &str = "sync_queue.json";

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Items delivered and removed.
    pub delivered: usize,
    /// Delivery attempts that failed this pass.
    pub failed: usize,
    /// Eligible items still queued after the pass.
    pub remaining: usize,
}

/// Durable sync queue.
///
/// One logical queue per process: construct once at startup and pass by
/// reference to consumers. `drain()` never runs two overlapping passes; a
/// re-entrant call while one is in flight is a no-op.
pub struct SyncQueue<T: Transport> {
    items: Mutex<Vec<QueueItem>>,
    queue_file: PathBuf,
    transport: T,
    bus: EventBus,
    online: AtomicBool,
    draining: AtomicBool,
}

impl<T: Transport> SyncQueue<T> {
    /// Create a queue persisting to `sync_queue.json` in the data dir.
    /// Starts offline; the host flips connectivity via [`Self::set_online`].
    pub fn new(transport: T) -> Self {
        let queue_file = data_dir()
            .map(|dir| dir.join(QUEUE_FILE))
            .unwrap_or_else(|_| PathBuf::from(QUEUE_FILE));
        Self::new_with_path(transport, queue_file)
    }

    /// Create a queue with a specific queue file (for testing).
    pub fn new_with_path(transport: T, queue_file: PathBuf) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            queue_file,
            transport,
            bus: EventBus::new(),
            online: AtomicBool::new(false),
            draining: AtomicBool::new(false),
        }
    }

    /// Event bus carrying queue lifecycle events.
    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Restore queued items from disk. Missing file is an empty queue.
    pub fn load(&self) -> Result<(), SyncError> {
        if !self.queue_file.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.queue_file)?;
        let loaded: Vec<QueueItem> = serde_json::from_str(&content)?;
        *self.items.lock().expect("queue lock poisoned") = loaded;
        Ok(())
    }

    fn persist(&self, items: &[QueueItem]) -> Result<(), SyncError> {
        let data = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.queue_file, data)?;
        Ok(())
    }

    /// Append an item, persist, and, when online, immediately attempt a
    /// drain. Offline the item simply stays queued.
    pub async fn enqueue(&self, item: QueueItem) -> Result<(), SyncError> {
        debug!(item_id = %item.id, kind = ?item.kind, "enqueue");
        let added = QueueEvent::ItemAdded {
            item_id: item.id.clone(),
            priority: item.priority,
            at: Utc::now(),
        };
        {
            let mut items = self.items.lock().expect("queue lock poisoned");
            items.push(item);
            self.persist(&items)?;
        }
        self.bus.emit(added);

        if self.is_online() {
            self.drain().await?;
        }
        Ok(())
    }

    /// Flip connectivity. Restoring connectivity triggers a drain (whose
    /// report is returned); losing it only stops new attempts -- an
    /// in-flight delivery fails on its own timeout and is requeued like
    /// any other failure.
    pub async fn set_online(&self, online: bool) -> Result<Option<DrainReport>, SyncError> {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        if online && !was_online {
            return Ok(Some(self.drain().await?));
        }
        Ok(None)
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Process all eligible items sequentially in priority-then-FIFO
    /// order. No-op while offline or while another pass is in flight.
    pub async fn drain(&self) -> Result<DrainReport, SyncError> {
        if !self.is_online() {
            return Ok(DrainReport::default());
        }
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(DrainReport::default());
        }
        let result = self.drain_pass().await;
        self.draining.store(false, Ordering::SeqCst);
        result
    }

    async fn drain_pass(&self) -> Result<DrainReport, SyncError> {
        let pass_order: Vec<String> = {
            let mut eligible: Vec<(u8, chrono::DateTime<Utc>, String)> = self
                .items
                .lock()
                .expect("queue lock poisoned")
                .iter()
                .filter(|item| item.eligible())
                .map(|item| (item.priority.rank(), item.created_at, item.id.clone()))
                .collect();
            eligible.sort();
            eligible.into_iter().map(|(_, _, id)| id).collect()
        };

        let mut report = DrainReport::default();
        for id in pass_order {
            // Connectivity lost mid-pass: no new attempts; the in-flight
            // delivery has already completed or failed on its own.
            if !self.is_online() {
                break;
            }
            let item = {
                let items = self.items.lock().expect("queue lock poisoned");
                items.iter().find(|i| i.id == id && i.eligible()).cloned()
            };
            let Some(item) = item else { continue };

            match self.transport.deliver(&item).await {
                Ok(()) => {
                    {
                        let mut items = self.items.lock().expect("queue lock poisoned");
                        items.retain(|i| i.id != id);
                        self.persist(&items)?;
                    }
                    report.delivered += 1;
                    self.bus.emit(QueueEvent::ItemSynced {
                        item_id: id,
                        attempts: item.attempt_count + 1,
                        at: Utc::now(),
                    });
                }
                Err(e) => {
                    warn!(item_id = %id, error = %e, "delivery attempt failed");
                    let (attempts, permanent) = {
                        let mut items = self.items.lock().expect("queue lock poisoned");
                        let mut out = (item.attempt_count + 1, false);
                        if let Some(queued) = items.iter_mut().find(|i| i.id == id) {
                            queued.attempt_count += 1;
                            if queued.attempt_count >= queued.max_attempts {
                                queued.failed = true;
                            }
                            out = (queued.attempt_count, queued.failed);
                        }
                        self.persist(&items)?;
                        out
                    };
                    report.failed += 1;
                    self.bus.emit(QueueEvent::ItemFailed {
                        item_id: id,
                        attempts,
                        permanent,
                        at: Utc::now(),
                    });
                }
            }
        }

        report.remaining = self.pending().len();
        info!(
            delivered = report.delivered,
            failed = report.failed,
            remaining = report.remaining,
            "drain pass finished"
        );
        self.bus.emit(QueueEvent::QueueProcessed {
            delivered: report.delivered,
            failed: report.failed,
            remaining: report.remaining,
            at: Utc::now(),
        });
        Ok(report)
    }

    /// Items still awaiting delivery.
    pub fn pending(&self) -> Vec<QueueItem> {
        self.items
            .lock()
            .expect("queue lock poisoned")
            .iter()
            .filter(|item| item.eligible())
            .cloned()
            .collect()
    }

    /// Items frozen after exhausting their attempts.
    pub fn failed(&self) -> Vec<QueueItem> {
        self.items
            .lock()
            .expect("queue lock poisoned")
            .iter()
            .filter(|item| item.failed)
            .cloned()
            .collect()
    }

    /// Reset a failed item for another round of attempts. Returns false
    /// when no item with that id is queued.
    pub fn retry(&self, item_id: &str) -> Result<bool, SyncError> {
        let mut items = self.items.lock().expect("queue lock poisoned");
        let Some(item) = items.iter_mut().find(|i| i.id == item_id) else {
            return Ok(false);
        };
        item.attempt_count = 0;
        item.failed = false;
        self.persist(&items)?;
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.items.lock().expect("queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().expect("queue lock poisoned").is_empty()
    }
}
