use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use tempfile::TempDir;
use tokio::sync::{Notify, Semaphore};

use crate::events::QueueEvent;
use crate::sync::queue::{DrainReport, SyncQueue};
use crate::sync::transport::Transport;
use crate::sync::types::{HttpMethod, PayloadKind, Priority, QueueItem, SyncError};

/// Scripted transport recording delivery order.
#[derive(Clone, Default)]
struct MockTransport {
    fail_all: Arc<AtomicBool>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
    fn delivered(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    async fn deliver(&self, item: &QueueItem) -> Result<(), SyncError> {
        self.log.lock().unwrap().push(item.id.clone());
        if self.fail_all.load(Ordering::SeqCst) {
            Err(SyncError::Http {
                status: 503,
                endpoint: item.endpoint.clone(),
            })
        } else {
            Ok(())
        }
    }
}

/// Transport that parks every delivery until the test releases a permit,
/// so a drain pass can be held open mid-flight.
#[derive(Clone)]
struct GatedTransport {
    entered: Arc<Notify>,
    gate: Arc<Semaphore>,
    log: Arc<Mutex<Vec<String>>>,
}

impl GatedTransport {
    fn new() -> Self {
        Self {
            entered: Arc::new(Notify::new()),
            gate: Arc::new(Semaphore::new(0)),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn attempts(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Transport for GatedTransport {
    async fn deliver(&self, item: &QueueItem) -> Result<(), SyncError> {
        self.log.lock().unwrap().push(item.id.clone());
        self.entered.notify_one();
        self.gate.acquire().await.unwrap().forget();
        Ok(())
    }
}

fn trip_item(id: &str) -> QueueItem {
    let mut item = QueueItem::new(
        PayloadKind::Trip,
        serde_json::json!({"zone_code": "FR"}),
        HttpMethod::Post,
    );
    item.id = id.to_string();
    item
}

fn queue_in(dir: &TempDir, transport: MockTransport) -> SyncQueue<MockTransport> {
    SyncQueue::new_with_path(transport, dir.path().join("queue.json"))
}

#[tokio::test]
async fn test_offline_enqueue_defers_delivery() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default();
    let queue = queue_in(&dir, transport.clone());

    queue.enqueue(trip_item("a")).await.unwrap();

    assert!(transport.delivered().is_empty());
    assert_eq!(queue.pending().len(), 1);
}

#[tokio::test]
async fn test_online_enqueue_delivers_immediately() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default();
    let queue = queue_in(&dir, transport.clone());

    queue.set_online(true).await.unwrap();
    queue.enqueue(trip_item("a")).await.unwrap();

    assert_eq!(transport.delivered(), vec!["a".to_string()]);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_durability_across_restart() {
    let dir = TempDir::new().unwrap();
    let queue = queue_in(&dir, MockTransport::default());
    queue.enqueue(trip_item("survives")).await.unwrap();

    // Simulated process restart: a fresh queue over the same file.
    let reloaded = queue_in(&dir, MockTransport::default());
    reloaded.load().unwrap();
    let pending = reloaded.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "survives");
}

#[tokio::test]
async fn test_successful_drain_persists_removal() {
    let dir = TempDir::new().unwrap();
    let queue = queue_in(&dir, MockTransport::default());
    queue.enqueue(trip_item("a")).await.unwrap();
    queue.set_online(true).await.unwrap();

    let reloaded = queue_in(&dir, MockTransport::default());
    reloaded.load().unwrap();
    assert!(reloaded.is_empty());
}

#[tokio::test]
async fn test_priority_then_fifo_ordering() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default();
    let queue = queue_in(&dir, transport.clone());

    let base = Utc::now();
    let mut low = trip_item("low").with_priority(Priority::Low);
    low.created_at = base;
    let mut normal_old = trip_item("normal-old").with_priority(Priority::Normal);
    normal_old.created_at = base + Duration::seconds(1);
    let mut normal_new = trip_item("normal-new").with_priority(Priority::Normal);
    normal_new.created_at = base + Duration::seconds(2);
    let mut high = trip_item("high").with_priority(Priority::High);
    high.created_at = base + Duration::seconds(3);

    // Enqueued in arbitrary order while offline.
    for item in [low, normal_new, high, normal_old] {
        queue.enqueue(item).await.unwrap();
    }
    queue.set_online(true).await.unwrap();

    assert_eq!(
        transport.delivered(),
        vec![
            "high".to_string(),
            "normal-old".to_string(),
            "normal-new".to_string(),
            "low".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_retry_exhaustion_freezes_item() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default();
    transport.fail_all.store(true, Ordering::SeqCst);
    let queue = queue_in(&dir, transport.clone());
    let mut rx = queue.events().subscribe();

    queue
        .enqueue(trip_item("doomed").with_max_attempts(2))
        .await
        .unwrap();
    queue.set_online(true).await.unwrap(); // attempt 1
    let report = queue.drain().await.unwrap(); // attempt 2 -> frozen
    assert_eq!(report.failed, 1);
    assert_eq!(report.remaining, 0);

    assert!(queue.pending().is_empty());
    let failed = queue.failed();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].attempt_count, 2);

    // A further drain must not touch the frozen item.
    queue.drain().await.unwrap();
    assert_eq!(transport.delivered().len(), 2);

    // The exhausting attempt emitted a permanent failure event.
    let mut saw_permanent = false;
    while let Ok(event) = rx.try_recv() {
        if let QueueEvent::ItemFailed { permanent: true, attempts, .. } = event {
            saw_permanent = true;
            assert_eq!(attempts, 2);
        }
    }
    assert!(saw_permanent);
}

#[tokio::test]
async fn test_failed_attempt_keeps_item_queued() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default();
    transport.fail_all.store(true, Ordering::SeqCst);
    let queue = queue_in(&dir, transport.clone());

    queue.enqueue(trip_item("retry-me")).await.unwrap();
    queue.set_online(true).await.unwrap();

    let pending = queue.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempt_count, 1);
}

#[tokio::test]
async fn test_manual_retry_resets_frozen_item() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default();
    transport.fail_all.store(true, Ordering::SeqCst);
    let queue = queue_in(&dir, transport.clone());

    queue
        .enqueue(trip_item("second-chance").with_max_attempts(1))
        .await
        .unwrap();
    queue.set_online(true).await.unwrap();
    assert_eq!(queue.failed().len(), 1);

    assert!(queue.retry("second-chance").unwrap());
    assert_eq!(queue.failed().len(), 0);
    assert_eq!(queue.pending().len(), 1);

    transport.fail_all.store(false, Ordering::SeqCst);
    let report = queue.drain().await.unwrap();
    assert_eq!(report.delivered, 1);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_retry_unknown_id_returns_false() {
    let dir = TempDir::new().unwrap();
    let queue = queue_in(&dir, MockTransport::default());
    assert!(!queue.retry("nope").unwrap());
}

#[tokio::test]
async fn test_drain_while_offline_is_noop() {
    let dir = TempDir::new().unwrap();
    let transport = MockTransport::default();
    let queue = queue_in(&dir, transport.clone());
    queue.enqueue(trip_item("a")).await.unwrap();

    let report = queue.drain().await.unwrap();
    assert_eq!(report, DrainReport::default());
    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_offline_mid_drain_stops_further_attempts() {
    let dir = TempDir::new().unwrap();
    let transport = GatedTransport::new();
    let queue = Arc::new(SyncQueue::new_with_path(
        transport.clone(),
        dir.path().join("queue.json"),
    ));

    let base = Utc::now();
    let mut first = trip_item("first");
    first.created_at = base;
    let mut second = trip_item("second");
    second.created_at = base + Duration::seconds(1);
    queue.enqueue(first).await.unwrap();
    queue.enqueue(second).await.unwrap();

    let drain = tokio::spawn({
        let queue = Arc::clone(&queue);
        async move { queue.set_online(true).await.unwrap() }
    });
    transport.entered.notified().await;

    // Connectivity drops while the first delivery is in flight; it
    // completes naturally but the second must not be attempted.
    queue.set_online(false).await.unwrap();
    transport.gate.add_permits(1);
    let report = drain.await.unwrap().unwrap();

    assert_eq!(transport.attempts(), vec!["first".to_string()]);
    assert_eq!(report.delivered, 1);
    let pending = queue.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "second");
    assert_eq!(pending[0].attempt_count, 0);
}

#[tokio::test]
async fn test_enqueue_mid_drain_is_kept_for_next_pass() {
    let dir = TempDir::new().unwrap();
    let transport = GatedTransport::new();
    let queue = Arc::new(SyncQueue::new_with_path(
        transport.clone(),
        dir.path().join("queue.json"),
    ));
    queue.enqueue(trip_item("early")).await.unwrap();

    let drain = tokio::spawn({
        let queue = Arc::clone(&queue);
        async move { queue.set_online(true).await.unwrap() }
    });
    transport.entered.notified().await;

    // Lands while the pass is in flight; the re-entrant drain inside
    // enqueue is a no-op, so it waits for the next pass.
    queue.enqueue(trip_item("late")).await.unwrap();

    transport.gate.add_permits(1);
    let report = drain.await.unwrap().unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(transport.attempts(), vec!["early".to_string()]);

    // The mid-pass item is already on disk.
    let reloaded = queue_in(&dir, MockTransport::default());
    reloaded.load().unwrap();
    let pending = reloaded.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, "late");

    // The next pass delivers it exactly once.
    transport.gate.add_permits(1);
    let report = queue.drain().await.unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(
        transport.attempts(),
        vec!["early".to_string(), "late".to_string()]
    );
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_concurrent_drain_is_noop() {
    let dir = TempDir::new().unwrap();
    let transport = GatedTransport::new();
    let queue = Arc::new(SyncQueue::new_with_path(
        transport.clone(),
        dir.path().join("queue.json"),
    ));

    let base = Utc::now();
    let mut a = trip_item("a");
    a.created_at = base;
    let mut b = trip_item("b");
    b.created_at = base + Duration::seconds(1);
    queue.enqueue(a).await.unwrap();
    queue.enqueue(b).await.unwrap();

    let drain = tokio::spawn({
        let queue = Arc::clone(&queue);
        async move { queue.set_online(true).await.unwrap() }
    });
    transport.entered.notified().await;

    // A second drain while one is in flight must not attempt anything.
    let report = queue.drain().await.unwrap();
    assert_eq!(report, DrainReport::default());
    assert_eq!(transport.attempts(), vec!["a".to_string()]);

    transport.gate.add_permits(2);
    let report = drain.await.unwrap().unwrap();
    assert_eq!(report.delivered, 2);
    assert_eq!(transport.attempts(), vec!["a".to_string(), "b".to_string()]);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_queue_events_for_lifecycle() {
    let dir = TempDir::new().unwrap();
    let queue = queue_in(&dir, MockTransport::default());

    queue.set_online(true).await.unwrap();
    let mut rx = queue.events().subscribe();
    queue.enqueue(trip_item("a")).await.unwrap();

    let mut kinds = Vec::new();
    while let Ok(event) = rx.try_recv() {
        kinds.push(match event {
            QueueEvent::ItemAdded { .. } => "added",
            QueueEvent::ItemSynced { .. } => "synced",
            QueueEvent::ItemFailed { .. } => "failed",
            QueueEvent::QueueProcessed { .. } => "processed",
        });
    }
    assert_eq!(kinds, vec!["added", "synced", "processed"]);
}
