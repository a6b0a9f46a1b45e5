//! Durable outbound sync queue.
//!
//! Local mutations are queued as [`QueueItem`]s and replayed against the
//! remote API when connectivity allows. Delivery is sequential in
//! priority-then-FIFO order; failed items are retried up to a per-item
//! attempt limit and then retained, never silently dropped.

pub mod queue;
pub mod transport;
pub mod types;

#[cfg(test)]
mod queue_tests;

pub use queue::{DrainReport, SyncQueue};
pub use transport::{HttpTransport, Transport};
pub use types::{HttpMethod, PayloadKind, Priority, QueueItem, SyncError};
