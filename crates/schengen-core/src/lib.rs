//! # Schengen Core Library
//!
//! Core business logic for the Schengen 90/180 travel-compliance tracker.
//! All operations are available through a standalone CLI binary; any GUI is
//! expected to be a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Compliance Engine**: pure, deterministic rolling-window accounting.
//!   Given a set of travel intervals and a reference date it computes days
//!   spent inside the zone within the trailing 180-day window and the days
//!   remaining of the 90-day budget. Recomputed in full on every query.
//! - **Sync Queue**: durable outbound queue that replays local mutations
//!   against a remote API when connectivity allows, with per-item retry
//!   accounting and priority-then-FIFO ordering.
//! - **Storage**: SQLite-based trip storage and TOML-based configuration.
//!
//! ## Key Components
//!
//! - [`ComplianceCalculator`]: the rolling-window engine
//! - [`SyncQueue`]: durable retry queue over a [`sync::Transport`]
//! - [`TripDb`]: travel-interval persistence
//! - [`Config`]: application configuration management

pub mod compliance;
pub mod error;
pub mod events;
pub mod storage;
pub mod sync;
pub mod trip;

pub use compliance::{ComplianceCalculator, ComplianceResult, ComplianceWindow, DayUsage, IntervalUsage};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{EventBus, QueueEvent};
pub use storage::{Config, TripDb};
pub use sync::{DrainReport, HttpMethod, HttpTransport, PayloadKind, Priority, QueueItem, SyncError, SyncQueue};
pub use trip::TravelInterval;
