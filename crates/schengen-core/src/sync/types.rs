//! Core types for the sync queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of local mutation carried by a queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadKind {
    Trip,
    Settings,
    NotificationSettings,
    Calculation,
}

impl PayloadKind {
    /// Default API path for this kind of payload.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            PayloadKind::Trip => "/api/trips",
            PayloadKind::Settings => "/api/settings",
            PayloadKind::NotificationSettings => "/api/settings/notifications",
            PayloadKind::Calculation => "/api/calculations",
        }
    }
}

/// HTTP method used for delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Delivery priority. Drain order is priority first, then enqueue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    /// Sort rank: lower drains first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Normal => 1,
            Priority::Low => 2,
        }
    }
}

/// Default attempt limit before an item is frozen as failed.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A pending outbound write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Unique identifier (UUID string).
    pub id: String,
    pub kind: PayloadKind,
    /// JSON body sent to the endpoint.
    pub payload: serde_json::Value,
    /// Target path, resolved against the configured base URL.
    pub endpoint: String,
    pub method: HttpMethod,
    pub priority: Priority,
    /// Delivery attempts made so far.
    pub attempt_count: u32,
    /// Attempts allowed before the item is frozen as failed.
    pub max_attempts: u32,
    pub created_at: DateTime<Utc>,
    /// Set once `attempt_count` reaches `max_attempts`. The item is kept
    /// so the user can inspect, export, or manually retry it.
    #[serde(default)]
    pub failed: bool,
}

impl QueueItem {
    /// Create a pending item targeting the kind's default endpoint.
    pub fn new(kind: PayloadKind, payload: serde_json::Value, method: HttpMethod) -> Self {
        Self::with_endpoint(kind, payload, kind.default_endpoint().to_string(), method)
    }

    /// Create a pending item with an explicit endpoint path.
    pub fn with_endpoint(
        kind: PayloadKind,
        payload: serde_json::Value,
        endpoint: String,
        method: HttpMethod,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            payload,
            endpoint,
            method,
            priority: Priority::Normal,
            attempt_count: 0,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            created_at: Utc::now(),
            failed: false,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Whether the item should still be offered to the transport.
    pub fn eligible(&self) -> bool {
        !self.failed && self.attempt_count < self.max_attempts
    }
}

/// Sync delivery error types.
///
/// Non-2xx responses and network failures are both retryable: the source
/// behavior never distinguished a permanently bad payload (4xx) from a
/// transient server error, so both count against the attempt limit.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Server returned HTTP {status} for {endpoint}")]
    Http { status: u16, endpoint: String },

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Sync endpoint not configured")]
    EndpointNotConfigured,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
