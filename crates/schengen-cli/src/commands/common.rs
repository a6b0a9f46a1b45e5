//! Shared helpers for CLI commands.

use std::time::Duration;

use schengen_core::{Config, HttpTransport, SyncQueue};

/// Host used when no sync endpoint is configured. The queue stays offline
/// in that case, so this is never contacted.
const UNCONFIGURED_BASE_URL: &str = "http://sync.invalid/";

/// Open the process-wide sync queue from config, restoring persisted items.
pub fn open_queue(config: &Config) -> Result<SyncQueue<HttpTransport>, Box<dyn std::error::Error>> {
    let base_url = config
        .sync
        .base_url
        .as_deref()
        .unwrap_or(UNCONFIGURED_BASE_URL);
    let transport = HttpTransport::new(base_url, Duration::from_secs(config.sync.timeout_secs))?;
    let queue = SyncQueue::new(transport);
    queue.load()?;
    Ok(queue)
}

/// Build a current-thread runtime for commands that await queue operations.
pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn std::error::Error>> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
