//! Sync queue control commands.

use clap::Subcommand;

use schengen_core::{Config, SyncError};

use super::common;

#[derive(Subcommand)]
pub enum QueueAction {
    /// Show pending and failed items
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Deliver all eligible items to the configured endpoint
    Drain,
    /// Reset a permanently failed item for another round of attempts
    Retry {
        /// Queue item ID
        id: String,
    },
}

pub fn run(action: QueueAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let queue = common::open_queue(&config)?;

    match action {
        QueueAction::Status { json } => {
            let pending = queue.pending();
            let failed = queue.failed();
            if json {
                let status = serde_json::json!({
                    "pending": pending,
                    "failed": failed,
                });
                println!("{}", serde_json::to_string_pretty(&status)?);
                return Ok(());
            }
            println!("Pending: {}", pending.len());
            for item in &pending {
                println!(
                    "  {}  {:?} {} {}  attempts {}/{}",
                    item.id,
                    item.kind,
                    item.method.as_str(),
                    item.endpoint,
                    item.attempt_count,
                    item.max_attempts
                );
            }
            println!("Failed: {}", failed.len());
            for item in &failed {
                println!(
                    "  {}  {:?} {} {}  exhausted {} attempts",
                    item.id,
                    item.kind,
                    item.method.as_str(),
                    item.endpoint,
                    item.attempt_count
                );
            }
        }
        QueueAction::Drain => {
            if config.sync.base_url.is_none() {
                return Err(Box::new(SyncError::EndpointNotConfigured));
            }
            let report = common::runtime()?
                .block_on(async {
                    queue.set_online(true).await
                })?
                .unwrap_or_default();
            println!(
                "Drained: {} delivered, {} failed, {} still pending",
                report.delivered, report.failed, report.remaining
            );
        }
        QueueAction::Retry { id } => {
            if queue.retry(&id)? {
                println!("Item {id} requeued.");
            } else {
                eprintln!("no queue item with id {id}");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
