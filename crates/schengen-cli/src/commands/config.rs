//! Configuration commands.
//!
//! Settings changes are mutations like any other: a successful `set` also
//! enqueues a settings payload for the remote API.

use clap::Subcommand;

use schengen_core::{Config, HttpMethod, PayloadKind, QueueItem};

use super::common;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value (e.g. "sync.base_url")
    Get {
        /// Dot-separated config key
        key: String,
    },
    /// Set a config value
    Set {
        /// Dot-separated config key
        key: String,
        /// New value
        value: String,
    },
    /// List all config values
    List,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            enqueue_settings(&config, &key)?;
            println!("ok");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}

fn enqueue_settings(config: &Config, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let kind = if key.starts_with("notifications.") {
        PayloadKind::NotificationSettings
    } else {
        PayloadKind::Settings
    };
    let item = QueueItem::new(kind, serde_json::to_value(config)?, HttpMethod::Put);
    let queue = common::open_queue(config)?;
    common::runtime()?.block_on(queue.enqueue(item))?;
    Ok(())
}
