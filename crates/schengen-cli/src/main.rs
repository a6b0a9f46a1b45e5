use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "schengen-cli", version, about = "Schengen 90/180 compliance tracker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Trip management
    Trip {
        #[command(subcommand)]
        action: commands::trip::TripAction,
    },
    /// Compliance queries (90 days in any 180-day window)
    Compliance {
        #[command(subcommand)]
        action: commands::compliance::ComplianceAction,
    },
    /// Sync queue control
    Queue {
        #[command(subcommand)]
        action: commands::queue::QueueAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Trip { action } => commands::trip::run(action),
        Commands::Compliance { action } => commands::compliance::run(action),
        Commands::Queue { action } => commands::queue::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
