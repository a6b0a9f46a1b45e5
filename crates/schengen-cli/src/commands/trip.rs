//! Trip management commands.
//!
//! Every mutation validates the whole interval set first (malformed
//! ranges and overlaps are rejected, not corrected), writes the trip
//! store, and speculatively enqueues a sync item for the remote API.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use schengen_core::trip::validate_intervals;
use schengen_core::{Config, HttpMethod, PayloadKind, QueueItem, TravelInterval, TripDb};

use super::common;

#[derive(Subcommand)]
pub enum TripAction {
    /// Add a trip (omit END for a trip still in progress)
    Add {
        /// Zone/country code (e.g. FR)
        zone: String,
        /// First day of presence (YYYY-MM-DD)
        start: NaiveDate,
        /// Last day of presence (YYYY-MM-DD)
        end: Option<NaiveDate>,
    },
    /// List trips
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get trip details
    Get {
        /// Trip ID
        id: String,
    },
    /// Update a trip
    Update {
        /// Trip ID
        id: String,
        /// New zone code
        #[arg(long)]
        zone: Option<String>,
        /// New start date
        #[arg(long)]
        start: Option<NaiveDate>,
        /// New end date (closes an in-progress trip)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Remove a trip
    Remove {
        /// Trip ID
        id: String,
    },
}

pub fn run(action: TripAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TripDb::open()?;

    match action {
        TripAction::Add { zone, start, end } => {
            let trip = match end {
                Some(end) => TravelInterval::new(zone, start, end),
                None => TravelInterval::open(zone, start),
            };
            trip.validate()?;

            let mut all = db.list()?;
            all.push(trip.clone());
            validate_intervals(&all, Utc::now().date_naive())?;

            db.insert(&trip)?;
            let item = QueueItem::new(PayloadKind::Trip, serde_json::to_value(&trip)?, HttpMethod::Post);
            enqueue(item)?;
            println!("Trip added: {}", trip.id);
        }
        TripAction::List { json } => {
            let trips = db.list()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&trips)?);
            } else if trips.is_empty() {
                println!("No trips recorded.");
            } else {
                for trip in trips {
                    let end = trip
                        .end_date
                        .map_or_else(|| "(in progress)".to_string(), |d| d.to_string());
                    println!("{}  {}  {} .. {}", trip.id, trip.zone_code, trip.start_date, end);
                }
            }
        }
        TripAction::Get { id } => match db.get(&id)? {
            Some(trip) => println!("{}", serde_json::to_string_pretty(&trip)?),
            None => {
                eprintln!("no trip with id {id}");
                std::process::exit(1);
            }
        },
        TripAction::Update { id, zone, start, end } => {
            let Some(mut trip) = db.get(&id)? else {
                eprintln!("no trip with id {id}");
                std::process::exit(1);
            };
            if let Some(zone) = zone {
                trip.zone_code = zone;
            }
            if let Some(start) = start {
                trip.start_date = start;
            }
            if let Some(end) = end {
                trip.end_date = Some(end);
            }
            trip.validate()?;

            let all: Vec<TravelInterval> = db
                .list()?
                .into_iter()
                .map(|t| if t.id == id { trip.clone() } else { t })
                .collect();
            validate_intervals(&all, Utc::now().date_naive())?;

            db.update(&trip)?;
            let item = QueueItem::with_endpoint(
                PayloadKind::Trip,
                serde_json::to_value(&trip)?,
                format!("/api/trips/{id}"),
                HttpMethod::Put,
            );
            enqueue(item)?;
            println!("Trip updated: {id}");
        }
        TripAction::Remove { id } => {
            db.delete(&id)?;
            let item = QueueItem::with_endpoint(
                PayloadKind::Trip,
                serde_json::json!({ "id": id }),
                format!("/api/trips/{id}"),
                HttpMethod::Delete,
            );
            enqueue(item)?;
            println!("Trip removed: {id}");
        }
    }
    Ok(())
}

/// Speculatively queue the mutation for the remote API. The queue starts
/// offline here, so this only records the item; `queue drain` delivers.
fn enqueue(item: QueueItem) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let queue = common::open_queue(&config)?;
    common::runtime()?.block_on(queue.enqueue(item))?;
    Ok(())
}
