//! Compliance query commands.

use chrono::{NaiveDate, Utc};
use clap::Subcommand;

use schengen_core::{ComplianceCalculator, Config, TripDb};

#[derive(Subcommand)]
pub enum ComplianceAction {
    /// Days used and remaining as of a reference date
    Check {
        /// Reference date (default: today)
        #[arg(long)]
        on: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Day-by-day remaining-days series
    Timeline {
        /// First day of the series
        #[arg(long)]
        from: NaiveDate,
        /// Last day of the series
        #[arg(long)]
        to: NaiveDate,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Longest stay possible starting on a given entry date
    Project {
        /// Hypothetical entry date
        #[arg(long)]
        entry: NaiveDate,
    },
}

pub fn run(action: ComplianceAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = TripDb::open()?;
    let trips = db.list()?;
    let calc = ComplianceCalculator::new();

    match action {
        ComplianceAction::Check { on, json } => {
            let reference = on.unwrap_or_else(|| Utc::now().date_naive());
            let result = calc.evaluate(&trips, reference)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!(
                "Window {} .. {} ({} days, {} day budget)",
                result.window_start, result.reference_date, calc.window_days, calc.budget_days
            );
            for usage in &result.per_interval {
                println!(
                    "  {}  {}  {}/{} days in window",
                    usage.interval_id, usage.zone_code, usage.days_counted, usage.days_in_interval
                );
            }
            println!("Days used:      {}", result.total_days_in_window);
            if result.is_overstay() {
                println!("OVERSTAY:       {} days over budget", -result.days_remaining);
            } else {
                println!("Days remaining: {}", result.display_days_remaining());
            }

            let notifications = Config::load()?.notifications;
            if notifications.enabled
                && !result.is_overstay()
                && result.days_remaining <= notifications.warning_threshold_days
            {
                println!(
                    "warning: only {} days left of the {}-day budget",
                    result.days_remaining, calc.budget_days
                );
            }
        }
        ComplianceAction::Timeline { from, to, json } => {
            let series = calc.timeline(&trips, from, to)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                for point in series {
                    println!(
                        "{}  used {:>3}  remaining {:>3}",
                        point.date, point.total_days_in_window, point.days_remaining
                    );
                }
            }
        }
        ComplianceAction::Project { entry } => {
            let stay = calc.max_stay_from(&trips, entry)?;
            if stay == 0 {
                println!("No stay possible starting {entry}: budget exhausted.");
            } else {
                let last_day = entry + chrono::Duration::days(stay - 1);
                println!("Entering {entry} you can stay {stay} days (through {last_day}).");
            }
        }
    }
    Ok(())
}
