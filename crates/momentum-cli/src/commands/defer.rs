use clap::Args;
use momentum_core::calendar::to_booked_intervals;
use momentum_core::{Config, Database, ReschedulePlanner};

use super::resolve_now;

#[derive(Args)]
pub struct DeferArgs {
    /// Task ID
    id: String,
    /// Plan as if it were this instant (RFC 3339)
    #[arg(long)]
    at: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: DeferArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = resolve_now(args.at.as_deref())?;
    let tz = *now.offset();
    let config = Config::load()?;
    let db = Database::open()?;

    let mut task = db.get_task(&args.id)?;
    let booked = to_booked_intervals(&db.all_blocks()?, &tz);
    let planner = ReschedulePlanner::with_config(config.resolver_config());
    let outcome = planner.reschedule(&task, &now, &booked)?;

    task.postpone(outcome.rescheduled_at)?;
    let bookings = outcome.bookings(&task, &tz)?;
    db.record_deferral(&task, &bookings)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!(
            "Deferred {} to {}",
            task.title,
            outcome.rescheduled_at.with_timezone(&tz).format("%Y-%m-%d %H:%M")
        );
        println!("{}", outcome.reason);
    }
    Ok(())
}
