//! Calendar block commands.

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Subcommand, ValueEnum};
use momentum_core::calendar::{
    day_key, expand_recurring, infer_block_type, month_grid, suggest_on_off, to_booked_intervals,
    week_view, DayView,
};
use momentum_core::time::{format_hhmm, parse_hhmm};
use momentum_core::{BlockType, Config, ConflictResolver, Database, TimeBlock};

use super::resolve_now;

#[derive(Clone, Copy, ValueEnum)]
pub enum View {
    Day,
    Week,
    Month,
}

#[derive(Subcommand)]
pub enum CalendarAction {
    /// Add a block
    Add {
        /// Block label
        label: String,
        /// Day (Y-M-D), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
        /// Block type (class, on, off, work); inferred from the label if omitted
        #[arg(long = "type")]
        block_type: Option<BlockType>,
    },
    /// Show blocks for a day, week or month
    List {
        /// Any day of the period (Y-M-D), defaults to today
        #[arg(long)]
        date: Option<String>,
        #[arg(long, value_enum, default_value = "day")]
        view: View,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a block
    Remove {
        /// Block ID
        id: String,
    },
    /// Add the same block on several weekdays of one week
    Recurring {
        /// Block label
        label: String,
        /// Any day of the week (Y-M-D), defaults to this week
        #[arg(long)]
        week_of: Option<String>,
        /// Weekdays, 0 = Sunday (e.g. 1,3,5)
        #[arg(long, value_delimiter = ',', required = true)]
        days: Vec<u32>,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
        #[arg(long = "type")]
        block_type: Option<BlockType>,
    },
    /// Suggest the configured ON/OFF windows for a day
    Suggest {
        /// Day (Y-M-D), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Save the suggested blocks
        #[arg(long)]
        apply: bool,
    },
    /// Check a session start against booked blocks
    Conflicts {
        /// Proposed session start (RFC 3339)
        #[arg(long)]
        at: String,
    },
}

fn day_or_today(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(key) => Ok(day_key::parse(key)?),
        None => Ok(resolve_now(None)?.date_naive()),
    }
}

pub fn run(action: CalendarAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        CalendarAction::Add {
            label,
            date,
            start,
            end,
            block_type,
        } => {
            let date = day_or_today(date.as_deref())?;
            let block_type = block_type.unwrap_or_else(|| infer_block_type(&label));
            let block = TimeBlock::new(
                date,
                parse_hhmm("start", &start)?,
                parse_hhmm("end", &end)?,
                label,
                block_type,
            )?;
            db.save_block(&block)?;
            println!("Block created: {}", block.id);
            println!("{}", block_line(&block));
        }
        CalendarAction::List { date, view, json } => {
            let date = day_or_today(date.as_deref())?;
            match view {
                View::Day => {
                    let day = DayView::build(date, &db.blocks_on(date)?);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&day)?);
                    } else {
                        print_day(&day);
                    }
                }
                View::Week => {
                    let blocks = db.all_blocks()?;
                    let week = week_view(date, &blocks);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&week)?);
                    } else {
                        for day in &week {
                            print_day(day);
                        }
                    }
                }
                View::Month => {
                    let cells = month_grid(date, &db.all_blocks()?);
                    if json {
                        println!("{}", serde_json::to_string_pretty(&cells)?);
                    } else {
                        println!(" Sun  Mon  Tue  Wed  Thu  Fri  Sat");
                        for row in cells.chunks(7) {
                            let line: Vec<String> = row
                                .iter()
                                .map(|c| match (c.in_month, c.count) {
                                    (false, _) => "    ".to_string(),
                                    (true, 0) => format!("{:>3} ", c.date.day()),
                                    (true, _) => format!("{:>3}*", c.date.day()),
                                })
                                .collect();
                            println!("{}", line.join(" "));
                        }
                    }
                }
            }
        }
        CalendarAction::Remove { id } => {
            db.delete_block(&id)?;
            println!("Block removed: {id}");
        }
        CalendarAction::Recurring {
            label,
            week_of,
            days,
            start,
            end,
            block_type,
        } => {
            let week_of = day_or_today(week_of.as_deref())?;
            let block_type = block_type.unwrap_or_else(|| infer_block_type(&label));
            let blocks = expand_recurring(
                week_of,
                parse_hhmm("start", &start)?,
                parse_hhmm("end", &end)?,
                &label,
                block_type,
                &days,
            )?;
            for block in &blocks {
                db.save_block(block)?;
                println!("{}", block_line(block));
            }
            println!("Created {} block(s)", blocks.len());
        }
        CalendarAction::Suggest { date, apply } => {
            let date = day_or_today(date.as_deref())?;
            let windows = Config::load()?.on_off_windows()?;
            let suggestions = suggest_on_off(date, &windows, &db.blocks_on(date)?)?;
            if suggestions.is_empty() {
                println!("no free ON/OFF window on {}", day_key::format(date));
            }
            for block in &suggestions {
                if apply {
                    db.save_block(block)?;
                }
                println!("{}", block_line(block));
            }
        }
        CalendarAction::Conflicts { at } => {
            let proposed = resolve_now(Some(&at))?;
            let tz = *proposed.offset();
            let config = Config::load()?;
            let resolver = ConflictResolver::with_config(config.resolver_config());
            let booked = to_booked_intervals(&db.all_blocks()?, &tz);
            let start = proposed.with_timezone(&Utc);
            let slot = resolver.avoid_conflict(start, &booked)?;
            if slot == start {
                println!("free: {}", proposed.to_rfc3339());
            } else {
                println!("moved to {}", slot.with_timezone(&tz).to_rfc3339());
            }
        }
    }
    Ok(())
}

fn block_line(block: &TimeBlock) -> String {
    format!(
        "{}  {}-{}  {:<5}  {}  ({})",
        day_key::format(block.date),
        format_hhmm(block.start),
        format_hhmm(block.end),
        block.block_type.as_str(),
        block.label,
        block.id
    )
}

fn print_day(day: &DayView) {
    println!("{} ({})", day_key::format(day.date), day.date.weekday());
    if day.blocks.is_empty() {
        println!("  (free)");
    }
    for block in &day.blocks {
        println!(
            "  {}-{}  {:<5}  {}  ({})",
            format_hhmm(block.start),
            format_hhmm(block.end),
            block.block_type.as_str(),
            block.label,
            block.id
        );
    }
}
