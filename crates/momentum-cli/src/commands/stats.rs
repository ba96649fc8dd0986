use chrono::{Local, Utc};
use clap::Subcommand;
use momentum_core::stats::{analyze_user_type, analyze_wave, analyze_weekly};
use momentum_core::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Behavior type from completion hours
    UserType {
        #[arg(long)]
        json: bool,
    },
    /// Completed tasks this week vs last week
    Weekly {
        #[arg(long)]
        json: bool,
    },
    /// Motivation by completion hour
    Wave {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let tasks = db.list_tasks(None)?;

    match action {
        StatsAction::UserType { json } => {
            let report = analyze_user_type(&tasks, &Local);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.user_type.label());
                println!("{}", report.user_type.description());
            }
        }
        StatsAction::Weekly { json } => {
            let weekly = analyze_weekly(&tasks, Utc::now());
            if json {
                println!("{}", serde_json::to_string_pretty(&weekly)?);
            } else if !weekly.has_data() {
                println!("no completed tasks this week");
            } else {
                println!("Completed this week: {}", weekly.total_completed);
                println!("  high resistance:   {}", weekly.high_resistance_completed);
                println!(
                    "Last week: {} ({:+})",
                    weekly.previous_week_completed, weekly.difference
                );
            }
        }
        StatsAction::Wave { json } => {
            let wave = analyze_wave(&tasks, &Local);
            if json {
                println!("{}", serde_json::to_string_pretty(&wave)?);
            } else if !wave.has_data() {
                println!("no completed tasks yet");
            } else {
                for h in &wave.hours {
                    println!(
                        "{:02}:00  {:<10} A{:>5.1} R{:>5.1}",
                        h.hour,
                        "#".repeat(h.count.min(10)),
                        h.avg_achievement,
                        h.avg_resistance
                    );
                }
                if let Some(peak) = wave.peak_hour {
                    println!("Peak hour: {peak:02}:00");
                }
            }
        }
    }
    Ok(())
}
