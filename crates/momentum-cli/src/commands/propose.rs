use clap::Args;
use momentum_core::{propose_records, rank, Database, ScoreBreakdown, TaskStatus};
use serde::Serialize;

use super::resolve_now;

#[derive(Args)]
pub struct ProposeArgs {
    /// Evaluate at this instant (RFC 3339) instead of now
    #[arg(long)]
    at: Option<String>,
    /// Show every pending task with its score breakdown
    #[arg(long)]
    explain: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RankedEntry<'a> {
    id: &'a str,
    title: &'a str,
    #[serde(flatten)]
    score: ScoreBreakdown,
}

pub fn run(args: ProposeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = resolve_now(args.at.as_deref())?;
    let db = Database::open()?;
    let records = db.task_records(Some(TaskStatus::Pending))?;
    let report = propose_records(&records, &now);

    if args.explain {
        let tasks: Vec<_> = records.iter().filter_map(|r| r.validate().ok()).collect();
        let ranked = rank(&tasks, &now);
        if args.json {
            let entries: Vec<_> = ranked
                .iter()
                .map(|(task, score)| RankedEntry {
                    id: &task.id,
                    title: &task.title,
                    score: *score,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for (task, s) in &ranked {
                println!(
                    "{:>7.1}  urgency {:>5.1}  affect {:>5.1}  {} {:>5.1}  {}",
                    s.total,
                    s.urgency,
                    s.affect,
                    s.period.as_str(),
                    s.time_of_day,
                    task.title
                );
            }
        }
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report.proposal {
            Some(task) => println!("Do now: {} ({})", task.title, task.id),
            None => println!("no tasks to propose"),
        }
    }

    if report.excluded_invalid > 0 {
        eprintln!("{} invalid task record(s) excluded", report.excluded_invalid);
    }
    Ok(())
}
