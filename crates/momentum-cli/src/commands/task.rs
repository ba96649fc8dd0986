//! Task management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use momentum_core::task::EmotionRecord;
use momentum_core::{Database, Task, TaskRecord, TaskStatus};
use tracing::warn;

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task title
        title: String,
        /// Deadline (RFC 3339, e.g. 2026-03-10T18:00:00+09:00)
        #[arg(long)]
        deadline: String,
        /// Expected sense of achievement, 0-100
        #[arg(long, default_value = "50")]
        achievement: i64,
        /// Expected resistance, 0-100
        #[arg(long, default_value = "50")]
        resistance: i64,
    },
    /// List tasks ordered by deadline
    List {
        /// Filter by status (pending, in_progress, completed, postponed)
        #[arg(long)]
        status: Option<TaskStatus>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show task details
    Show {
        /// Task ID
        id: String,
    },
    /// Mark a task as in progress
    Start {
        /// Task ID
        id: String,
    },
    /// Mark an in-progress task as completed
    Complete {
        /// Task ID
        id: String,
    },
    /// Return a postponed task to the proposal pool
    Reactivate {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
    /// Import tasks from a JSON array of task records
    Import {
        /// Path to the JSON file
        path: std::path::PathBuf,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TaskAction::Add {
            title,
            deadline,
            achievement,
            resistance,
        } => {
            let record = TaskRecord {
                id: uuid::Uuid::new_v4().to_string(),
                title,
                deadline,
                emotion_matrix: EmotionRecord {
                    achievement,
                    resistance,
                },
                status: None,
                created_at: Some(Utc::now().to_rfc3339()),
                started_at: None,
                completed_at: None,
                rescheduled_to: None,
            };
            let task = record.validate()?;
            db.save_task(&task)?;
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { status, json } => {
            let tasks = db.list_tasks(status)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("no tasks");
            } else {
                for task in &tasks {
                    println!("{}", summary_line(task));
                }
            }
        }
        TaskAction::Show { id } => {
            let task = db.get_task(&id)?;
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Start { id } => {
            let mut task = db.get_task(&id)?;
            task.start(Utc::now())?;
            db.save_task(&task)?;
            println!("Task started: {id}");
        }
        TaskAction::Complete { id } => {
            let mut task = db.get_task(&id)?;
            task.complete(Utc::now())?;
            db.save_task(&task)?;
            println!("Task completed: {id}");
        }
        TaskAction::Reactivate { id } => {
            let mut task = db.get_task(&id)?;
            task.reactivate()?;
            db.save_task(&task)?;
            println!("Task reactivated: {id}");
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
        TaskAction::Import { path } => {
            let content = std::fs::read_to_string(&path)?;
            let records: Vec<TaskRecord> = serde_json::from_str(&content)?;
            let mut imported = 0;
            let mut skipped = 0;
            for record in &records {
                match record.validate() {
                    Ok(task) => {
                        db.save_task(&task)?;
                        imported += 1;
                    }
                    Err(e) => {
                        warn!(id = %record.id, error = %e, "skipping invalid task record");
                        skipped += 1;
                    }
                }
            }
            println!("Imported {imported} task(s), skipped {skipped} invalid");
        }
    }
    Ok(())
}

fn summary_line(task: &Task) -> String {
    format!(
        "{}  {:<11}  {}  A{:>3} R{:>3}  {}",
        task.id,
        task.status.as_str(),
        task.deadline.format("%Y-%m-%d %H:%M UTC"),
        task.achievement(),
        task.resistance(),
        task.title
    )
}
