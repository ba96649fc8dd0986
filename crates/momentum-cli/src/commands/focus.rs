//! ON/OFF mode and focus timer commands.
//!
//! The session is stored in the database between invocations. Every command
//! first applies elapsed timers, so a focus timer that ran out while no
//! command was running completes its task on the next call.

use chrono::{DateTime, Local, Utc};
use clap::Subcommand;
use momentum_core::{propose, Config, Database, FocusSession, SessionEvent, SessionMode, TaskStatus};
use serde::Serialize;
use tracing::warn;

#[derive(Subcommand)]
pub enum FocusAction {
    /// Switch ON: look for something to do
    On,
    /// Switch OFF, abandoning a running focus timer
    Off,
    /// Start the focus timer
    Start {
        /// Task ID; defaults to the proposed task
        id: Option<String>,
    },
    /// Print the session state as JSON
    Status,
}

#[derive(Serialize)]
struct Status<'a> {
    #[serde(flatten)]
    mode: &'a SessionMode,
    remaining_secs: Option<i64>,
    progress: f64,
}

fn load_session(db: &Database, config: &Config) -> FocusSession {
    let mut session = match db.load_session() {
        Ok(Some(session)) => session,
        Ok(None) => FocusSession::default(),
        Err(e) => {
            warn!(error = %e, "discarding unreadable focus session");
            FocusSession::default()
        }
    };
    session.set_config(config.session_config());
    session
}

/// Persist side effects of a session event and print it.
fn handle_event(db: &Database, event: &SessionEvent) -> Result<(), Box<dyn std::error::Error>> {
    if let SessionEvent::FocusCompleted { task_id, at } = event {
        match db.get_task(task_id) {
            Ok(mut task) if task.status == TaskStatus::InProgress => {
                task.complete(*at)?;
                db.save_task(&task)?;
            }
            Ok(_) => {}
            Err(e) => warn!(task = %task_id, error = %e, "completed focus for a missing task"),
        }
    }
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn status(session: &FocusSession, now: DateTime<Utc>) -> Status<'_> {
    Status {
        mode: session.mode(),
        remaining_secs: session.remaining(now).map(|d| d.num_seconds()),
        progress: session.progress(now),
    }
}

pub fn run(action: FocusAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut session = load_session(&db, &config);
    let now = Utc::now();

    if let Some(event) = session.tick(now) {
        handle_event(&db, &event)?;
    }

    match action {
        FocusAction::On => {
            if let Some(event) = session.switch_on(now) {
                handle_event(&db, &event)?;
            }
        }
        FocusAction::Off => {
            for event in session.switch_off(now) {
                handle_event(&db, &event)?;
            }
        }
        FocusAction::Start { id } => {
            let mut task = match id {
                Some(id) => db.get_task(&id)?,
                None => {
                    let pending = db.list_tasks(Some(TaskStatus::Pending))?;
                    propose(&pending, &now.with_timezone(&Local))
                        .cloned()
                        .ok_or("no task to focus on")?
                }
            };
            let event = session.start_focus(task.id.clone(), now)?;
            task.start(now)?;
            db.save_task(&task)?;
            handle_event(&db, &event)?;
        }
        FocusAction::Status => {
            println!("{}", serde_json::to_string_pretty(&status(&session, now))?);
        }
    }

    db.save_session(&session)?;
    Ok(())
}
