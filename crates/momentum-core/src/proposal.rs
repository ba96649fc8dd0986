//! Task proposal: pick the single task to do right now.
//!
//! Every task gets a score made of three parts:
//! - deadline urgency: 100 under 24 hours, 50 under 72 hours, 10 otherwise
//! - base affect: `0.3 * achievement - 0.2 * resistance`
//! - a time-of-day adjustment from the local hour of `now`
//!
//! The highest score wins; ties go to the task listed first.

use chrono::{DateTime, TimeZone, Timelike, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::task::{Task, TaskRecord};

/// Part of the day the local hour falls in.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DayPeriod {
    /// 06:00 to 11:59
    Morning,
    /// 12:00 to 17:59
    Midday,
    /// 18:00 to 05:59
    Night,
}

impl DayPeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Midday,
            _ => DayPeriod::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "morning",
            DayPeriod::Midday => "midday",
            DayPeriod::Night => "night",
        }
    }
}

/// Components of a task's score.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub hours_until_deadline: f64,
    pub urgency: f64,
    pub affect: f64,
    pub period: DayPeriod,
    pub time_of_day: f64,
    pub total: f64,
}

fn urgency(hours: f64) -> f64 {
    if hours < 24.0 {
        100.0
    } else if hours < 72.0 {
        50.0
    } else {
        10.0
    }
}

/// Score `task` at `now`; the local hour is taken in `now`'s time zone.
pub fn score<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> ScoreBreakdown {
    let achievement = task.achievement() as f64;
    let resistance = task.resistance() as f64;
    let hours = (task.deadline - now.with_timezone(&Utc)).num_milliseconds() as f64 / 3_600_000.0;

    let urgency = urgency(hours);
    let affect = 0.3 * achievement - 0.2 * resistance;
    let period = DayPeriod::from_hour(now.hour());
    let time_of_day = match period {
        DayPeriod::Morning => 0.2 * achievement,
        DayPeriod::Midday => 0.1 * (achievement - resistance),
        DayPeriod::Night => 0.2 * (100.0 - resistance),
    };

    ScoreBreakdown {
        hours_until_deadline: hours,
        urgency,
        affect,
        period,
        time_of_day,
        total: urgency + affect + time_of_day,
    }
}

/// The best task to work on at `now`, or `None` for an empty list.
///
/// Status is not filtered; callers pass the tasks they consider eligible.
pub fn propose<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Option<&'a Task> {
    let mut best: Option<(&Task, f64)> = None;
    for task in tasks {
        let total = score(task, now).total;
        if best.map_or(true, |(_, top)| total > top) {
            best = Some((task, total));
        }
    }
    if let Some((task, total)) = best {
        debug!(task = %task.id, score = total, candidates = tasks.len(), "proposed task");
    }
    best.map(|(task, _)| task)
}

/// All tasks with their scores, highest first. Equal scores keep input order.
pub fn rank<'a, Tz: TimeZone>(tasks: &'a [Task], now: &DateTime<Tz>) -> Vec<(&'a Task, ScoreBreakdown)> {
    let mut ranked: Vec<_> = tasks.iter().map(|t| (t, score(t, now))).collect();
    ranked.sort_by(|a, b| b.1.total.total_cmp(&a.1.total));
    ranked
}

/// Result of proposing from raw records.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProposalReport {
    pub proposal: Option<Task>,
    /// Records dropped because they failed validation
    pub excluded_invalid: usize,
}

/// Validate `records`, drop the malformed ones and propose from the rest.
pub fn propose_records<Tz: TimeZone>(records: &[TaskRecord], now: &DateTime<Tz>) -> ProposalReport {
    let mut tasks = Vec::with_capacity(records.len());
    let mut excluded_invalid = 0;
    for record in records {
        match record.validate() {
            Ok(task) => tasks.push(task),
            Err(e) => {
                warn!(id = %record.id, error = %e, "excluding invalid task record");
                excluded_invalid += 1;
            }
        }
    }
    ProposalReport {
        proposal: propose(&tasks, now).cloned(),
        excluded_invalid,
    }
}
