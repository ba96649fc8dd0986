//! Behavior type diagnosis from completion times.
//!
//! The average local completion hour decides between night, morning and
//! midday types. Night types are further split by how long tasks take from
//! start to completion.

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::task::{Task, TaskStatus};

/// Night types taking longer than this many hours are slow starters.
const SLOW_START_HOURS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// No tasks at all
    NoData,
    /// Tasks exist but none completed yet
    Preparing,
    NightSlowStarter,
    NightFocused,
    MorningStarter,
    MiddayBalanced,
}

impl UserType {
    pub fn label(&self) -> &'static str {
        match self {
            UserType::NoData => "No data yet",
            UserType::Preparing => "Preparing",
            UserType::NightSlowStarter => "Night slow-starter",
            UserType::NightFocused => "Night focused",
            UserType::MorningStarter => "Morning starter",
            UserType::MiddayBalanced => "Midday balanced",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UserType::NoData => "Run a few tasks and your type will be analyzed.",
            UserType::Preparing => "Complete a task and your type will be analyzed.",
            UserType::NightSlowStarter => {
                "You focus best at night. You start slowly and hit your stride later."
            }
            UserType::NightFocused => "You focus best at night and finish tasks efficiently.",
            UserType::MorningStarter => "You focus best in the morning and make progress from the start of the day.",
            UserType::MiddayBalanced => "You focus best during the day and move tasks along at a steady pace.",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Diagnosis with the averages it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypeReport {
    pub user_type: UserType,
    /// Average local completion hour
    pub avg_hour: Option<f64>,
    /// Average start-to-completion time in hours
    pub avg_hours_to_complete: Option<f64>,
}

/// Diagnose the user's behavior type; hours are local to `tz`.
pub fn analyze_user_type<Tz: TimeZone>(tasks: &[Task], tz: &Tz) -> UserTypeReport {
    if tasks.is_empty() {
        return UserTypeReport {
            user_type: UserType::NoData,
            avg_hour: None,
            avg_hours_to_complete: None,
        };
    }

    let completed: Vec<(&Task, DateTime<Tz>)> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .filter_map(|t| t.completed_at.map(|at| (t, at.with_timezone(tz))))
        .collect();
    if completed.is_empty() {
        return UserTypeReport {
            user_type: UserType::Preparing,
            avg_hour: None,
            avg_hours_to_complete: None,
        };
    }

    let avg_hour =
        completed.iter().map(|(_, at)| at.hour() as f64).sum::<f64>() / completed.len() as f64;

    let durations: Vec<f64> = completed
        .iter()
        .filter_map(|(t, _)| {
            let start = t.started_at?;
            let end = t.completed_at?;
            Some((end - start).num_milliseconds() as f64 / 3_600_000.0)
        })
        .collect();
    let avg_hours_to_complete = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    let user_type = if avg_hour >= 18.0 || avg_hour < 6.0 {
        if avg_hours_to_complete > SLOW_START_HOURS {
            UserType::NightSlowStarter
        } else {
            UserType::NightFocused
        }
    } else if avg_hour < 12.0 {
        UserType::MorningStarter
    } else {
        UserType::MiddayBalanced
    };

    UserTypeReport {
        user_type,
        avg_hour: Some(avg_hour),
        avg_hours_to_complete: Some(avg_hours_to_complete),
    }
}
