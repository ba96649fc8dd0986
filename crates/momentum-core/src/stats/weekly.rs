//! Completions over the last seven days, compared with the week before.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Resistance above this counts as a hard task.
const HIGH_RESISTANCE: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAchievements {
    pub total_completed: usize,
    pub high_resistance_completed: usize,
    pub previous_week_completed: usize,
    /// `total_completed - previous_week_completed`
    pub difference: i64,
}

impl WeeklyAchievements {
    pub fn has_data(&self) -> bool {
        self.total_completed > 0
    }
}

/// Count completions in `[now - 7d, ...)` and `[now - 14d, now - 7d)`.
pub fn analyze_weekly(tasks: &[Task], now: DateTime<Utc>) -> WeeklyAchievements {
    let week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(14);

    let this_week: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.completed_at.is_some_and(|at| at >= week_ago))
        .collect();
    let previous_week_completed = tasks
        .iter()
        .filter(|t| {
            t.completed_at
                .is_some_and(|at| at >= two_weeks_ago && at < week_ago)
        })
        .count();

    let total_completed = this_week.len();
    WeeklyAchievements {
        total_completed,
        high_resistance_completed: this_week
            .iter()
            .filter(|t| t.resistance() > HIGH_RESISTANCE)
            .count(),
        previous_week_completed,
        difference: total_completed as i64 - previous_week_completed as i64,
    }
}
