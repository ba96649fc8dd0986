//! Motivation wave: completions and average ratings per local hour.

use chrono::{TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::task::{Task, TaskStatus};

/// Aggregate for one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyMotivation {
    /// Hour of day (0-23)
    pub hour: u32,
    pub count: usize,
    pub avg_achievement: f64,
    pub avg_resistance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotivationWave {
    /// Hours with at least one completion, ascending
    pub hours: Vec<HourlyMotivation>,
    /// Hour with the most completions; the earliest wins ties
    pub peak_hour: Option<u32>,
    pub avg_achievement: Option<f64>,
}

impl MotivationWave {
    pub fn has_data(&self) -> bool {
        !self.hours.is_empty()
    }
}

#[derive(Default)]
struct Bucket {
    count: usize,
    achievement: u32,
    resistance: u32,
}

/// Group completed tasks by local completion hour in `tz`.
pub fn analyze_wave<Tz: TimeZone>(tasks: &[Task], tz: &Tz) -> MotivationWave {
    let mut buckets: BTreeMap<u32, Bucket> = BTreeMap::new();
    for task in tasks.iter().filter(|t| t.status == TaskStatus::Completed) {
        let Some(at) = task.completed_at else {
            continue;
        };
        let bucket = buckets.entry(at.with_timezone(tz).hour()).or_default();
        bucket.count += 1;
        bucket.achievement += task.achievement() as u32;
        bucket.resistance += task.resistance() as u32;
    }

    let hours: Vec<HourlyMotivation> = buckets
        .into_iter()
        .map(|(hour, b)| HourlyMotivation {
            hour,
            count: b.count,
            avg_achievement: b.achievement as f64 / b.count as f64,
            avg_resistance: b.resistance as f64 / b.count as f64,
        })
        .collect();

    let mut peak: Option<&HourlyMotivation> = None;
    for h in &hours {
        if peak.map_or(true, |p| h.count > p.count) {
            peak = Some(h);
        }
    }

    let total: usize = hours.iter().map(|h| h.count).sum();
    let avg_achievement = (total > 0).then(|| {
        hours
            .iter()
            .map(|h| h.avg_achievement * h.count as f64)
            .sum::<f64>()
            / total as f64
    });

    MotivationWave {
        peak_hour: peak.map(|p| p.hour),
        hours,
        avg_achievement,
    }
}
