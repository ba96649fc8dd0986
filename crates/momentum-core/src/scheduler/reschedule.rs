//! Reschedule planner: picks a future slot for a deferred task.
//!
//! The planner sorts a task into one of three tiers by how many days remain
//! until its deadline, picks a candidate day and hour from the tier and the
//! task's emotion ratings, then hands the candidate to the
//! [`ConflictResolver`](super::ConflictResolver).

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use tracing::debug;

use super::conflict::{ConflictResolver, ResolverConfig};
use crate::calendar::{day_key, BlockType, BookedInterval, TimeBlock};
use crate::error::{Result, ValidationError};
use crate::task::{Task, TaskRecord};
use crate::time::{at_local_hour, MINUTES_PER_DAY};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Hour from which "urgent" tasks go to the next day.
const EVENING_HOUR: u32 = 18;

/// Deadline horizon tier.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RescheduleTier {
    /// At most one day left
    Urgent,
    /// Two or three days left
    Soon,
    /// More than three days left
    Relaxed,
}

impl RescheduleTier {
    /// Tier for a day count as computed by [`days_until`].
    pub fn for_days(days: i64) -> Self {
        if days <= 1 {
            RescheduleTier::Urgent
        } else if days <= 3 {
            RescheduleTier::Soon
        } else {
            RescheduleTier::Relaxed
        }
    }
}

/// Which day an urgent task landed on, relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgentDay {
    Today,
    Tomorrow,
    /// The conflict search moved the slot further out
    On(NaiveDate),
}

/// Human-readable explanation of a chosen slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescheduleReason {
    Urgent { day: UrgentDay, hour: u32 },
    Soon { days_before: i64, hour: u32 },
    Relaxed { hour: u32 },
}

impl RescheduleReason {
    pub fn tier(&self) -> RescheduleTier {
        match self {
            RescheduleReason::Urgent { .. } => RescheduleTier::Urgent,
            RescheduleReason::Soon { .. } => RescheduleTier::Soon,
            RescheduleReason::Relaxed { .. } => RescheduleTier::Relaxed,
        }
    }

    /// Local hour of the final slot.
    pub fn hour(&self) -> u32 {
        match *self {
            RescheduleReason::Urgent { hour, .. }
            | RescheduleReason::Soon { hour, .. }
            | RescheduleReason::Relaxed { hour } => hour,
        }
    }
}

impl fmt::Display for RescheduleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RescheduleReason::Urgent { day, hour } => {
                let when = match day {
                    UrgentDay::Today => "today".to_string(),
                    UrgentDay::Tomorrow => "tomorrow".to_string(),
                    UrgentDay::On(date) => day_key::format(*date),
                };
                write!(f, "Deadline is close; moved to {when} at {hour}:00.")
            }
            RescheduleReason::Soon { days_before, hour } => {
                let unit = if *days_before == 1 { "day" } else { "days" };
                write!(
                    f,
                    "Moved to {days_before} {unit} before the deadline, in a low-resistance hour ({hour}:00)."
                )
            }
            RescheduleReason::Relaxed { hour } => write!(
                f,
                "Moved to 3 days before the deadline, in an easy-focus hour ({hour}:00)."
            ),
        }
    }
}

fn serialize_display<S: Serializer>(reason: &RescheduleReason, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// Result of planning a deferred task.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleOutcome {
    pub rescheduled_at: DateTime<Utc>,
    /// End of the booked session
    pub ends_at: DateTime<Utc>,
    pub tier: RescheduleTier,
    #[serde(serialize_with = "serialize_display")]
    pub reason: RescheduleReason,
}

impl RescheduleOutcome {
    /// Calendar blocks for the planned session, labelled with the task title.
    ///
    /// A session that crosses midnight is split into one block per local day,
    /// so the blocks together cover `[rescheduled_at, ends_at)`.
    pub fn bookings<Tz: TimeZone>(
        &self,
        task: &Task,
        tz: &Tz,
    ) -> std::result::Result<Vec<TimeBlock>, ValidationError> {
        let start = self.rescheduled_at.with_timezone(tz);
        let end = self.ends_at.with_timezone(tz);
        let (first, last) = (start.date_naive(), end.date_naive());

        let mut blocks = Vec::new();
        for date in first.iter_days().take_while(|d| *d <= last) {
            let from = if date == first { minute_of_day(&start) } else { 0 };
            let to = if date == last { minute_of_day(&end) } else { MINUTES_PER_DAY };
            if from < to {
                blocks.push(TimeBlock::new(date, from, to, task.title.clone(), BlockType::Work)?);
            }
        }
        if blocks.is_empty() {
            return Err(ValidationError::InvalidInstantRange {
                start: self.rescheduled_at,
                end: self.ends_at,
            });
        }
        Ok(blocks)
    }
}

fn minute_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> u16 {
    (at.hour() * 60 + at.minute()) as u16
}

/// `ceil((deadline - now) / 1 day)` on millisecond precision.
pub fn days_until<Tz: TimeZone>(deadline: DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    let ms = (deadline - now.with_timezone(&Utc)).num_milliseconds();
    let q = ms / MS_PER_DAY;
    if ms % MS_PER_DAY > 0 {
        q + 1
    } else {
        q
    }
}

/// Chooses future slots for deferred tasks.
#[derive(Debug, Clone, Default)]
pub struct ReschedulePlanner {
    resolver: ConflictResolver,
}

impl ReschedulePlanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Planner whose conflict search uses `config`.
    pub fn with_config(config: ResolverConfig) -> Self {
        Self {
            resolver: ConflictResolver::with_config(config),
        }
    }

    /// Plan a slot for `task`.
    ///
    /// Local dates and hours are taken in `now`'s time zone. Fails with
    /// `NoSlotAvailable` when the conflict search is exhausted.
    pub fn reschedule<Tz: TimeZone>(
        &self,
        task: &Task,
        now: &DateTime<Tz>,
        booked: &[BookedInterval],
    ) -> Result<RescheduleOutcome> {
        let tz = now.timezone();
        let days = days_until(task.deadline, now);
        let tier = RescheduleTier::for_days(days);
        let resistance = task.resistance();

        let candidate = match tier {
            RescheduleTier::Urgent => {
                let mut date = now.date_naive();
                if now.hour() >= EVENING_HOUR {
                    date = date.succ_opt().unwrap_or(date);
                }
                let hour = if resistance > 70 { 14 } else { 9 };
                at_local_hour(&tz, date, hour)
            }
            RescheduleTier::Soon => {
                let back = (days - 1).clamp(1, 2);
                let date = task.deadline.with_timezone(&tz).date_naive() - Duration::days(back);
                let hour = if resistance > 70 {
                    14
                } else if resistance > 40 {
                    10
                } else {
                    9
                };
                at_local_hour(&tz, date, hour)
            }
            RescheduleTier::Relaxed => {
                let date = task.deadline.with_timezone(&tz).date_naive() - Duration::days(3);
                let hour = if task.achievement() > 70 { 9 } else { 10 };
                at_local_hour(&tz, date, hour)
            }
        };

        let rescheduled_at = self.resolver.avoid_conflict(candidate, booked)?;
        let local = rescheduled_at.with_timezone(&tz);
        let hour = local.hour();
        let reason = match tier {
            RescheduleTier::Urgent => {
                let today = now.date_naive();
                let day = if local.date_naive() == today {
                    UrgentDay::Today
                } else if today.succ_opt() == Some(local.date_naive()) {
                    UrgentDay::Tomorrow
                } else {
                    UrgentDay::On(local.date_naive())
                };
                RescheduleReason::Urgent { day, hour }
            }
            RescheduleTier::Soon => RescheduleReason::Soon {
                days_before: days_until(task.deadline, &rescheduled_at),
                hour,
            },
            RescheduleTier::Relaxed => RescheduleReason::Relaxed { hour },
        };

        debug!(task = %task.id, days, ?tier, %candidate, %rescheduled_at, "planned deferred task");
        Ok(RescheduleOutcome {
            rescheduled_at,
            ends_at: rescheduled_at + self.resolver.config().session,
            tier,
            reason,
        })
    }

    /// Validate `record` and plan it; an invalid record fails with `InvalidInput`.
    pub fn reschedule_record<Tz: TimeZone>(
        &self,
        record: &TaskRecord,
        now: &DateTime<Tz>,
        booked: &[BookedInterval],
    ) -> Result<RescheduleOutcome> {
        let task = record.validate()?;
        self.reschedule(&task, now, booked)
    }
}

/// [`ReschedulePlanner::reschedule`] with the default configuration.
pub fn reschedule<Tz: TimeZone>(
    task: &Task,
    now: &DateTime<Tz>,
    booked: &[BookedInterval],
) -> Result<RescheduleOutcome> {
    ReschedulePlanner::new().reschedule(task, now, booked)
}
