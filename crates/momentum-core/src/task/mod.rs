//! Task model: emotion matrix, status state machine and transitions.
//!
//! Tasks are owned by the caller. The proposal and reschedule engines only
//! read them; every status change goes through the transition methods here.

pub(crate) mod record;

pub use record::{EmotionRecord, TaskRecord};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Upper bound of both emotion axes.
pub const EMOTION_MAX: u8 = 100;

/// Task status.
///
/// ```text
///   PENDING ──start──> IN_PROGRESS ──complete──> COMPLETED
///      │  ^                 ^
///  defer  reactivate        │
///      v  │                 │
///   POSTPONED ────start─────┘
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be proposed (initial state)
    Pending,
    /// Focus timer running
    InProgress,
    /// Done (terminal state)
    Completed,
    /// Deferred to a planned slot
    Postponed,
}

impl TaskStatus {
    /// Check if a transition is valid.
    pub fn can_transition_to(&self, to: &TaskStatus) -> bool {
        match self {
            TaskStatus::Pending => matches!(to, TaskStatus::InProgress | TaskStatus::Postponed),
            TaskStatus::InProgress => matches!(to, TaskStatus::Completed),
            TaskStatus::Postponed => matches!(to, TaskStatus::InProgress | TaskStatus::Pending),
            TaskStatus::Completed => false,
        }
    }

    /// Get valid next states for this state.
    pub fn valid_transitions(&self) -> &[TaskStatus] {
        match self {
            TaskStatus::Pending => &[TaskStatus::InProgress, TaskStatus::Postponed],
            TaskStatus::InProgress => &[TaskStatus::Completed],
            TaskStatus::Postponed => &[TaskStatus::InProgress, TaskStatus::Pending],
            TaskStatus::Completed => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Postponed => "postponed",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "postponed" => Ok(TaskStatus::Postponed),
            other => Err(ValidationError::InvalidValue {
                field: "status".to_string(),
                message: format!("unknown status {other:?}"),
            }),
        }
    }
}

/// Subjective ratings attached to a task.
///
/// `achievement` is the expected sense of accomplishment, `resistance` the
/// expected psychological friction. Both are within `0..=100`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "EmotionRecord", into = "EmotionRecord")]
pub struct EmotionMatrix {
    achievement: u8,
    resistance: u8,
}

impl EmotionMatrix {
    /// Build a matrix, rejecting values above [`EMOTION_MAX`].
    pub fn new(achievement: u8, resistance: u8) -> Result<Self, ValidationError> {
        check_emotion("achievement", achievement as i64)?;
        check_emotion("resistance", resistance as i64)?;
        Ok(Self {
            achievement,
            resistance,
        })
    }

    pub fn achievement(&self) -> u8 {
        self.achievement
    }

    pub fn resistance(&self) -> u8 {
        self.resistance
    }
}

impl Default for EmotionMatrix {
    fn default() -> Self {
        Self {
            achievement: 50,
            resistance: 50,
        }
    }
}

pub(crate) fn check_emotion(field: &str, value: i64) -> Result<u8, ValidationError> {
    if !(0..=EMOTION_MAX as i64).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min: 0,
            max: EMOTION_MAX as i64,
        });
    }
    Ok(value as u8)
}

/// A unit of work the user logged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Task title
    pub title: String,
    /// Absolute deadline
    pub deadline: DateTime<Utc>,
    pub emotion_matrix: EmotionMatrix,
    pub status: TaskStatus,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Set when the focus timer starts
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// Set when the task completes
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Planned slot chosen when the task was deferred
    #[serde(default)]
    pub rescheduled_to: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task with a generated id.
    pub fn new(title: impl Into<String>, deadline: DateTime<Utc>, emotion: EmotionMatrix) -> Self {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            deadline,
            emotion_matrix: emotion,
            status: TaskStatus::Pending,
            created_at: Some(Utc::now()),
            started_at: None,
            completed_at: None,
            rescheduled_to: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn achievement(&self) -> u8 {
        self.emotion_matrix.achievement()
    }

    pub fn resistance(&self) -> u8 {
        self.emotion_matrix.resistance()
    }

    /// Start the focus timer: PENDING/POSTPONED → IN_PROGRESS.
    pub fn start(&mut self, at: DateTime<Utc>) -> Result<(), TaskTransitionError> {
        self.check(TaskStatus::InProgress)?;
        self.status = TaskStatus::InProgress;
        self.started_at = Some(at);
        Ok(())
    }

    /// Finish the task: IN_PROGRESS → COMPLETED.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), TaskTransitionError> {
        self.check(TaskStatus::Completed)?;
        self.status = TaskStatus::Completed;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Defer the task to a planned slot: PENDING → POSTPONED.
    pub fn postpone(&mut self, to: DateTime<Utc>) -> Result<(), TaskTransitionError> {
        self.check(TaskStatus::Postponed)?;
        self.status = TaskStatus::Postponed;
        self.rescheduled_to = Some(to);
        Ok(())
    }

    /// Put a postponed task back into the proposal pool: POSTPONED → PENDING.
    pub fn reactivate(&mut self) -> Result<(), TaskTransitionError> {
        self.check(TaskStatus::Pending)?;
        self.status = TaskStatus::Pending;
        Ok(())
    }

    fn check(&self, to: TaskStatus) -> Result<(), TaskTransitionError> {
        if !self.status.can_transition_to(&to) {
            return Err(TaskTransitionError {
                from: self.status,
                to,
            });
        }
        Ok(())
    }
}

/// Error returned when an invalid status transition is attempted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskTransitionError {
    pub from: TaskStatus,
    pub to: TaskStatus,
}

impl fmt::Display for TaskTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid status transition: {} → {}", self.from, self.to)
    }
}

impl std::error::Error for TaskTransitionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Task {
        Task::new(
            "Write report",
            Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap(),
            EmotionMatrix::new(70, 30).unwrap(),
        )
    }

    #[test]
    fn emotion_matrix_rejects_out_of_range() {
        assert!(EmotionMatrix::new(100, 0).is_ok());
        let err = EmotionMatrix::new(101, 0).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { value: 101, .. }));
    }

    #[test]
    fn new_task_is_pending() {
        let task = sample();
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.started_at.is_none());
        assert!(!task.id.is_empty());
    }

    #[test]
    fn start_then_complete_sets_timestamps() {
        let mut task = sample();
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 25, 0).unwrap();
        task.start(t0).unwrap();
        task.complete(t1).unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.started_at, Some(t0));
        assert_eq!(task.completed_at, Some(t1));
    }

    #[test]
    fn completed_is_terminal() {
        let mut task = sample();
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        task.start(t).unwrap();
        task.complete(t).unwrap();
        let err = task.postpone(t).unwrap_err();
        assert_eq!(err.from, TaskStatus::Completed);
        assert_eq!(err.to, TaskStatus::Postponed);
        assert!(TaskStatus::Completed.valid_transitions().is_empty());
    }

    #[test]
    fn cannot_complete_without_starting() {
        let mut task = sample();
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        assert!(task.complete(t).is_err());
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn postpone_and_reactivate() {
        let mut task = sample();
        let slot = Utc.with_ymd_and_hms(2026, 3, 7, 9, 0, 0).unwrap();
        task.postpone(slot).unwrap();
        assert_eq!(task.rescheduled_to, Some(slot));
        task.reactivate().unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Postponed,
        ] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let task = sample().with_id("t-1");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["emotionMatrix"]["achievement"], 70);
        assert_eq!(json["status"], "pending");
        assert!(json.get("rescheduledTo").is_some());
    }
}
