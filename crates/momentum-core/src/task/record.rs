//! Untrusted task records as they arrive from stores and imports.
//!
//! Records keep every field in its raw form. [`TaskRecord::validate`] turns
//! one into a [`Task`] or reports exactly which field is malformed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{check_emotion, EmotionMatrix, Task, TaskStatus};
use crate::error::ValidationError;

/// Raw emotion ratings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmotionRecord {
    pub achievement: i64,
    pub resistance: i64,
}

impl TryFrom<EmotionRecord> for EmotionMatrix {
    type Error = ValidationError;

    fn try_from(raw: EmotionRecord) -> Result<Self, Self::Error> {
        let achievement = check_emotion("achievement", raw.achievement)?;
        let resistance = check_emotion("resistance", raw.resistance)?;
        EmotionMatrix::new(achievement, resistance)
    }
}

impl From<EmotionMatrix> for EmotionRecord {
    fn from(m: EmotionMatrix) -> Self {
        EmotionRecord {
            achievement: m.achievement() as i64,
            resistance: m.resistance() as i64,
        }
    }
}

/// Task record with unvalidated fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub deadline: String,
    pub emotion_matrix: EmotionRecord,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub rescheduled_to: Option<String>,
}

impl TaskRecord {
    /// Validate every field and build a [`Task`].
    ///
    /// A missing status means `pending`, matching how freshly created
    /// records are stored.
    pub fn validate(&self) -> Result<Task, ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "id".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let status = match self.status.as_deref() {
            None | Some("") => TaskStatus::Pending,
            Some(s) => s.parse()?,
        };
        Ok(Task {
            id: self.id.clone(),
            title: self.title.clone(),
            deadline: parse_instant("deadline", &self.deadline)?,
            emotion_matrix: EmotionMatrix::try_from(self.emotion_matrix)?,
            status,
            created_at: parse_optional("createdAt", self.created_at.as_deref())?,
            started_at: parse_optional("startedAt", self.started_at.as_deref())?,
            completed_at: parse_optional("completedAt", self.completed_at.as_deref())?,
            rescheduled_to: parse_optional("rescheduledTo", self.rescheduled_to.as_deref())?,
        })
    }
}

impl TryFrom<&TaskRecord> for Task {
    type Error = ValidationError;

    fn try_from(record: &TaskRecord) -> Result<Self, Self::Error> {
        record.validate()
    }
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        TaskRecord {
            id: task.id.clone(),
            title: task.title.clone(),
            deadline: task.deadline.to_rfc3339(),
            emotion_matrix: task.emotion_matrix.into(),
            status: Some(task.status.as_str().to_string()),
            created_at: task.created_at.map(|t| t.to_rfc3339()),
            started_at: task.started_at.map(|t| t.to_rfc3339()),
            completed_at: task.completed_at.map(|t| t.to_rfc3339()),
            rescheduled_to: task.rescheduled_to.map(|t| t.to_rfc3339()),
        }
    }
}

/// Parse an RFC 3339 timestamp into UTC.
pub(crate) fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn parse_optional(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>, ValidationError> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => parse_instant(field, v).map(Some),
    }
}
