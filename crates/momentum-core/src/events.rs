use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::ModeKind;

/// Every focus-session state change produces an Event.
/// The CLI prints them; callers persist task changes in response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SessionEvent {
    ModeChanged {
        from: ModeKind,
        to: ModeKind,
        at: DateTime<Utc>,
    },
    FocusStarted {
        task_id: String,
        ends_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    /// The focus timer ran out; the task should be marked completed.
    FocusCompleted {
        task_id: String,
        at: DateTime<Utc>,
    },
    /// Focus stopped early by switching OFF.
    FocusAbandoned {
        task_id: String,
        remaining_secs: i64,
        at: DateTime<Utc>,
    },
    /// ON mode sat idle past the fallback deadline.
    IdleFallback {
        at: DateTime<Utc>,
    },
}
