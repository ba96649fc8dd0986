//! Focus session state machine.
//!
//! The session is wall-clock based and has no internal timer: the caller
//! passes `now` to every method and calls [`FocusSession::tick`] whenever it
//! wants pending transitions applied.
//!
//! ```text
//! Off --switch_on--> On --start_focus--> Focusing
//!  ^                 |                      |
//!  +---idle fallback-+                      |
//!  +-----------timer elapsed / switch_off---+
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::error::SessionError;
use crate::events::SessionEvent;

/// Mode without its payload, for events and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Off,
    On,
    Focusing,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModeKind::Off => "off",
            ModeKind::On => "on",
            ModeKind::Focusing => "focusing",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SessionMode {
    /// Resting
    Off,
    /// Looking for something to do
    On { idle_deadline: DateTime<Utc> },
    /// Focus timer running for a task
    Focusing {
        task_id: String,
        started_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },
}

impl SessionMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            SessionMode::Off => ModeKind::Off,
            SessionMode::On { .. } => ModeKind::On,
            SessionMode::Focusing { .. } => ModeKind::Focusing,
        }
    }
}

/// Timer lengths, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub focus_minutes: u32,
    pub idle_fallback_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            idle_fallback_minutes: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSession {
    mode: SessionMode,
    #[serde(default)]
    config: SessionConfig,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl FocusSession {
    /// New session in `Off` mode.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            mode: SessionMode::Off,
            config,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace timer lengths; a running timer keeps its end time.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    pub fn focus_length(&self) -> Duration {
        Duration::minutes(self.config.focus_minutes as i64)
    }

    /// Time left on the focus timer, `None` when not focusing.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match &self.mode {
            SessionMode::Focusing { ends_at, .. } => Some((*ends_at - now).max(Duration::zero())),
            _ => None,
        }
    }

    /// 0.0 .. 1.0 progress of the focus timer; 0.0 when not focusing.
    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        match &self.mode {
            SessionMode::Focusing {
                started_at, ends_at, ..
            } => {
                let total = (*ends_at - *started_at).num_milliseconds();
                if total <= 0 {
                    return 1.0;
                }
                let elapsed = (now - *started_at).num_milliseconds();
                (elapsed as f64 / total as f64).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Off → On, arming the idle fallback. No-op in other modes.
    pub fn switch_on(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        if self.mode != SessionMode::Off {
            return None;
        }
        let idle_deadline = now + Duration::minutes(self.config.idle_fallback_minutes as i64);
        Some(self.enter(SessionMode::On { idle_deadline }, now))
    }

    /// Any mode → Off, cancelling the focus timer and the fallback.
    pub fn switch_off(&mut self, now: DateTime<Utc>) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let SessionMode::Focusing { task_id, ends_at, .. } = &self.mode {
            events.push(SessionEvent::FocusAbandoned {
                task_id: task_id.clone(),
                remaining_secs: (*ends_at - now).num_seconds().max(0),
                at: now,
            });
        }
        if self.mode != SessionMode::Off {
            events.push(self.enter(SessionMode::Off, now));
        }
        events
    }

    /// On/Off → Focusing for `task_id`, clearing the idle fallback.
    pub fn start_focus(
        &mut self,
        task_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<SessionEvent, SessionError> {
        if let SessionMode::Focusing { task_id, .. } = &self.mode {
            return Err(SessionError::AlreadyFocusing {
                task_id: task_id.clone(),
            });
        }
        let task_id = task_id.into();
        let ends_at = now + self.focus_length();
        self.enter(
            SessionMode::Focusing {
                task_id: task_id.clone(),
                started_at: now,
                ends_at,
            },
            now,
        );
        debug!(%task_id, %ends_at, "focus started");
        Ok(SessionEvent::FocusStarted {
            task_id,
            ends_at,
            at: now,
        })
    }

    /// Apply elapsed timers.
    ///
    /// A finished focus timer emits `FocusCompleted`; an expired idle
    /// fallback emits `IdleFallback`. Either way the session ends up Off.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SessionEvent> {
        match &self.mode {
            SessionMode::Focusing { task_id, ends_at, .. } if now >= *ends_at => {
                let event = SessionEvent::FocusCompleted {
                    task_id: task_id.clone(),
                    at: *ends_at,
                };
                self.mode = SessionMode::Off;
                debug!(?event, "focus timer elapsed");
                Some(event)
            }
            SessionMode::On { idle_deadline } if now >= *idle_deadline => {
                let event = SessionEvent::IdleFallback { at: *idle_deadline };
                self.mode = SessionMode::Off;
                debug!("idle fallback to off");
                Some(event)
            }
            _ => None,
        }
    }

    fn enter(&mut self, mode: SessionMode, now: DateTime<Utc>) -> SessionEvent {
        let from = self.mode.kind();
        let to = mode.kind();
        self.mode = mode;
        SessionEvent::ModeChanged { from, to, at: now }
    }
}
