//! # Momentum Core Library
//!
//! This library provides the core logic for Momentum, a task manager that
//! decides what to do next from how each task feels. It follows a CLI-first
//! philosophy: every operation is available through the `momentum` binary,
//! which is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Proposal**: scores tasks by deadline urgency, the emotion matrix and
//!   the local time of day, and picks one
//! - **Scheduler**: plans a future slot for a deferred task and moves it past
//!   already-booked calendar blocks with a bounded search
//! - **Session**: a wall-clock ON/OFF/focus state machine that requires the
//!   caller to periodically invoke `tick()`
//! - **Calendar** and **Stats**: views and analyses over stored data
//! - **Storage**: SQLite task/calendar storage and TOML configuration
//!
//! ## Key Components
//!
//! - [`propose`]: pick the task to do now
//! - [`ReschedulePlanner`]: choose a slot for a deferred task
//! - [`ConflictResolver`]: bounded conflict avoidance
//! - [`FocusSession`]: focus timer and idle fallback
//! - [`Database`]: task and calendar persistence
//! - [`Config`]: application configuration management

pub mod calendar;
pub mod error;
pub mod events;
pub mod proposal;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod storage;
pub mod task;
pub mod time;

pub use calendar::{BlockRecord, BlockType, BookedInterval, TimeBlock};
pub use error::{
    ConfigError, CoreError, DatabaseError, ErrorKind, ScheduleError, SessionError, ValidationError,
};
pub use events::SessionEvent;
pub use proposal::{propose, propose_records, rank, score, ProposalReport, ScoreBreakdown};
pub use scheduler::{
    avoid_conflict, reschedule, ConflictResolver, RescheduleOutcome, ReschedulePlanner,
    RescheduleReason, RescheduleTier, ResolverConfig,
};
pub use session::{FocusSession, SessionConfig, SessionMode};
pub use storage::{Config, Database};
pub use task::{EmotionMatrix, Task, TaskRecord, TaskStatus, TaskTransitionError};
