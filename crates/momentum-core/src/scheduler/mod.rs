//! Slot planning for deferred tasks.
//!
//! - [`ConflictResolver`] moves a fixed-length session past booked intervals
//! - [`ReschedulePlanner`] picks a candidate slot from the deadline horizon
//!   and the task's emotion ratings, then resolves conflicts

mod conflict;
mod reschedule;

pub use conflict::{
    avoid_conflict, ConflictResolver, ResolverConfig, DEFAULT_MAX_STEPS, DEFAULT_SESSION_HOURS,
};
pub use reschedule::{
    days_until, reschedule, RescheduleOutcome, ReschedulePlanner, RescheduleReason, RescheduleTier,
    UrgentDay,
};
