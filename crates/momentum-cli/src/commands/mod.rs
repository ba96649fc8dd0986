pub mod calendar;
pub mod config;
pub mod defer;
pub mod focus;
pub mod propose;
pub mod stats;
pub mod task;

use chrono::{DateTime, FixedOffset, Local};
use momentum_core::ValidationError;

/// `--at` as an RFC 3339 instant, or the current local time.
///
/// The offset of the result is the time zone every local date and hour of
/// the command is taken in.
pub fn resolve_now(at: Option<&str>) -> Result<DateTime<FixedOffset>, ValidationError> {
    match at {
        Some(value) => DateTime::parse_from_rfc3339(value.trim()).map_err(|_| {
            ValidationError::InvalidTimestamp {
                field: "at".to_string(),
                value: value.to_string(),
            }
        }),
        None => Ok(Local::now().fixed_offset()),
    }
}
