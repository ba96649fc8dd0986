//! Bounded conflict avoidance for fixed-length sessions.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::calendar::BookedInterval;
use crate::error::ScheduleError;

/// Default number of forward steps: seven days of 2-hour steps.
pub const DEFAULT_MAX_STEPS: u32 = 84;

/// Default session length in hours.
pub const DEFAULT_SESSION_HOURS: i64 = 2;

/// Conflict resolver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Length of the session being placed; also the step size
    pub session: Duration,
    /// Maximum number of forward steps before giving up
    pub max_steps: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            session: Duration::hours(DEFAULT_SESSION_HOURS),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Moves a proposed session forward until it overlaps no booked interval.
#[derive(Debug, Clone, Default)]
pub struct ConflictResolver {
    config: ResolverConfig,
}

impl ConflictResolver {
    /// Create a resolver with the default 2-hour session and 84 steps
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Whether `[start, start + session)` overlaps any booked interval.
    pub fn conflicts(&self, start: DateTime<Utc>, booked: &[BookedInterval]) -> bool {
        let end = start + self.config.session;
        booked.iter().any(|b| b.overlaps(start, end))
    }

    /// Earliest conflict-free start reachable from `proposed` in whole
    /// session-length steps.
    ///
    /// Returns `proposed` unchanged when it is already free. Fails with
    /// [`ScheduleError::NoSlotAvailable`] after `max_steps` advances.
    pub fn avoid_conflict(
        &self,
        proposed: DateTime<Utc>,
        booked: &[BookedInterval],
    ) -> Result<DateTime<Utc>, ScheduleError> {
        let mut candidate = proposed;
        for step in 0..=self.config.max_steps {
            if !self.conflicts(candidate, booked) {
                if step > 0 {
                    debug!(%proposed, %candidate, step, "moved session past booked blocks");
                }
                return Ok(candidate);
            }
            candidate += self.config.session;
        }
        warn!(%proposed, steps = self.config.max_steps, "no free slot within search bound");
        Err(ScheduleError::NoSlotAvailable {
            proposed,
            steps: self.config.max_steps,
        })
    }
}

/// [`ConflictResolver::avoid_conflict`] with the default configuration.
pub fn avoid_conflict(
    proposed: DateTime<Utc>,
    booked: &[BookedInterval],
) -> Result<DateTime<Utc>, ScheduleError> {
    ConflictResolver::new().avoid_conflict(proposed, booked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, 0, 0).unwrap()
    }

    fn booked(start: u32, end: u32) -> BookedInterval {
        BookedInterval::new(at(start), at(end)).unwrap()
    }

    #[test]
    fn free_slot_is_returned_unchanged() {
        assert_eq!(avoid_conflict(at(9), &[]).unwrap(), at(9));
        assert_eq!(avoid_conflict(at(9), &[booked(13, 15)]).unwrap(), at(9));
    }

    #[test]
    fn conflict_steps_two_hours() {
        assert_eq!(avoid_conflict(at(9), &[booked(9, 11)]).unwrap(), at(11));
    }

    #[test]
    fn adjacent_blocks_do_not_conflict() {
        // Session [9, 11) touches [11, 12) and [7, 9) without overlap
        assert_eq!(avoid_conflict(at(9), &[booked(11, 12), booked(7, 9)]).unwrap(), at(9));
    }

    #[test]
    fn enclosing_and_enclosed_blocks_conflict() {
        // Block strictly inside the session
        assert_eq!(avoid_conflict(at(9), &[booked(10, 11)]).unwrap(), at(11));
        // Block enclosing the session
        assert_eq!(avoid_conflict(at(9), &[booked(8, 14)]).unwrap(), at(15));
    }

    #[test]
    fn chains_through_consecutive_blocks() {
        let blocks = [booked(9, 11), booked(11, 13), booked(13, 14)];
        assert_eq!(avoid_conflict(at(9), &blocks).unwrap(), at(15));
    }

    #[test]
    fn exhausted_search_fails() {
        let resolver = ConflictResolver::with_config(ResolverConfig {
            max_steps: 3,
            ..ResolverConfig::default()
        });
        let wall = BookedInterval::new(at(0), at(0) + Duration::days(2)).unwrap();
        let err = resolver.avoid_conflict(at(9), &[wall]).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::NoSlotAvailable {
                proposed: at(9),
                steps: 3
            }
        );
    }

    #[test]
    fn zero_steps_checks_only_the_proposal() {
        let resolver = ConflictResolver::with_config(ResolverConfig {
            max_steps: 0,
            ..ResolverConfig::default()
        });
        assert_eq!(resolver.avoid_conflict(at(9), &[]).unwrap(), at(9));
        assert!(resolver.avoid_conflict(at(9), &[booked(9, 10)]).is_err());
    }

    #[test]
    fn last_allowed_step_still_succeeds() {
        let resolver = ConflictResolver::with_config(ResolverConfig {
            max_steps: 2,
            ..ResolverConfig::default()
        });
        assert_eq!(resolver.avoid_conflict(at(9), &[booked(9, 13)]).unwrap(), at(13));
    }
}
