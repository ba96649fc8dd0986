//! End-to-end deferral flow: stored calendar blocks feed the reschedule
//! planner, and the planned session is written back as a block.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use momentum_core::calendar::to_booked_intervals;
use momentum_core::scheduler::{UrgentDay, DEFAULT_MAX_STEPS};
use momentum_core::{
    avoid_conflict, reschedule, BlockType, BookedInterval, ConflictResolver, Database, EmotionMatrix,
    ErrorKind, RescheduleReason, RescheduleTier, ResolverConfig, Task, TaskStatus, TimeBlock,
};
use proptest::prelude::*;

fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn local(day: u32, hour: u32) -> DateTime<FixedOffset> {
    jst().with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
}

fn utc(day: u32, hour: u32) -> DateTime<Utc> {
    local(day, hour).with_timezone(&Utc)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn essay(deadline: DateTime<FixedOffset>, achievement: u8, resistance: u8) -> Task {
    Task::new(
        "Essay",
        deadline.with_timezone(&Utc),
        EmotionMatrix::new(achievement, resistance).unwrap(),
    )
}

#[test]
fn free_slot_passes_through() {
    let blocks = [BookedInterval::new(utc(2, 13), utc(2, 15)).unwrap()];
    assert_eq!(avoid_conflict(utc(2, 9), &blocks).unwrap(), utc(2, 9));
}

#[test]
fn lecture_pushes_session_to_its_end() {
    let blocks = [BookedInterval::new(utc(2, 9), utc(2, 11)).unwrap()];
    assert_eq!(avoid_conflict(utc(2, 9), &blocks).unwrap(), utc(2, 11));
}

#[test]
fn tiers_follow_days_until_deadline() {
    let now = local(2, 8);
    let cases = [
        (local(2, 20), RescheduleTier::Urgent),
        (local(3, 8), RescheduleTier::Urgent),
        (local(3, 9), RescheduleTier::Soon),
        (local(5, 8), RescheduleTier::Soon),
        (local(5, 9), RescheduleTier::Relaxed),
    ];
    for (deadline, tier) in cases {
        let out = reschedule(&essay(deadline, 50, 50), &now, &[]).unwrap();
        assert_eq!(out.tier, tier, "deadline {deadline}");
        assert_eq!(out.reason.tier(), tier);
        assert_eq!(out.ends_at - out.rescheduled_at, Duration::hours(2));
    }
}

#[test]
fn urgent_high_resistance_waits_until_afternoon() {
    let now = local(2, 7);
    let out = reschedule(&essay(local(2, 23), 50, 85), &now, &[]).unwrap();
    assert_eq!(out.rescheduled_at, utc(2, 14));
    assert_eq!(
        out.reason,
        RescheduleReason::Urgent {
            day: UrgentDay::Today,
            hour: 14
        }
    );
}

#[test]
fn stored_blocks_steer_the_deferral() {
    let db = Database::open_memory().unwrap();
    let now = local(2, 7);

    let mut task = essay(local(2, 22), 60, 20);
    db.save_task(&task).unwrap();

    // Lecture 9:00-10:30 and a shift 11:00-13:00 on the same day.
    let lecture = TimeBlock::new(date(2), 9 * 60, 10 * 60 + 30, "Lecture", BlockType::Class).unwrap();
    let shift = TimeBlock::new(date(2), 11 * 60, 13 * 60, "Shift", BlockType::Work).unwrap();
    db.save_block(&lecture).unwrap();
    db.save_block(&shift).unwrap();

    let blocks = db.blocks_between(date(1), date(3)).unwrap();
    let booked = to_booked_intervals(&blocks, &jst());
    let out = reschedule(&task, &now, &booked).unwrap();
    // 9:00 hits the lecture, 11:00 hits the shift, 13:00 is free.
    assert_eq!(out.rescheduled_at, utc(2, 13));

    task.postpone(out.rescheduled_at).unwrap();
    let bookings = out.bookings(&task, &jst()).unwrap();
    assert_eq!(bookings.len(), 1);
    let booking = &bookings[0];
    db.record_deferral(&task, &bookings).unwrap();

    let stored = db.get_task(&task.id).unwrap();
    assert_eq!(stored.status, TaskStatus::Postponed);
    assert_eq!(stored.rescheduled_to, Some(utc(2, 13)));

    let day = db.blocks_on(date(2)).unwrap();
    assert_eq!(day.len(), 3);
    let session = day.iter().find(|b| b.id == booking.id).unwrap();
    assert_eq!((session.start, session.end), (13 * 60, 15 * 60));
    assert_eq!(session.block_type, BlockType::Work);

    // A second deferral of another task now also avoids the booked session.
    let other = essay(local(2, 22), 60, 20);
    let booked = to_booked_intervals(&db.blocks_on(date(2)).unwrap(), &jst());
    let out = reschedule(&other, &now, &booked).unwrap();
    assert_eq!(out.rescheduled_at, utc(2, 15));
}

#[test]
fn late_deferral_books_past_midnight() {
    let db = Database::open_memory().unwrap();
    let now = local(2, 7);

    let mut task = essay(local(2, 20), 50, 30);
    db.save_task(&task).unwrap();
    let wall = TimeBlock::new(date(2), 8 * 60, 23 * 60, "Shift", BlockType::Work).unwrap();
    db.save_block(&wall).unwrap();

    let booked = to_booked_intervals(&db.all_blocks().unwrap(), &jst());
    let out = reschedule(&task, &now, &booked).unwrap();
    assert_eq!(out.rescheduled_at, utc(2, 23));

    task.postpone(out.rescheduled_at).unwrap();
    let bookings = out.bookings(&task, &jst()).unwrap();
    db.record_deferral(&task, &bookings).unwrap();
    assert_eq!(db.blocks_on(date(3)).unwrap().len(), 1);

    // The hour after midnight is taken by the first session.
    let booked = to_booked_intervals(&db.all_blocks().unwrap(), &jst());
    assert_eq!(avoid_conflict(utc(3, 0), &booked).unwrap(), utc(3, 2));
    assert!(booked.iter().any(|b| b.overlaps(utc(3, 0), utc(3, 1))));
}

#[test]
fn fully_booked_week_reports_no_slot() {
    let now = local(2, 7);
    let wall = BookedInterval::new(utc(1, 0), utc(1, 0) + Duration::days(10)).unwrap();
    let err = reschedule(&essay(local(2, 22), 50, 50), &now, &[wall]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoSlotAvailable);
}

#[test]
fn default_search_covers_seven_days() {
    let resolver = ConflictResolver::new();
    assert_eq!(resolver.config().max_steps, DEFAULT_MAX_STEPS);

    // Booked for exactly 7 days from the proposal: the last step lands free.
    let wall = BookedInterval::new(utc(2, 9), utc(2, 9) + Duration::days(7)).unwrap();
    assert_eq!(
        resolver.avoid_conflict(utc(2, 9), &[wall]).unwrap(),
        utc(9, 9)
    );

    // One more hour and the search gives up.
    let wall = BookedInterval::new(utc(2, 9), utc(2, 9) + Duration::days(7) + Duration::hours(1)).unwrap();
    assert!(resolver.avoid_conflict(utc(2, 9), &[wall]).is_err());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn resolved_slot_is_free_and_on_the_step_grid(
        proposed_hour in 0i64..48,
        blocks in prop::collection::vec((0i64..300, 1i64..300), 0..8),
        session_minutes in 30i64..240,
    ) {
        let origin = utc(2, 0);
        let booked: Vec<BookedInterval> = blocks
            .iter()
            .map(|(start, len)| {
                let s = origin + Duration::minutes(start * 10);
                BookedInterval::new(s, s + Duration::minutes(*len)).unwrap()
            })
            .collect();
        let resolver = ConflictResolver::with_config(ResolverConfig {
            session: Duration::minutes(session_minutes),
            max_steps: DEFAULT_MAX_STEPS,
        });
        let proposed = origin + Duration::hours(proposed_hour);

        match resolver.avoid_conflict(proposed, &booked) {
            Ok(slot) => {
                prop_assert!(slot >= proposed);
                prop_assert!(!resolver.conflicts(slot, &booked));
                let offset = (slot - proposed).num_minutes();
                prop_assert_eq!(offset % session_minutes, 0);
                prop_assert!(offset / session_minutes <= DEFAULT_MAX_STEPS as i64);
                // Every earlier grid point conflicted.
                let mut earlier = proposed;
                while earlier < slot {
                    prop_assert!(resolver.conflicts(earlier, &booked));
                    earlier += Duration::minutes(session_minutes);
                }
            }
            Err(_) => {
                for step in 0..=DEFAULT_MAX_STEPS as i64 {
                    let candidate = proposed + Duration::minutes(session_minutes * step);
                    prop_assert!(resolver.conflicts(candidate, &booked));
                }
            }
        }
    }

    #[test]
    fn rescheduling_never_touches_the_task(
        hours_left in -72i64..720,
        achievement in 0u8..=100,
        resistance in 0u8..=100,
        now_hour in 0u32..24,
    ) {
        let now = local(10, now_hour);
        let task = Task::new(
            "Essay",
            now.with_timezone(&Utc) + Duration::hours(hours_left),
            EmotionMatrix::new(achievement, resistance).unwrap(),
        );
        let before = task.clone();
        let first = reschedule(&task, &now, &[]).unwrap();
        let second = reschedule(&task, &now, &[]).unwrap();
        prop_assert_eq!(&task, &before);
        prop_assert_eq!(first, second);
    }
}
