//! Local-time helpers shared by the planner and the calendar.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::ValidationError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Resolve a wall-clock time on `date` in `tz` to an absolute instant.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant. Times that
/// do not exist (DST spring-forward gap) move forward by one hour.
pub fn local_instant<Tz: TimeZone>(tz: &Tz, date: NaiveDate, minutes: u32) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN) + Duration::minutes(minutes as i64);
    resolve(tz, naive)
}

/// Resolve `date` at `hour:00:00` local time.
pub fn at_local_hour<Tz: TimeZone>(tz: &Tz, date: NaiveDate, hour: u32) -> DateTime<Utc> {
    local_instant(tz, date, hour * 60)
}

fn resolve<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        // Only reachable for offsets with gaps longer than an hour.
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

/// Parse `HH:MM` into minutes since midnight.
pub fn parse_hhmm(field: &str, value: &str) -> Result<u16, ValidationError> {
    let invalid = || ValidationError::InvalidValue {
        field: field.to_string(),
        message: format!("expected HH:MM, got {value:?}"),
    };
    let (h, m) = value.trim().split_once(':').ok_or_else(invalid)?;
    let hour: u16 = h.parse().map_err(|_| invalid())?;
    let minute: u16 = m.parse().map_err(|_| invalid())?;
    if hour > 24 || minute >= 60 || hour * 60 + minute > MINUTES_PER_DAY {
        return Err(invalid());
    }
    Ok(hour * 60 + minute)
}

/// Format minutes since midnight as `HH:MM`.
pub fn format_hhmm(minutes: u16) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn local_instant_applies_offset() {
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let at = local_instant(&jst, date, 9 * 60);
        assert_eq!(at.to_rfc3339(), "2026-03-02T00:00:00+00:00");
    }

    #[test]
    fn end_of_day_rolls_to_next_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let at = local_instant(&Utc, date, MINUTES_PER_DAY as u32);
        assert_eq!(at.to_rfc3339(), "2026-03-03T00:00:00+00:00");
    }

    #[test]
    fn parses_and_formats_hhmm() {
        assert_eq!(parse_hhmm("on_start", "16:30").unwrap(), 990);
        assert_eq!(parse_hhmm("on_start", "24:00").unwrap(), 1440);
        assert!(parse_hhmm("on_start", "24:30").is_err());
        assert!(parse_hhmm("on_start", "9").is_err());
        assert_eq!(format_hhmm(990), "16:30");
    }
}
