//! Calendar blocks and the absolute intervals used for conflict checks.
//!
//! A [`TimeBlock`] lives on one calendar day and is expressed in minutes
//! since midnight. The conflict resolver works on [`BookedInterval`]s,
//! absolute `[start, end)` instants; [`to_booked_intervals`] converts between
//! the two in the user's time zone.

mod views;

pub use views::{
    expand_recurring, infer_block_type, month_grid, start_of_week, suggest_on_off, week_view,
    DayView, MonthCell, OnOffWindows,
};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::task::record::parse_instant;
use crate::time::{local_instant, MINUTES_PER_DAY};

/// Kind of committed time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    /// Lectures and other fixed commitments
    Class,
    /// ON time: available for focused work
    On,
    /// OFF time: rest
    Off,
    /// Paid work, and sessions booked by the planner
    Work,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Class => "class",
            BlockType::On => "on",
            BlockType::Off => "off",
            BlockType::Work => "work",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BlockType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "class" => Ok(BlockType::Class),
            "on" => Ok(BlockType::On),
            "off" => Ok(BlockType::Off),
            "work" => Ok(BlockType::Work),
            other => Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("unknown block type {other:?}"),
            }),
        }
    }
}

/// A committed interval of a single calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawTimeBlock")]
pub struct TimeBlock {
    pub id: String,
    /// Calendar day, serialized as an unpadded `Y-M-D` key
    #[serde(with = "day_key")]
    pub date: NaiveDate,
    /// Minutes since midnight
    pub start: u16,
    /// Minutes since midnight, exclusive
    pub end: u16,
    pub label: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub recurring: bool,
}

impl TimeBlock {
    /// Create a block, checking `start < end <= 1440`.
    pub fn new(
        date: NaiveDate,
        start: u16,
        end: u16,
        label: impl Into<String>,
        block_type: BlockType,
    ) -> Result<Self, ValidationError> {
        check_minutes(start as i64, end as i64)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            date,
            start,
            end,
            label: label.into(),
            block_type,
            recurring: false,
        })
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end - self.start
    }

    /// Half-open overlap with another minute range on the same day.
    pub fn overlaps_minutes(&self, start: u16, end: u16) -> bool {
        self.start < end && start < self.end
    }

    /// The absolute interval this block occupies in `tz`.
    pub fn to_interval<Tz: TimeZone>(&self, tz: &Tz) -> BookedInterval {
        BookedInterval {
            start: local_instant(tz, self.date, self.start as u32),
            end: local_instant(tz, self.date, self.end as u32),
        }
    }
}

/// Unchecked wire form of [`TimeBlock`].
#[derive(Deserialize)]
struct RawTimeBlock {
    id: String,
    #[serde(with = "day_key")]
    date: NaiveDate,
    start: i64,
    end: i64,
    label: String,
    #[serde(rename = "type")]
    block_type: BlockType,
    #[serde(default)]
    recurring: bool,
}

impl TryFrom<RawTimeBlock> for TimeBlock {
    type Error = ValidationError;

    fn try_from(raw: RawTimeBlock) -> Result<Self, Self::Error> {
        check_minutes(raw.start, raw.end)?;
        Ok(Self {
            id: raw.id,
            date: raw.date,
            start: raw.start as u16,
            end: raw.end as u16,
            label: raw.label,
            block_type: raw.block_type,
            recurring: raw.recurring,
        })
    }
}

fn check_minutes(start: i64, end: i64) -> Result<(), ValidationError> {
    let day = 0..=MINUTES_PER_DAY as i64;
    for (field, value) in [("start", start), ("end", end)] {
        if !day.contains(&value) {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min: 0,
                max: MINUTES_PER_DAY as i64,
            });
        }
    }
    if start >= end {
        return Err(ValidationError::InvalidTimeRange { start, end });
    }
    Ok(())
}

/// An already-booked absolute interval `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", try_from = "RawInterval")]
pub struct BookedInterval {
    #[serde(rename = "startTime")]
    pub start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    pub end: DateTime<Utc>,
}

impl BookedInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidInstantRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Half-open overlap test against `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && self.start < end
    }
}

#[derive(Deserialize)]
struct RawInterval {
    #[serde(rename = "startTime")]
    start: DateTime<Utc>,
    #[serde(rename = "endTime")]
    end: DateTime<Utc>,
}

impl TryFrom<RawInterval> for BookedInterval {
    type Error = ValidationError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        BookedInterval::new(raw.start, raw.end)
    }
}

/// Booked-block record as stored by calendar clients.
///
/// Either absolute instants or a day key with minute offsets. Records that
/// carry both forms are read as absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BlockRecord {
    Absolute {
        #[serde(rename = "startTime")]
        start_time: String,
        #[serde(rename = "endTime")]
        end_time: String,
    },
    DayOffset {
        date: String,
        start: i64,
        end: i64,
    },
}

impl BlockRecord {
    /// Validate and convert to an absolute interval, resolving day offsets in `tz`.
    pub fn to_interval<Tz: TimeZone>(&self, tz: &Tz) -> Result<BookedInterval, ValidationError> {
        match self {
            BlockRecord::Absolute {
                start_time,
                end_time,
            } => BookedInterval::new(
                parse_instant("startTime", start_time)?,
                parse_instant("endTime", end_time)?,
            ),
            BlockRecord::DayOffset { date, start, end } => {
                let date = day_key::parse(date)?;
                check_minutes(*start, *end)?;
                BookedInterval::new(
                    local_instant(tz, date, *start as u32),
                    local_instant(tz, date, *end as u32),
                )
            }
        }
    }
}

/// Convert calendar blocks into absolute intervals in `tz`.
pub fn to_booked_intervals<Tz: TimeZone>(blocks: &[TimeBlock], tz: &Tz) -> Vec<BookedInterval> {
    blocks.iter().map(|b| b.to_interval(tz)).collect()
}

/// `Y-M-D` day keys without zero padding, e.g. `2026-3-7`.
pub mod day_key {
    use chrono::{Datelike, NaiveDate};
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::error::ValidationError;

    pub fn format(date: NaiveDate) -> String {
        format!("{}-{}-{}", date.year(), date.month(), date.day())
    }

    /// Parse a day key; zero-padded keys are accepted too.
    pub fn parse(key: &str) -> Result<NaiveDate, ValidationError> {
        let invalid = || ValidationError::InvalidValue {
            field: "date".to_string(),
            message: format!("expected Y-M-D, got {key:?}"),
        };
        let mut parts = key.trim().splitn(3, '-');
        let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }
}
