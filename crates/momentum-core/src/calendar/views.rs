//! Day, week and month projections over calendar blocks.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{day_key, BlockType, TimeBlock};
use crate::error::ValidationError;
use crate::time::parse_hhmm;

/// Guess a block type from its free-text label.
///
/// Checked in order: "on", "off", work ("work"/"バイト"), class
/// ("class"/"授業"). Anything else is a class.
pub fn infer_block_type(label: &str) -> BlockType {
    let s = label.to_lowercase();
    if s.contains("on") {
        BlockType::On
    } else if s.contains("off") {
        BlockType::Off
    } else if s.contains("work") || s.contains("バイト") {
        BlockType::Work
    } else {
        BlockType::Class
    }
}

/// Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Blocks of a single day, ordered by start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayView {
    #[serde(with = "day_key")]
    pub date: NaiveDate,
    pub blocks: Vec<TimeBlock>,
}

impl DayView {
    pub fn build(date: NaiveDate, blocks: &[TimeBlock]) -> Self {
        let mut day: Vec<TimeBlock> = blocks.iter().filter(|b| b.date == date).cloned().collect();
        day.sort_by_key(|b| (b.start, b.end));
        Self { date, blocks: day }
    }

    pub fn busy_minutes(&self) -> u32 {
        self.blocks.iter().map(|b| b.duration_minutes() as u32).sum()
    }
}

/// Seven day views starting on the Sunday of `date`'s week.
pub fn week_view(date: NaiveDate, blocks: &[TimeBlock]) -> Vec<DayView> {
    let sunday = start_of_week(date);
    (0..7)
        .map(|i| DayView::build(sunday + Duration::days(i), blocks))
        .collect()
}

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonthCell {
    #[serde(with = "day_key")]
    pub date: NaiveDate,
    /// Whether the day belongs to the requested month
    pub in_month: bool,
    pub count: usize,
}

/// 6x7 grid for the month containing `date`, starting on the Sunday on or
/// before the 1st.
pub fn month_grid(date: NaiveDate, blocks: &[TimeBlock]) -> Vec<MonthCell> {
    let first = date.with_day(1).unwrap_or(date);
    let start = start_of_week(first);
    (0..42)
        .map(|i| {
            let day = start + Duration::days(i);
            MonthCell {
                date: day,
                in_month: day.month() == first.month(),
                count: blocks.iter().filter(|b| b.date == day).count(),
            }
        })
        .collect()
}

/// Create one block per selected weekday (0 = Sunday) in the week of `week_of`.
///
/// Every created block is flagged `recurring`.
pub fn expand_recurring(
    week_of: NaiveDate,
    start: u16,
    end: u16,
    label: &str,
    block_type: BlockType,
    weekdays: &[u32],
) -> Result<Vec<TimeBlock>, ValidationError> {
    if let Some(&bad) = weekdays.iter().find(|&&d| d > 6) {
        return Err(ValidationError::OutOfRange {
            field: "weekday".to_string(),
            value: bad as i64,
            min: 0,
            max: 6,
        });
    }
    let sunday = start_of_week(week_of);
    let mut created = Vec::new();
    for offset in 0..7u32 {
        if !weekdays.contains(&offset) {
            continue;
        }
        let mut block = TimeBlock::new(
            sunday + Duration::days(offset as i64),
            start,
            end,
            label,
            block_type,
        )?;
        block.recurring = true;
        created.push(block);
    }
    Ok(created)
}

/// ON and OFF windows in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnOffWindows {
    pub on: (u16, u16),
    pub off: (u16, u16),
}

impl OnOffWindows {
    /// Parse `HH:MM` bounds.
    pub fn parse(
        on_start: &str,
        on_end: &str,
        off_start: &str,
        off_end: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            on: (parse_hhmm("on_start", on_start)?, parse_hhmm("on_end", on_end)?),
            off: (parse_hhmm("off_start", off_start)?, parse_hhmm("off_end", off_end)?),
        })
    }
}

impl Default for OnOffWindows {
    fn default() -> Self {
        Self {
            on: (12 * 60, 13 * 60),
            off: (16 * 60 + 30, 18 * 60),
        }
    }
}

/// Suggest the ON and OFF windows as blocks for `date`.
///
/// A window is suggested only when it overlaps no existing block of that day.
pub fn suggest_on_off(
    date: NaiveDate,
    windows: &OnOffWindows,
    blocks: &[TimeBlock],
) -> Result<Vec<TimeBlock>, ValidationError> {
    let day: Vec<&TimeBlock> = blocks.iter().filter(|b| b.date == date).collect();
    let mut suggestions = Vec::new();
    for ((start, end), label, block_type) in [
        (windows.on, "ON", BlockType::On),
        (windows.off, "OFF", BlockType::Off),
    ] {
        if day.iter().any(|b| b.overlaps_minutes(start, end)) {
            continue;
        }
        suggestions.push(TimeBlock::new(date, start, end, label, block_type)?);
    }
    Ok(suggestions)
}
