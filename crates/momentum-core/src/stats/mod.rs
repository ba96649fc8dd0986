//! Statistics over the task history
//!
//! This module provides the dashboard analyses: behavior type diagnosis,
//! weekly achievements and the hourly motivation wave.

mod user_type;
mod wave;
mod weekly;

pub use user_type::{analyze_user_type, UserType, UserTypeReport};
pub use wave::{analyze_wave, HourlyMotivation, MotivationWave};
pub use weekly::{analyze_weekly, WeeklyAchievements};
