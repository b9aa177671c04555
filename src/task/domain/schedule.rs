//! Effort estimates and working-time unit conversion.

use super::ParseScheduleUnitError;
use serde::{Deserialize, Serialize};
use std::fmt;

const SECONDS_PER_MINUTE: u64 = 60;
const SECONDS_PER_HOUR: u64 = 3600;
const WEEKS_PER_MONTH: u64 = 4;

/// Unit an effort estimate is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ScheduleUnit {
    /// Minutes.
    #[serde(rename = "min")]
    Minute,
    /// Hours.
    #[serde(rename = "h")]
    Hour,
    /// Working days.
    #[serde(rename = "d")]
    Day,
    /// Working weeks.
    #[serde(rename = "w")]
    Week,
    /// Working months (four working weeks).
    #[serde(rename = "m")]
    Month,
    /// Working years.
    #[serde(rename = "y")]
    Year,
}

impl ScheduleUnit {
    /// Units from the largest to the smallest.
    pub const DESCENDING: [Self; 6] = [
        Self::Year,
        Self::Month,
        Self::Week,
        Self::Day,
        Self::Hour,
        Self::Minute,
    ];

    /// Returns the canonical unit code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minute => "min",
            Self::Hour => "h",
            Self::Day => "d",
            Self::Week => "w",
            Self::Month => "m",
            Self::Year => "y",
        }
    }
}

impl fmt::Display for ScheduleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ScheduleUnit {
    type Error = ParseScheduleUnitError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim() {
            "min" => Ok(Self::Minute),
            "h" => Ok(Self::Hour),
            "d" => Ok(Self::Day),
            "w" => Ok(Self::Week),
            "m" => Ok(Self::Month),
            "y" => Ok(Self::Year),
            _ => Err(ParseScheduleUnitError(value.to_owned())),
        }
    }
}

/// Effort estimate: a timing in a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Schedule {
    timing: u64,
    unit: ScheduleUnit,
}

impl Schedule {
    /// Creates an estimate.
    #[must_use]
    pub const fn new(timing: u64, unit: ScheduleUnit) -> Self {
        Self { timing, unit }
    }

    /// Creates an estimate expressed in hours.
    #[must_use]
    pub const fn hours(timing: u64) -> Self {
        Self::new(timing, ScheduleUnit::Hour)
    }

    /// Returns the numeric timing.
    #[must_use]
    pub const fn timing(self) -> u64 {
        self.timing
    }

    /// Returns the unit.
    #[must_use]
    pub const fn unit(self) -> ScheduleUnit {
        self.unit
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.timing, self.unit)
    }
}

/// Studio working calendar used to convert between units and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingTime {
    /// Working hours in a day.
    pub daily_working_hours: u32,
    /// Working days in a week.
    pub weekly_working_days: u32,
    /// Working days in a year.
    pub yearly_working_days: u32,
}

impl Default for WorkingTime {
    fn default() -> Self {
        Self {
            daily_working_hours: 9,
            weekly_working_days: 5,
            yearly_working_days: 261,
        }
    }
}

impl WorkingTime {
    /// Returns the number of seconds in one `unit`.
    #[must_use]
    pub const fn seconds_per(self, unit: ScheduleUnit) -> u64 {
        let day = SECONDS_PER_HOUR.saturating_mul(self.daily_working_hours as u64);
        let week = day.saturating_mul(self.weekly_working_days as u64);
        match unit {
            ScheduleUnit::Minute => SECONDS_PER_MINUTE,
            ScheduleUnit::Hour => SECONDS_PER_HOUR,
            ScheduleUnit::Day => day,
            ScheduleUnit::Week => week,
            ScheduleUnit::Month => week.saturating_mul(WEEKS_PER_MONTH),
            ScheduleUnit::Year => day.saturating_mul(self.yearly_working_days as u64),
        }
    }

    /// Converts an estimate to seconds.
    #[must_use]
    pub const fn to_seconds(self, schedule: Schedule) -> u64 {
        schedule
            .timing()
            .saturating_mul(self.seconds_per(schedule.unit()))
    }

    /// Expresses `seconds` in the largest unit that represents it exactly.
    ///
    /// Amounts that are not a whole number of hours are rounded up to whole
    /// minutes. Estimates stay positive: zero seconds becomes one minute.
    #[must_use]
    pub fn least_meaningful(self, seconds: u64) -> Schedule {
        if seconds == 0 {
            return Schedule::new(1, ScheduleUnit::Minute);
        }
        ScheduleUnit::DESCENDING
            .into_iter()
            .filter(|unit| *unit != ScheduleUnit::Minute)
            .find_map(|unit| {
                let size = self.seconds_per(unit);
                match (seconds.checked_rem(size), seconds.checked_div(size)) {
                    (Some(0), Some(timing)) if timing > 0 => Some(Schedule::new(timing, unit)),
                    _ => None,
                }
            })
            .unwrap_or_else(|| {
                Schedule::new(seconds.div_ceil(SECONDS_PER_MINUTE), ScheduleUnit::Minute)
            })
    }
}
