//! Values exchanged between the engine and its host.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{PickerError, PickerResult};

/// Whether the bound value carries a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    DateTime,
    DateOnly,
}

impl FromStr for Mode {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "date_time" | "datetime" => Ok(Mode::DateTime),
            "date_only" | "date" => Ok(Mode::DateOnly),
            other => Err(PickerError::Parse(format!(
                "Unknown mode '{other}'. Expected 'date_time' or 'date_only'"
            ))),
        }
    }
}

/// Hour and minute on a naive local wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { hour: 0, minute: 0 };

    pub fn new(hour: u32, minute: u32) -> PickerResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(PickerError::InvalidTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(TimeOfDay { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    pub fn to_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or_default()
    }
}

impl From<NaiveTime> for TimeOfDay {
    /// Seconds and below are dropped.
    fn from(time: NaiveTime) -> Self {
        TimeOfDay {
            hour: time.hour(),
            minute: time.minute(),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .map_err(|_| PickerError::InvalidTime(format!("'{s}'. Expected HH:MM")))?;
        Ok(TimeOfDay::from(time))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// The externally visible value derived from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComposedValue {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl ComposedValue {
    /// Build a value for `mode`, dropping the time when it does not participate.
    pub fn compose(date: NaiveDate, time: TimeOfDay, mode: Mode) -> Self {
        match mode {
            Mode::DateTime => ComposedValue::DateTime(date.and_time(time.to_naive_time())),
            Mode::DateOnly => ComposedValue::Date(date),
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            ComposedValue::DateTime(dt) => dt.date(),
            ComposedValue::Date(d) => *d,
        }
    }

    /// Time of day, `None` for date-only values.
    pub fn time(&self) -> Option<TimeOfDay> {
        match self {
            ComposedValue::DateTime(dt) => Some(TimeOfDay::from(dt.time())),
            ComposedValue::Date(_) => None,
        }
    }

    /// Parse "YYYY-MM-DD", "YYYY-MM-DDTHH:MM" or "YYYY-MM-DD HH:MM" into a value for `mode`.
    pub fn parse(s: &str, mode: Mode) -> PickerResult<Self> {
        let s = s.trim();

        let (date, time) = if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            (date, TimeOfDay::MIDNIGHT)
        } else {
            let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
                .map_err(|_| {
                    PickerError::Parse(format!(
                        "Invalid date '{s}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM"
                    ))
                })?;
            (dt.date(), TimeOfDay::from(dt.time()))
        };

        Ok(ComposedValue::compose(date, time, mode))
    }
}

impl fmt::Display for ComposedValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComposedValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M")),
            ComposedValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}
