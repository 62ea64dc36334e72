//! Calendar systems understood by the picker.
//!
//! Each calendar system is one implementation of the [`Calendar`] trait. The
//! engine only talks to the trait, so decomposition, composition, month
//! lengths and week conventions live in exactly one place per calendar.

mod gregorian;
mod names;
mod persian;

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::PickerError;

pub use gregorian::Gregorian;
pub use persian::Persian;

/// Number of columns in a month grid.
pub const DAYS_IN_WEEK: u32 = 7;

/// Last day any calendar composes to, 9999-12-31.
pub fn last_supported_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarSystem {
    #[default]
    Persian,
    Gregorian,
}

impl CalendarSystem {
    /// The calendar implementation for this system.
    pub fn calendar(self) -> &'static dyn Calendar {
        match self {
            CalendarSystem::Persian => &Persian,
            CalendarSystem::Gregorian => &Gregorian,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CalendarSystem::Persian => "persian",
            CalendarSystem::Gregorian => "gregorian",
        }
    }
}

impl fmt::Display for CalendarSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for CalendarSystem {
    type Err = PickerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "persian" | "jalali" | "shamsi" => Ok(CalendarSystem::Persian),
            "gregorian" => Ok(CalendarSystem::Gregorian),
            other => Err(PickerError::Parse(format!(
                "Unknown calendar '{other}'. Expected 'persian' or 'gregorian'"
            ))),
        }
    }
}

/// A (year, month, day) triple interpreted under some calendar system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        CalendarDate { year, month, day }
    }
}

impl FromStr for CalendarDate {
    type Err = PickerError;

    /// Parse "YYYY/MM/DD" or "YYYY-MM-DD". Fields are not checked against any calendar.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PickerError::InvalidDate(format!("'{s}'. Expected YYYY/MM/DD"));

        let parts: Vec<&str> = s.trim().split(['/', '-']).collect();
        let [year, month, day] = parts.as_slice() else {
            return Err(invalid());
        };

        Ok(CalendarDate {
            year: year.parse().map_err(|_| invalid())?,
            month: month.parse().map_err(|_| invalid())?,
            day: day.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

/// Capabilities every calendar system provides to the engine.
pub trait Calendar: Send + Sync {
    fn system(&self) -> CalendarSystem;

    /// Decompose an absolute date into this calendar's fields.
    fn to_calendar_date(&self, date: NaiveDate) -> CalendarDate;

    /// Compose an absolute date from this calendar's fields.
    ///
    /// Returns `None` when the fields do not name a real day (e.g. day 31 of a
    /// 30-day month) or fall outside [`Calendar::year_range`].
    fn from_calendar_date(&self, year: i32, month: u32, day: u32) -> Option<NaiveDate>;

    fn is_leap_year(&self, year: i32) -> bool;

    /// Number of days in `month` of `year`. Months outside 1..=12 have none.
    fn days_in_month(&self, year: i32, month: u32) -> u32;

    /// Years the picker offers. The last one may only compose up to the end
    /// of [`Calendar::date_range`].
    fn year_range(&self) -> RangeInclusive<i32>;

    /// Absolute dates this calendar composes to.
    fn date_range(&self) -> RangeInclusive<NaiveDate>;

    /// Column of `weekday` under this calendar's week-start convention (0..=6).
    fn weekday_index(&self, weekday: Weekday) -> u32;

    /// Whether the weekday at `index` is a weekly holiday.
    fn is_holiday(&self, weekday_index: u32) -> bool;

    fn month_names(&self) -> &'static [&'static str; 12];

    /// Short weekday names ordered from the first day of the week.
    fn weekday_names(&self) -> &'static [&'static str; 7];

    /// Weekday index of day 1 of the month.
    fn first_weekday_of_month(&self, year: i32, month: u32) -> u32 {
        self.from_calendar_date(year, month, 1)
            .map(|date| self.weekday_index(date.weekday()))
            .unwrap_or(0)
    }

    /// Name of `month` (1-based), empty for months outside 1..=12.
    fn month_name(&self, month: u32) -> &'static str {
        month
            .checked_sub(1)
            .and_then(|i| self.month_names().get(i as usize))
            .copied()
            .unwrap_or("")
    }

    /// Decompose `date` after clamping it into [`Calendar::date_range`].
    fn to_clamped_calendar_date(&self, date: NaiveDate) -> CalendarDate {
        let range = self.date_range();
        self.to_calendar_date(date.clamp(*range.start(), *range.end()))
    }
}

/// Day cells of a month laid out in weeks, padded at both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub weeks: Vec<[Option<u32>; DAYS_IN_WEEK as usize]>,
}

impl MonthGrid {
    pub fn build(first_weekday: u32, days_in_month: u32) -> Self {
        let mut weeks = Vec::new();
        let mut week = [None; DAYS_IN_WEEK as usize];
        let mut column = (first_weekday % DAYS_IN_WEEK) as usize;

        for day in 1..=days_in_month {
            week[column] = Some(day);
            column += 1;
            if column == DAYS_IN_WEEK as usize {
                weeks.push(week);
                week = [None; DAYS_IN_WEEK as usize];
                column = 0;
            }
        }

        if column > 0 {
            weeks.push(week);
        }

        MonthGrid { weeks }
    }

    /// Column (weekday index) that `day` falls in.
    pub fn column_of(&self, day: u32) -> Option<u32> {
        self.weeks.iter().find_map(|week| {
            week.iter()
                .position(|cell| *cell == Some(day))
                .map(|i| i as u32)
        })
    }
}
