//! The proleptic Gregorian calendar, backed directly by chrono.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Weekday};

use super::names::{GREGORIAN_MONTHS, GREGORIAN_WEEKDAYS};
use super::{Calendar, CalendarDate, CalendarSystem, last_supported_date};

#[derive(Debug, Clone, Copy, Default)]
pub struct Gregorian;

impl Calendar for Gregorian {
    fn system(&self) -> CalendarSystem {
        CalendarSystem::Gregorian
    }

    fn to_calendar_date(&self, date: NaiveDate) -> CalendarDate {
        CalendarDate::new(date.year(), date.month(), date.day())
    }

    fn from_calendar_date(&self, year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        if !self.year_range().contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day)
    }

    fn is_leap_year(&self, year: i32) -> bool {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }

    fn days_in_month(&self, year: i32, month: u32) -> u32 {
        match month {
            1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
            4 | 6 | 9 | 11 => 30,
            2 if self.is_leap_year(year) => 29,
            2 => 28,
            _ => 0,
        }
    }

    fn year_range(&self) -> RangeInclusive<i32> {
        1..=9999
    }

    fn date_range(&self) -> RangeInclusive<NaiveDate> {
        NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)..=last_supported_date()
    }

    fn weekday_index(&self, weekday: Weekday) -> u32 {
        weekday.num_days_from_sunday()
    }

    fn is_holiday(&self, weekday_index: u32) -> bool {
        // Sunday and Saturday
        matches!(weekday_index, 0 | 6)
    }

    fn month_names(&self) -> &'static [&'static str; 12] {
        &GREGORIAN_MONTHS
    }

    fn weekday_names(&self) -> &'static [&'static str; 7] {
        &GREGORIAN_WEEKDAYS
    }
}
