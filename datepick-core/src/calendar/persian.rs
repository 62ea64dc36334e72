//! The Persian (Solar Hijri) calendar.
//!
//! Leap years follow the 33-year arithmetic cycle, which agrees with the
//! astronomical calendar for the years people actually pick. Conversions are
//! done on day numbers counted from 1 Farvardin 1403 (2024-03-20).

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Weekday};

use super::names::{PERSIAN_MONTHS, PERSIAN_WEEKDAYS};
use super::{Calendar, CalendarDate, CalendarSystem, last_supported_date};

const ANCHOR_YEAR: i64 = 1403;
/// `num_days_from_ce` of 2024-03-20, which is 1 Farvardin 1403.
const ANCHOR_DAY: i64 = 738_965;

const CYCLE_YEARS: i64 = 33;
const LEAPS_PER_CYCLE: i64 = 8;

/// Days in the six 31-day months at the start of the year.
const FIRST_HALF_DAYS: i64 = 186;

#[derive(Debug, Clone, Copy, Default)]
pub struct Persian;

fn is_leap(year: i64) -> bool {
    (25 * year + 11).rem_euclid(CYCLE_YEARS) < LEAPS_PER_CYCLE
}

/// Leap years in 1..=n, extended to any integer so differences stay exact.
fn leaps_through(n: i64) -> i64 {
    let partial = (1..=n.rem_euclid(CYCLE_YEARS)).filter(|y| is_leap(*y)).count() as i64;
    LEAPS_PER_CYCLE * n.div_euclid(CYCLE_YEARS) + partial
}

/// Day number of 1 Farvardin of `year`.
fn year_start(year: i64) -> i64 {
    ANCHOR_DAY + 365 * (year - ANCHOR_YEAR) + leaps_through(year - 1) - leaps_through(ANCHOR_YEAR - 1)
}

fn day_of_year_offset(month: u32, day: u32) -> i64 {
    let month = month as i64;
    let before = if month <= 6 {
        (month - 1) * 31
    } else {
        FIRST_HALF_DAYS + (month - 7) * 30
    };
    before + day as i64 - 1
}

impl Calendar for Persian {
    fn system(&self) -> CalendarSystem {
        CalendarSystem::Persian
    }

    fn to_calendar_date(&self, date: NaiveDate) -> CalendarDate {
        let day_number = date.num_days_from_ce() as i64;

        // Mean year length 365.2424 days gets within one year; walk the rest
        let mut year = ANCHOR_YEAR + ((day_number - ANCHOR_DAY) * 10_000).div_euclid(3_652_424);
        while year_start(year) > day_number {
            year -= 1;
        }
        while year_start(year + 1) <= day_number {
            year += 1;
        }

        let offset = day_number - year_start(year);
        let (month, day) = if offset < FIRST_HALF_DAYS {
            (offset / 31 + 1, offset % 31 + 1)
        } else {
            let rest = offset - FIRST_HALF_DAYS;
            (rest / 30 + 7, rest % 30 + 1)
        };

        CalendarDate::new(year as i32, month as u32, day as u32)
    }

    fn from_calendar_date(&self, year: i32, month: u32, day: u32) -> Option<NaiveDate> {
        if !self.year_range().contains(&year) || day == 0 || day > self.days_in_month(year, month) {
            return None;
        }

        let day_number = year_start(year as i64) + day_of_year_offset(month, day);
        let date = NaiveDate::from_num_days_from_ce_opt(i32::try_from(day_number).ok()?)?;
        self.date_range().contains(&date).then_some(date)
    }

    fn is_leap_year(&self, year: i32) -> bool {
        is_leap(year as i64)
    }

    fn days_in_month(&self, year: i32, month: u32) -> u32 {
        match month {
            1..=6 => 31,
            7..=11 => 30,
            12 if self.is_leap_year(year) => 30,
            12 => 29,
            _ => 0,
        }
    }

    fn year_range(&self) -> RangeInclusive<i32> {
        // 9999-12-31 falls in Dey 9378
        1..=9378
    }

    fn date_range(&self) -> RangeInclusive<NaiveDate> {
        let first = i32::try_from(year_start(1))
            .ok()
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .unwrap_or(NaiveDate::MIN);
        first..=last_supported_date()
    }

    fn weekday_index(&self, weekday: Weekday) -> u32 {
        // Saturday starts the week
        (weekday.num_days_from_sunday() + 1) % 7
    }

    fn is_holiday(&self, weekday_index: u32) -> bool {
        // Friday
        weekday_index == 6
    }

    fn month_names(&self) -> &'static [&'static str; 12] {
        &PERSIAN_MONTHS
    }

    fn weekday_names(&self) -> &'static [&'static str; 7] {
        &PERSIAN_WEEKDAYS
    }
}
