//! The date selection engine behind a picker widget.
//!
//! `DatePickerEngine` owns the (year, month, day, time) selection under one
//! calendar system, keeps the month-derived display facts current, and tells
//! its host about every change to the bound value. The popup open/close state
//! lives here too, together with the bridge calls that opening and closing
//! imply.

use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::NaiveDate;
use log::{debug, trace, warn};

use crate::bridge::{DetachedBridge, DismissHandle, PopupBridge};
use crate::calendar::{Calendar, CalendarDate, CalendarSystem, MonthGrid};
use crate::clock::{Clock, SystemClock};
use crate::config::PickerConfig;
use crate::identity::Identity;
use crate::listener::{ChangeListener, NoopListener};
use crate::value::{ComposedValue, Mode, TimeOfDay};

/// Key codes that commit the current selection and close the popup.
const COMMIT_KEYS: [&str; 2] = ["Enter", "NumpadEnter"];

const MAX_DAY: u32 = 31;

/// Facts derived from the selected year and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MonthFacts {
    days_in_month: u32,
    first_weekday: u32,
}

pub struct DatePickerEngine {
    calendar: &'static dyn Calendar,
    mode: Mode,

    selection: CalendarDate,
    time: TimeOfDay,
    facts: MonthFacts,

    is_open: bool,
    disabled: bool,
    activated: bool,

    identity: Identity,
    /// Whether the bridge currently holds a registration for `identity`.
    registered: bool,

    years_back: u32,
    years_forward: u32,

    clock: Box<dyn Clock>,
    listener: Box<dyn ChangeListener>,
    bridge: Arc<dyn PopupBridge>,
    dismiss_handle: DismissHandle,
}

impl DatePickerEngine {
    /// A closed, enabled engine seeded from the system clock.
    ///
    /// Nothing is emitted until [`DatePickerEngine::initialize`].
    pub fn new(system: CalendarSystem, mode: Mode) -> Self {
        let defaults = PickerConfig::default();
        let mut engine = DatePickerEngine {
            calendar: system.calendar(),
            mode,
            selection: CalendarDate::new(1, 1, 1),
            time: TimeOfDay::MIDNIGHT,
            facts: MonthFacts {
                days_in_month: 0,
                first_weekday: 0,
            },
            is_open: false,
            disabled: false,
            activated: false,
            identity: Identity::new(),
            registered: false,
            years_back: defaults.years_back,
            years_forward: defaults.years_forward,
            clock: Box::new(SystemClock),
            listener: Box::new(NoopListener),
            bridge: Arc::new(DetachedBridge),
            dismiss_handle: DismissHandle::detached(),
        };
        engine.seed_from_now();
        engine
    }

    pub fn from_config(config: &PickerConfig) -> Self {
        Self::new(config.calendar, config.mode).with_year_span(config.years_back, config.years_forward)
    }

    /// Replace the clock. Before activation this also re-seeds the selection.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        if !self.activated {
            self.seed_from_now();
        }
        self
    }

    pub fn with_listener(mut self, listener: impl ChangeListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn with_bridge(mut self, bridge: Arc<dyn PopupBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn with_dismiss_handle(mut self, handle: DismissHandle) -> Self {
        self.dismiss_handle = handle;
        self
    }

    pub fn with_year_span(mut self, years_back: u32, years_forward: u32) -> Self {
        self.years_back = years_back;
        self.years_forward = years_forward;
        self
    }

    // LIFECYCLE:

    /// First activation with the host's bound value (`None` when unset).
    ///
    /// Seeds the selection from `external`, or from now when unset, and
    /// emits exactly one change so a host without a value learns today's.
    /// Calling this again after activation behaves like
    /// [`DatePickerEngine::set_parameters`].
    pub fn initialize(&mut self, external: Option<ComposedValue>) {
        if self.activated {
            self.reseed(external);
            return;
        }

        match external {
            Some(value) => self.seed_from(value.date(), value.time()),
            None => self.seed_from_now(),
        }
        self.activated = true;
        debug!(
            "{} activated at {} ({})",
            self.identity,
            self.selection,
            self.calendar.system()
        );
        self.notify_change();
    }

    /// Host re-supplies its parameters.
    ///
    /// The selection is only re-seeded when `external` differs from the
    /// currently composed value, so a host echoing back what it was sent
    /// causes no further changes.
    pub fn set_parameters(&mut self, external: Option<ComposedValue>, disabled: bool) {
        self.disabled = disabled;
        if !self.activated {
            self.initialize(external);
            return;
        }
        self.reseed(external);
    }

    fn reseed(&mut self, external: Option<ComposedValue>) {
        // Unset means "no value supplied", keep the current selection
        let Some(value) = external else {
            return;
        };

        let normalized =
            ComposedValue::compose(value.date(), value.time().unwrap_or(self.time), self.mode);
        if Some(normalized) == self.composed_value() {
            return;
        }

        trace!("{} re-seeding from {}", self.identity, normalized);
        let target = self.calendar.to_clamped_calendar_date(value.date());
        self.apply_year(target.year);
        self.apply_month(target.month);
        self.apply_day(target.day);
        if let (Mode::DateTime, Some(time)) = (self.mode, value.time()) {
            self.apply_time(time);
        }
    }

    fn seed_from_now(&mut self) {
        let now = self.clock.now();
        self.seed_from(now.date(), Some(TimeOfDay::from(now.time())));
    }

    /// Silent seeding, used before activation.
    fn seed_from(&mut self, date: NaiveDate, time: Option<TimeOfDay>) {
        self.selection = self.calendar.to_clamped_calendar_date(date);
        if let Some(time) = time {
            self.time = time;
        }
        self.recompute();
    }

    // FIELD SETTERS:

    pub fn set_year(&mut self, year: i32) -> bool {
        !self.disabled && self.apply_year(year)
    }

    pub fn set_month(&mut self, month: u32) -> bool {
        !self.disabled && self.apply_month(month)
    }

    /// The day is not clamped to the month; see [`DatePickerEngine::composed_value`].
    pub fn set_day(&mut self, day: u32) -> bool {
        !self.disabled && self.apply_day(day)
    }

    pub fn set_time(&mut self, time: TimeOfDay) -> bool {
        !self.disabled && self.apply_time(time)
    }

    fn apply_year(&mut self, year: i32) -> bool {
        let range = self.calendar.year_range();
        let year = year.clamp(*range.start(), *range.end());
        let target = self.composable(CalendarDate { year, ..self.selection });
        if target == self.selection {
            return false;
        }
        self.selection = target;
        self.recompute();
        self.notify_change();
        true
    }

    fn apply_month(&mut self, month: u32) -> bool {
        let month = month.clamp(1, 12);
        let target = self.composable(CalendarDate { month, ..self.selection });
        if target == self.selection {
            return false;
        }
        self.selection = target;
        self.recompute();
        self.notify_change();
        true
    }

    fn apply_day(&mut self, day: u32) -> bool {
        let day = day.clamp(1, MAX_DAY);
        if day == self.selection.day {
            return false;
        }
        self.selection.day = day;
        self.notify_change();
        true
    }

    fn apply_time(&mut self, time: TimeOfDay) -> bool {
        if time == self.time {
            return false;
        }
        self.time = time;
        // Retained across modes, but only part of the value in DateTime mode
        if self.mode == Mode::DateTime {
            self.notify_change();
        }
        true
    }

    /// Pull a (year, month) that lies past either end of the calendar's date
    /// range back to the month at that end. The day is left alone.
    fn composable(&self, date: CalendarDate) -> CalendarDate {
        if self.calendar.from_calendar_date(date.year, date.month, 1).is_some() {
            return date;
        }
        let range = self.calendar.date_range();
        let first = self.calendar.to_calendar_date(*range.start());
        let edge = if (date.year, date.month) < (first.year, first.month) {
            first
        } else {
            self.calendar.to_calendar_date(*range.end())
        };
        CalendarDate { year: edge.year, month: edge.month, ..date }
    }

    fn recompute(&mut self) {
        let CalendarDate { year, month, .. } = self.selection;
        self.facts = MonthFacts {
            days_in_month: self.calendar.days_in_month(year, month),
            first_weekday: self.calendar.first_weekday_of_month(year, month),
        };
    }

    // COMPOSITION:

    /// The selected day as an absolute date, falling back to day 1 of the
    /// selected month when the day does not exist in it.
    fn selected_date(&self) -> Option<NaiveDate> {
        let CalendarDate { year, month, day } = self.selection;
        self.calendar
            .from_calendar_date(year, month, day)
            .or_else(|| self.calendar.from_calendar_date(year, month, 1))
    }

    /// The externally visible value for the current selection.
    ///
    /// A day past the end of the month (reachable by changing the month or
    /// year after picking a late day) composes as day 1 of that month.
    pub fn composed_value(&self) -> Option<ComposedValue> {
        self.selected_date()
            .map(|date| ComposedValue::compose(date, self.time, self.mode))
    }

    fn notify_change(&self) {
        if self.selection.day > self.facts.days_in_month {
            warn!(
                "{} has no day {}, composing day 1 instead",
                self.selection, self.selection.day
            );
        }

        match self.composed_value() {
            Some(value) => {
                trace!("{} emits {}", self.identity, value);
                self.listener.on_change(value);
            }
            None => warn!("{} could not be composed, nothing emitted", self.selection),
        }
    }

    // POPUP STATE:

    pub fn toggle(&mut self) {
        if self.disabled {
            return;
        }
        self.set_open(!self.is_open);
    }

    /// Run the side effects of opening (registration, positioning) while
    /// leaving the popup hidden.
    pub fn prime_popup(&mut self) {
        if self.disabled || self.is_open {
            return;
        }
        self.set_open(true);
        self.is_open = false;
    }

    fn set_open(&mut self, open: bool) {
        if open == self.is_open {
            return;
        }
        self.is_open = open;

        if open {
            debug!("opening {}", self.identity);
            self.bridge
                .register(self.identity, self.dismiss_handle.clone());
            self.registered = true;
            self.bridge.position_popup(
                &self.identity.anchor_element_id(),
                &self.identity.popup_element_id(),
            );
        } else {
            debug!("closing {}", self.identity);
            self.release_registration();
        }
    }

    fn release_registration(&mut self) {
        if self.registered {
            self.bridge.unregister(self.identity);
            self.registered = false;
        }
    }

    /// Inbound dismissal signal. Ignored unless it names this instance.
    pub fn dismissed(&mut self, identity: Identity) -> bool {
        if identity != self.identity {
            return false;
        }
        debug!("{} dismissed", self.identity);
        self.is_open = false;
        self.release_registration();
        true
    }

    /// Pick a day from the grid and close the popup.
    pub fn select_day(&mut self, day: u32) {
        if self.disabled {
            return;
        }
        self.apply_day(day);
        self.set_open(false);
    }

    /// Select the current moment and close the popup.
    pub fn set_to_today(&mut self) {
        if self.disabled {
            return;
        }
        let now = self.clock.now();
        let today = self.calendar.to_clamped_calendar_date(now.date());

        self.apply_year(today.year);
        self.apply_month(today.month);
        self.apply_day(today.day);
        if self.mode == Mode::DateTime {
            self.apply_time(TimeOfDay::from(now.time()));
        }
        self.set_open(false);
    }

    /// Key press in the time input. Returns true if the key was handled.
    pub fn key_press(&mut self, code: &str) -> bool {
        if self.disabled || !COMMIT_KEYS.contains(&code) {
            return false;
        }
        self.set_open(false);
        true
    }

    // ACCESSORS:

    pub fn identity(&self) -> Identity {
        self.identity
    }

    pub fn calendar_system(&self) -> CalendarSystem {
        self.calendar.system()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn selection(&self) -> CalendarDate {
        self.selection
    }

    pub fn time(&self) -> TimeOfDay {
        self.time
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn days_in_month(&self) -> u32 {
        self.facts.days_in_month
    }

    pub fn first_weekday_of_month(&self) -> u32 {
        self.facts.first_weekday
    }

    pub fn month_grid(&self) -> MonthGrid {
        MonthGrid::build(self.facts.first_weekday, self.facts.days_in_month)
    }

    /// Years offered by the year selector, centred on the current year.
    pub fn year_options(&self) -> RangeInclusive<i32> {
        let current = self.today().year;
        let range = self.calendar.year_range();
        let back = i32::try_from(self.years_back).unwrap_or(i32::MAX);
        let forward = i32::try_from(self.years_forward).unwrap_or(i32::MAX);
        let start = current.saturating_sub(back).max(*range.start());
        let end = current.saturating_add(forward).min(*range.end());
        start..=end
    }

    /// Today under the active calendar.
    pub fn today(&self) -> CalendarDate {
        self.calendar.to_clamped_calendar_date(self.clock.now().date())
    }

    // DISPLAY:

    /// "YYYY/MM/DD", with " HH:MM" appended in DateTime mode.
    pub fn format_numeric(&self) -> String {
        match self.mode {
            Mode::DateTime => format!("{} {}", self.selection, self.time),
            Mode::DateOnly => self.selection.to_string(),
        }
    }

    /// "<day> <month name> <year>" using the calendar's month names.
    pub fn format_header(&self) -> String {
        format!(
            "{} {} {}",
            self.selection.day,
            self.calendar.month_name(self.selection.month),
            self.selection.year
        )
    }

    pub fn is_holiday(&self, weekday_index: u32) -> bool {
        self.calendar.is_holiday(weekday_index)
    }

    pub fn weekday_names(&self) -> &'static [&'static str; 7] {
        self.calendar.weekday_names()
    }
}

impl Drop for DatePickerEngine {
    fn drop(&mut self) {
        self.release_registration();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::calendar::{Gregorian, Persian};
    use crate::clock::FixedClock;
    use crate::registry::DismissalRegistry;

    type Emitted = Arc<Mutex<Vec<ComposedValue>>>;

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    /// 2026-10-17 09:30, which is 25 Mehr 1405.
    fn clock() -> FixedClock {
        FixedClock(at(2026, 10, 17, 9, 30))
    }

    fn recording_engine(system: CalendarSystem, mode: Mode) -> (DatePickerEngine, Emitted) {
        let emitted: Emitted = Arc::new(Mutex::new(Vec::new()));
        let sink = emitted.clone();
        let engine = DatePickerEngine::new(system, mode)
            .with_clock(clock())
            .with_listener(move |value: ComposedValue| sink.lock().unwrap().push(value));
        (engine, emitted)
    }

    fn count(emitted: &Emitted) -> usize {
        emitted.lock().unwrap().len()
    }

    fn last(emitted: &Emitted) -> Option<ComposedValue> {
        emitted.lock().unwrap().last().copied()
    }

    #[test]
    fn test_persian_date_only_unset_seeds_today_and_emits_once() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);

        engine.initialize(None);

        assert_eq!(engine.selection(), CalendarDate::new(1405, 7, 25));
        assert_eq!(count(&emitted), 1);
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::Date(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()))
        );
    }

    #[test]
    fn test_initialize_from_external_value_decomposes_under_calendar() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateTime);

        engine.initialize(Some(ComposedValue::DateTime(at(2024, 3, 19, 18, 5))));

        assert_eq!(engine.selection(), CalendarDate::new(1402, 12, 29));
        assert_eq!(engine.time(), TimeOfDay::new(18, 5).unwrap());
        assert_eq!(engine.days_in_month(), 29);
        assert_eq!(count(&emitted), 1);
    }

    #[test]
    fn test_gregorian_february_30_falls_back_to_first() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Gregorian, Mode::DateTime);
        engine.initialize(Some(ComposedValue::DateTime(at(2025, 1, 31, 10, 15))));

        assert!(engine.set_month(2));
        assert!(engine.set_day(30));

        assert_eq!(engine.selection().day, 30);
        assert_eq!(engine.days_in_month(), 28);
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::DateTime(at(2025, 2, 1, 10, 15)))
        );
    }

    #[test]
    fn test_setting_current_value_never_emits() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Gregorian, Mode::DateTime);
        engine.initialize(None);
        let before = count(&emitted);

        let current = engine.selection();
        assert!(!engine.set_year(current.year));
        assert!(!engine.set_month(current.month));
        assert!(!engine.set_day(current.day));
        assert!(!engine.set_time(engine.time()));

        assert_eq!(count(&emitted), before);
    }

    #[test]
    fn test_each_changing_setter_emits_once() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateTime);
        engine.initialize(None);

        engine.set_year(1404);
        engine.set_month(1);
        engine.set_day(2);
        engine.set_time(TimeOfDay::new(8, 0).unwrap());

        assert_eq!(count(&emitted), 5);
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::DateTime(at(2025, 3, 22, 8, 0)))
        );
    }

    #[test]
    fn test_month_change_recomputes_facts_but_day_change_does_not() {
        let (mut engine, _) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);
        engine.initialize(None);

        engine.set_year(1403);
        engine.set_month(12);
        assert_eq!(engine.days_in_month(), 30);
        let first_weekday = engine.first_weekday_of_month();

        engine.set_day(10);
        assert_eq!(engine.days_in_month(), 30);
        assert_eq!(engine.first_weekday_of_month(), first_weekday);

        engine.set_year(1404);
        assert_eq!(engine.days_in_month(), 29);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let (mut engine, _) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);
        engine.initialize(None);

        engine.set_month(13);
        assert_eq!(engine.selection().month, 12);
        engine.set_day(0);
        assert_eq!(engine.selection().day, 1);
        engine.set_year(20_000);
        assert_eq!(engine.selection().year, 9999);
        assert!(engine.composed_value().is_some());
    }

    #[test]
    fn test_persian_seed_in_last_supported_year_still_emits() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);
        let late = NaiveDate::from_ymd_opt(9999, 6, 1).unwrap();

        engine.initialize(Some(ComposedValue::Date(late)));

        assert_eq!(engine.selection(), CalendarDate::new(9378, 3, 11));
        assert_eq!(count(&emitted), 1);
        assert_eq!(last(&emitted), Some(ComposedValue::Date(late)));
    }

    #[test]
    fn test_gregorian_seed_before_year_one_clamps_to_first_day() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);

        engine.initialize(Some(ComposedValue::Date(NaiveDate::from_ymd_opt(0, 6, 1).unwrap())));

        assert_eq!(engine.selection(), CalendarDate::new(1, 1, 1));
        assert_eq!(count(&emitted), 1);
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::Date(NaiveDate::from_ymd_opt(1, 1, 1).unwrap()))
        );
    }

    #[test]
    fn test_host_value_past_range_reseeds_to_last_day() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);
        engine.initialize(None);

        engine.set_parameters(
            Some(ComposedValue::Date(NaiveDate::from_ymd_opt(12_000, 1, 1).unwrap())),
            false,
        );

        assert_eq!(engine.selection(), CalendarDate::new(9378, 10, 10));
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::Date(NaiveDate::from_ymd_opt(9999, 12, 31).unwrap()))
        );
    }

    #[test]
    fn test_months_past_last_supported_day_are_pulled_back() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);
        engine.initialize(None);

        assert!(engine.set_year(20_000));
        assert_eq!(engine.selection().year, 9378);
        assert!(engine.set_month(12));
        assert_eq!(engine.selection().month, 10);
        assert!(!engine.set_month(11));
        assert_eq!(engine.days_in_month(), 30);

        // Day 25 of Dey 9378 is past 9999-12-31, so day 1 is composed
        assert_eq!(engine.selection().day, 25);
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::Date(NaiveDate::from_ymd_opt(9999, 12, 22).unwrap()))
        );
    }

    #[test]
    fn test_time_change_in_date_only_mode_is_kept_without_emitting() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);
        engine.initialize(None);

        let time = TimeOfDay::new(22, 10).unwrap();
        assert!(engine.set_time(time));

        assert_eq!(engine.time(), time);
        assert_eq!(count(&emitted), 1);
    }

    #[test]
    fn test_today_under_both_calendars_names_the_same_day() {
        let (mut persian, _) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);
        let (mut gregorian, _) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);
        persian.initialize(Some(ComposedValue::Date(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())));
        gregorian.initialize(Some(ComposedValue::Date(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap())));

        persian.set_to_today();
        gregorian.set_to_today();

        let p = persian.selection();
        let g = gregorian.selection();
        assert_ne!(p, g);
        assert_eq!(p, CalendarDate::new(1405, 7, 25));
        assert_eq!(g, CalendarDate::new(2026, 10, 17));
        assert_eq!(
            Persian.from_calendar_date(p.year, p.month, p.day),
            Gregorian.from_calendar_date(g.year, g.month, g.day)
        );
    }

    #[test]
    fn test_set_to_today_updates_time_and_closes() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Gregorian, Mode::DateTime);
        engine.initialize(Some(ComposedValue::DateTime(at(2020, 5, 5, 1, 1))));
        engine.toggle();

        engine.set_to_today();

        assert!(!engine.is_open());
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::DateTime(at(2026, 10, 17, 9, 30)))
        );
    }

    #[test]
    fn test_composed_value_reinitializes_identically() {
        for (system, mode) in [
            (CalendarSystem::Persian, Mode::DateTime),
            (CalendarSystem::Persian, Mode::DateOnly),
            (CalendarSystem::Gregorian, Mode::DateTime),
            (CalendarSystem::Gregorian, Mode::DateOnly),
        ] {
            let (mut source, _) = recording_engine(system, mode);
            source.initialize(None);
            source.set_month(12);
            source.set_day(20);
            source.set_time(TimeOfDay::new(23, 45).unwrap());

            let (mut copy, _) = recording_engine(system, mode);
            copy.initialize(source.composed_value());

            assert_eq!(copy.selection(), source.selection(), "{system} {mode:?}");
            if mode == Mode::DateTime {
                assert_eq!(copy.time(), source.time(), "{system} {mode:?}");
            }
        }
    }

    #[test]
    fn test_host_echo_does_not_reseed_or_emit() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateTime);
        engine.initialize(None);
        engine.set_day(3);
        let echoed = last(&emitted);
        let before = count(&emitted);

        engine.set_parameters(echoed, false);
        engine.set_parameters(None, false);

        assert_eq!(count(&emitted), before);
        assert_eq!(engine.selection().day, 3);
    }

    #[test]
    fn test_host_supplied_new_value_reseeds_through_setters() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Gregorian, Mode::DateTime);
        engine.initialize(Some(ComposedValue::DateTime(at(2026, 10, 17, 9, 30))));

        // Same year and time, new month and day: two changes
        engine.set_parameters(Some(ComposedValue::DateTime(at(2026, 4, 2, 9, 30))), false);

        assert_eq!(engine.selection(), CalendarDate::new(2026, 4, 2));
        assert_eq!(count(&emitted), 3);
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::DateTime(at(2026, 4, 2, 9, 30)))
        );
    }

    #[test]
    fn test_toggle_twice_restores_visibility_and_selection() {
        let registry = Arc::new(DismissalRegistry::new());
        let (engine, _) = recording_engine(CalendarSystem::Persian, Mode::DateTime);
        let mut engine = engine.with_bridge(registry.clone());
        engine.initialize(None);
        let selection = engine.selection();

        engine.toggle();
        assert!(engine.is_open());
        assert!(registry.is_registered(engine.identity()));
        assert_eq!(
            registry.last_position_request(),
            Some((
                engine.identity().anchor_element_id(),
                engine.identity().popup_element_id()
            ))
        );

        engine.toggle();
        assert!(!engine.is_open());
        assert!(!registry.is_registered(engine.identity()));
        assert_eq!(engine.selection(), selection);
    }

    #[test]
    fn test_dismissal_closes_only_the_named_instance() {
        let registry = Arc::new(DismissalRegistry::new());
        let (handle, mut rx) = DismissHandle::channel();
        let mut first = DatePickerEngine::new(CalendarSystem::Persian, Mode::DateOnly)
            .with_clock(clock())
            .with_bridge(registry.clone())
            .with_dismiss_handle(handle.clone());
        let mut second = DatePickerEngine::new(CalendarSystem::Gregorian, Mode::DateOnly)
            .with_clock(clock())
            .with_bridge(registry.clone())
            .with_dismiss_handle(handle);
        first.initialize(None);
        second.initialize(None);
        first.toggle();
        second.toggle();

        assert!(registry.dismiss(first.identity()));
        while let Ok(identity) = rx.try_recv() {
            first.dismissed(identity);
            second.dismissed(identity);
        }

        assert!(!first.is_open());
        assert!(second.is_open());
        assert!(registry.is_registered(second.identity()));
        assert!(!registry.is_registered(first.identity()));
    }

    #[test]
    fn test_disabled_engine_ignores_user_input() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);
        engine.set_parameters(None, true);
        let selection = engine.selection();
        let before = count(&emitted);

        engine.toggle();
        engine.set_day(selection.day % 28 + 1);
        engine.select_day(1);
        engine.set_to_today();
        assert!(!engine.key_press("Enter"));

        assert!(!engine.is_open());
        assert_eq!(engine.selection(), selection);
        assert_eq!(count(&emitted), before);

        // The host can still drive the value
        engine.set_parameters(Some(ComposedValue::Date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())), true);
        assert_eq!(engine.selection(), CalendarDate::new(2026, 1, 5));
    }

    #[test]
    fn test_select_day_sets_day_and_closes() {
        let (mut engine, emitted) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);
        engine.initialize(None);
        engine.toggle();

        engine.select_day(1);

        assert!(!engine.is_open());
        assert_eq!(engine.selection(), CalendarDate::new(1405, 7, 1));
        assert_eq!(
            last(&emitted),
            Some(ComposedValue::Date(NaiveDate::from_ymd_opt(2026, 9, 23).unwrap()))
        );
    }

    #[test]
    fn test_enter_keys_commit_and_close() {
        let (mut engine, _) = recording_engine(CalendarSystem::Gregorian, Mode::DateTime);
        engine.initialize(None);

        engine.toggle();
        assert!(!engine.key_press("KeyA"));
        assert!(engine.is_open());
        assert!(engine.key_press("NumpadEnter"));
        assert!(!engine.is_open());

        // Closed stays closed
        assert!(engine.key_press("Enter"));
        assert!(!engine.is_open());
    }

    #[test]
    fn test_prime_popup_registers_without_showing() {
        let registry = Arc::new(DismissalRegistry::new());
        let mut engine = DatePickerEngine::new(CalendarSystem::Persian, Mode::DateOnly)
            .with_clock(clock())
            .with_bridge(registry.clone());

        engine.prime_popup();

        assert!(!engine.is_open());
        assert!(registry.is_registered(engine.identity()));
        assert!(registry.last_position_request().is_some());

        // A later dismissal of the hidden popup just drops the registration
        assert!(registry.dismiss(engine.identity()));
        assert!(engine.dismissed(engine.identity()));
        assert!(!engine.is_open());
    }

    #[test]
    fn test_drop_releases_registration() {
        let registry = Arc::new(DismissalRegistry::new());
        let identity = {
            let mut engine = DatePickerEngine::new(CalendarSystem::Gregorian, Mode::DateOnly)
                .with_bridge(registry.clone());
            engine.toggle();
            assert!(registry.is_registered(engine.identity()));
            engine.identity()
        };

        assert!(!registry.is_registered(identity));
    }

    #[test]
    fn test_display_helpers() {
        let (mut engine, _) = recording_engine(CalendarSystem::Persian, Mode::DateTime);
        engine.initialize(None);

        assert_eq!(engine.format_numeric(), "1405/07/25 09:30");
        assert_eq!(engine.format_header(), "25 مهر 1405");
        assert!(engine.is_holiday(6));
        assert_eq!(engine.weekday_names()[0], "ش");

        let (mut engine, _) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);
        engine.initialize(None);

        assert_eq!(engine.format_numeric(), "2026/10/17");
        assert_eq!(engine.format_header(), "17 October 2026");
        assert!(engine.is_holiday(0));
        assert!(engine.is_holiday(6));
    }

    #[test]
    fn test_month_grid_matches_derived_facts() {
        let (mut engine, _) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);
        engine.initialize(None);

        // October 2026 starts on a Thursday
        assert_eq!(engine.first_weekday_of_month(), 4);
        let grid = engine.month_grid();
        assert_eq!(grid.weeks[0][4], Some(1));
        assert_eq!(grid.column_of(17), Some(6));
    }

    #[test]
    fn test_year_options_span_current_year() {
        let (engine, _) = recording_engine(CalendarSystem::Persian, Mode::DateOnly);
        let engine = engine.with_year_span(3, 2);

        assert_eq!(engine.year_options(), 1402..=1407);
    }

    #[test]
    fn test_huge_year_span_covers_whole_calendar() {
        let (engine, _) = recording_engine(CalendarSystem::Gregorian, Mode::DateOnly);
        let engine = engine.with_year_span(u32::MAX, u32::MAX);

        assert_eq!(engine.year_options(), 1..=9999);
    }
}
