//! Terminal rendering for the picker.
//!
//! Extension traits that draw datepick-core types with owo_colors.

use datepick_core::calendar::DAYS_IN_WEEK;
use datepick_core::{CalendarDate, ComposedValue, DatePickerEngine};
use owo_colors::OwoColorize;

/// Width of one grid cell, wide enough for a two digit day plus padding.
const CELL_WIDTH: usize = 4;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for ComposedValue {
    fn render(&self) -> String {
        match self {
            ComposedValue::DateTime(_) => self.to_string().cyan().to_string(),
            ComposedValue::Date(_) => self.to_string().green().to_string(),
        }
    }
}

impl Render for DatePickerEngine {
    /// Header line, weekday row and the month grid. Holidays are red, the
    /// selected day is reversed and today is underlined.
    fn render(&self) -> String {
        let selection = self.selection();
        let today = self.today();
        let mut lines = vec![self.format_header().bold().to_string(), String::new()];

        let header: String = self
            .weekday_names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let cell = format!("{:>width$}", name, width = CELL_WIDTH);
                if self.is_holiday(i as u32) {
                    cell.red().to_string()
                } else {
                    cell.dimmed().to_string()
                }
            })
            .collect();
        lines.push(header);

        for week in self.month_grid().weeks {
            let row: String = week
                .iter()
                .enumerate()
                .map(|(column, cell)| match cell {
                    Some(day) => render_day(self, *day, column as u32, selection, today),
                    None => " ".repeat(CELL_WIDTH),
                })
                .collect();
            lines.push(row);
        }

        lines.push(String::new());
        lines.push(format!(
            "{} {}",
            "Selected:".dimmed(),
            self.format_numeric()
        ));

        lines.join("\n")
    }
}

fn render_day(
    engine: &DatePickerEngine,
    day: u32,
    column: u32,
    selection: CalendarDate,
    today: CalendarDate,
) -> String {
    let padding = " ".repeat(CELL_WIDTH - 2);
    let number = format!("{:>2}", day);
    let is_today = today == CalendarDate::new(selection.year, selection.month, day);

    let number = if day == selection.day {
        number.reversed().to_string()
    } else if engine.is_holiday(column % DAYS_IN_WEEK) {
        number.red().to_string()
    } else {
        number
    };

    if is_today {
        format!("{}{}", padding, number.underline())
    } else {
        format!("{}{}", padding, number)
    }
}
