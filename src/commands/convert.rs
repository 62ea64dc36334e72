use anyhow::{Result, anyhow};
use datepick_core::{CalendarDate, CalendarSystem};
use owo_colors::OwoColorize;

pub fn run(date: &str, from: CalendarSystem) -> Result<()> {
    let fields: CalendarDate = date.parse()?;
    let source = from.calendar();

    let absolute = source
        .from_calendar_date(fields.year, fields.month, fields.day)
        .ok_or_else(|| anyhow!("{} is not a valid {} date", fields, from))?;

    let target = match from {
        CalendarSystem::Persian => CalendarSystem::Gregorian,
        CalendarSystem::Gregorian => CalendarSystem::Persian,
    };
    let converted = target.calendar().to_calendar_date(absolute);

    println!(
        "{} {} {} {} {}",
        fields,
        format!("({})", from).dimmed(),
        "→".dimmed(),
        converted.bold(),
        format!("({})", target).dimmed()
    );

    Ok(())
}
