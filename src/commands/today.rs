use anyhow::Result;
use datepick_core::config::PickerConfig;
use datepick_core::CalendarSystem;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(cfg: &PickerConfig) -> Result<()> {
    let engine = super::activated_engine(cfg, None)?;

    if let Some(value) = engine.composed_value() {
        println!("{}", value.render());
        let date = value.date();

        for system in [CalendarSystem::Persian, CalendarSystem::Gregorian] {
            let calendar = system.calendar();
            let fields = calendar.to_calendar_date(date);
            println!(
                "  {:<10} {}  {}",
                system.to_string().dimmed(),
                fields,
                format!("{} {} {}", fields.day, calendar.month_name(fields.month), fields.year).bold()
            );
        }
    }

    Ok(())
}
