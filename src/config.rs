use anyhow::{Context, Result};
use datepick_core::config::PickerConfig;
use datepick_core::{CalendarSystem, Mode};

/// Load ~/.config/datepick/config.toml and apply command-line overrides.
pub fn resolve(calendar: Option<CalendarSystem>, mode: Option<Mode>) -> Result<PickerConfig> {
    let path = PickerConfig::config_path()?;
    let mut cfg = PickerConfig::load_from(&path)
        .with_context(|| format!("Failed to load config file at {}", path.display()))?;

    if let Some(calendar) = calendar {
        cfg.calendar = calendar;
    }
    if let Some(mode) = mode {
        cfg.mode = mode;
    }

    Ok(cfg)
}
