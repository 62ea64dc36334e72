pub mod config;
pub mod convert;
pub mod pick;
pub mod show;
pub mod today;

use anyhow::Result;
use datepick_core::config::PickerConfig;
use datepick_core::{ComposedValue, DatePickerEngine};

/// Build an engine from config and activate it with `date` (unset if `None`).
pub fn activated_engine(cfg: &PickerConfig, date: Option<&str>) -> Result<DatePickerEngine> {
    let external = date
        .map(|s| ComposedValue::parse(s, cfg.mode))
        .transpose()?;

    let mut engine = DatePickerEngine::from_config(cfg);
    engine.initialize(external);
    Ok(engine)
}
