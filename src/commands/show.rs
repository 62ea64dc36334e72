use anyhow::Result;
use datepick_core::config::PickerConfig;

use crate::render::Render;

pub fn run(cfg: &PickerConfig, date: Option<&str>) -> Result<()> {
    let engine = super::activated_engine(cfg, date)?;
    println!("{}", engine.render());
    Ok(())
}
