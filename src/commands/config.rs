use anyhow::{Result, bail};
use datepick_core::config::PickerConfig;

pub fn init(force: bool) -> Result<()> {
    let path = PickerConfig::config_path()?;

    if path.exists() && !force {
        bail!(
            "Config file already exists at {}\n\
            Use --force to overwrite it.",
            path.display()
        );
    }

    PickerConfig::create_default_config(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", PickerConfig::config_path()?.display());
    Ok(())
}
