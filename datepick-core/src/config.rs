//! Picker configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarSystem;
use crate::error::{PickerError, PickerResult};
use crate::value::Mode;

const DEFAULT_YEARS_BACK: u32 = 100;
const DEFAULT_YEARS_FORWARD: u32 = 10;

fn default_years_back() -> u32 {
    DEFAULT_YEARS_BACK
}

fn default_years_forward() -> u32 {
    DEFAULT_YEARS_FORWARD
}

/// Configuration at ~/.config/datepick/config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickerConfig {
    #[serde(default)]
    pub calendar: CalendarSystem,

    #[serde(default)]
    pub mode: Mode,

    /// Years before the current one offered by the year selector.
    #[serde(default = "default_years_back")]
    pub years_back: u32,

    /// Years after the current one offered by the year selector.
    #[serde(default = "default_years_forward")]
    pub years_forward: u32,
}

impl Default for PickerConfig {
    fn default() -> Self {
        PickerConfig {
            calendar: CalendarSystem::default(),
            mode: Mode::default(),
            years_back: DEFAULT_YEARS_BACK,
            years_forward: DEFAULT_YEARS_FORWARD,
        }
    }
}

impl PickerConfig {
    pub fn config_path() -> PickerResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PickerError::Config("Could not determine config directory".into()))?
            .join("datepick");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> PickerResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            PickerError::Config(format!("Could not parse {}: {e}", path.display()))
        })
    }

    pub fn load() -> PickerResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> PickerResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| PickerError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PickerResult<()> {
        let contents = format!(
            "\
# datepick configuration

# Calendar system, \"persian\" or \"gregorian\":
# calendar = \"persian\"

# Whether values carry a time of day, \"date_time\" or \"date_only\":
# mode = \"date_time\"

# Year selector span around the current year:
# years_back = {DEFAULT_YEARS_BACK}
# years_forward = {DEFAULT_YEARS_FORWARD}
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PickerError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PickerError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
