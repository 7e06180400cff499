use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::deck::Deck;
use crate::trigger::TriggerMode;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "scenedeck";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Replaces the deck's presentation-level trigger mode when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_mode: Option<TriggerMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_mode: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `scenedeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# scenedeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn trigger_mode(&self) -> Option<TriggerMode> {
        self.defaults.as_ref().and_then(|d| d.trigger_mode)
    }

    pub fn start_mode(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.start_mode.as_deref())
    }

    /// Config overrides the deck's own presentation default.
    pub fn apply_to(&self, deck: &mut Deck) {
        if let Some(mode) = self.trigger_mode() {
            deck.trigger_mode = mode;
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .theme = Some(value.to_string());
            }
            "defaults.trigger_mode" => {
                let mode = value.parse::<TriggerMode>().map_err(|e| anyhow::anyhow!(e))?;
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .trigger_mode = Some(mode);
            }
            "defaults.start_mode" => {
                if value != "first" && value != "playing" && value.parse::<usize>().is_err() {
                    anyhow::bail!(
                        "Invalid start_mode: {value}. Must be 'first', 'playing', or a slide number."
                    );
                }
                self.defaults
                    .get_or_insert_with(DefaultsConfig::default)
                    .start_mode = Some(value.to_string());
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.theme, defaults.trigger_mode, defaults.start_mode"
            ),
        }
        Ok(())
    }
}
