use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::errors::{CleanError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "housing_cleaner.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub import: ImportConfig,
    pub cleaning: CleaningConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub delimiter: char,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

/// How the address fill chooses between several same-parcel donors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonorPick {
    /// Whatever row the engine's join produces first.
    #[default]
    Any,
    /// The donor with the smallest UniqueID.
    LowestUniqueId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub donor_pick: DonorPick,
    pub date_formats: Vec<String>,
    pub delete_duplicate_transactions: bool,
    pub drop_columns: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            donor_pick: DonorPick::default(),
            date_formats: default_date_formats(),
            delete_duplicate_transactions: false,
            drop_columns: Vec::new(),
        }
    }
}

fn default_date_formats() -> Vec<String> {
    [
        "%B %d, %Y",
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ]
    .iter()
    .map(|f| f.to_string())
    .collect()
}

impl Config {
    /// Loads the config from `path`, or from the default location when `path` is None.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (config_path, explicit) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        if !explicit && !config_path.exists() {
            return Ok(Config::default());
        }

        let config_content = fs::read_to_string(config_path).map_err(|e| {
            CleanError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.cleaning.date_formats.is_empty() {
            return Err(CleanError::Config(
                "cleaning.date_formats must list at least one format".into(),
            ));
        }
        if !self.import.delimiter.is_ascii() {
            return Err(CleanError::Config(format!(
                "import.delimiter must be a single ASCII character, got '{}'",
                self.import.delimiter
            )));
        }
        Ok(())
    }
}
