use anyhow::Context;
use folio_editor::PreviewConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Live preview settings
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = Self::path(cwd);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_json(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.preview.validate()?;
        Ok(config)
    }

    pub fn path(cwd: &str) -> PathBuf {
        Path::new(cwd).join(DEFAULT_CONFIG_NAME)
    }
}
