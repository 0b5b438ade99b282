use crate::errors::ConfigError;
use crate::pipeline::CompileOptions;
use folio_parser::DocumentStyle;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Live preview settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewConfig {
    /// Quiet period after the last edit before compiling
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Style in effect before the first `#set text(...)`
    #[serde(default)]
    pub base_style: DocumentStyle,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            base_style: DocumentStyle::default(),
        }
    }
}

impl PreviewConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            base_style: self.base_style.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let size = self.base_style.font_size_pt;
        if !size.is_finite() || size <= 0.0 {
            return Err(ConfigError::InvalidFontSize(size));
        }
        if self.base_style.font_family.trim().is_empty() {
            return Err(ConfigError::EmptyFontFamily);
        }
        Ok(())
    }
}
