//! Plugin runtime configuration.

use serde::{Deserialize, Serialize};

/// Plugin runtime configuration, applied to every context and logger the
/// manager creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Development mode. Plugin loggers only emit `debug` lines when set.
    #[serde(default)]
    pub development: bool,
    /// Initial enabled switch for every plugin logger.
    #[serde(default = "default_true")]
    pub logging_enabled: bool,
    /// Attribute used to tag injected style elements with the owning plugin id.
    #[serde(default = "default_style_attribute")]
    pub style_attribute: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            development: false,
            logging_enabled: default_true(),
            style_attribute: default_style_attribute(),
        }
    }
}

impl PluginConfig {
    /// Development-mode configuration with all other settings at their defaults.
    pub fn development() -> Self {
        Self {
            development: true,
            ..Self::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_style_attribute() -> String {
    "data-plugin".to_string()
}
