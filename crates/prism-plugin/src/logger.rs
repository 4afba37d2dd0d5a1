//! Per-plugin leveled logger.
//!
//! A thin facade over `tracing`. Every line carries the owning plugin id as a
//! structured field and a `[Plugin:<id>]` label. `debug` output is only
//! produced in development mode.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use prism_core::config::plugin::PluginConfig;

/// Logger bound to one plugin.
#[derive(Debug)]
pub struct Logger {
    plugin_id: String,
    label: String,
    enabled: AtomicBool,
    development: bool,
}

impl Logger {
    /// Creates an enabled logger for `plugin_id`.
    pub fn new(plugin_id: impl Into<String>, development: bool) -> Self {
        let plugin_id = plugin_id.into();
        Self {
            label: format!("[Plugin:{plugin_id}]"),
            plugin_id,
            enabled: AtomicBool::new(true),
            development,
        }
    }

    /// Creates a logger using the runtime configuration.
    pub fn from_config(plugin_id: impl Into<String>, config: &PluginConfig) -> Self {
        let logger = Self::new(plugin_id, config.development);
        logger.set_enabled(config.logging_enabled);
        logger
    }

    /// Returns the plugin id this logger is bound to.
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Turns all output on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Returns whether output is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Returns whether `debug` lines are written.
    pub fn is_development(&self) -> bool {
        self.development
    }

    pub fn info(&self, message: impl fmt::Display) {
        if self.is_enabled() {
            tracing::info!(plugin_id = %self.plugin_id, "{} {}", self.label, message);
        }
    }

    pub fn warn(&self, message: impl fmt::Display) {
        if self.is_enabled() {
            tracing::warn!(plugin_id = %self.plugin_id, "{} {}", self.label, message);
        }
    }

    pub fn error(&self, message: impl fmt::Display) {
        if self.is_enabled() {
            tracing::error!(plugin_id = %self.plugin_id, "{} {}", self.label, message);
        }
    }

    /// Writes only in development mode.
    pub fn debug(&self, message: impl fmt::Display) {
        if self.development && self.is_enabled() {
            tracing::debug!(plugin_id = %self.plugin_id, "{} {}", self.label, message);
        }
    }
}
