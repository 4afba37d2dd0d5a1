//! # prism-plugin
//!
//! Plugin runtime for the Prism design system. Provides:
//!
//! - Plugin definitions with optional lifecycle hooks and a normalizing factory
//! - A per-plugin context for registering components, themes, tokens and
//!   global styles, with a private event bus
//! - A manager driving each plugin through
//!   `Registered → Installed → Active ⇄ Inactive → Uninstalled`
//! - Per-plugin leveled logging over `tracing`

pub mod context;
pub mod definition;
pub mod events;
pub mod logger;
pub mod macros;
pub mod manager;
pub mod prelude;
pub mod registry;
pub mod state;
pub mod theme;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::PluginContext;
pub use definition::{Plugin, PluginMetadata, PluginOptions, create_plugin, hook};
pub use logger::Logger;
pub use manager::PluginManager;
pub use registry::{PluginInfo, PluginRegistry};
pub use state::PluginState;
pub use theme::ThemeDefinition;
