//! Prelude for plugin authors.

pub use prism_core::config::plugin::PluginConfig;
pub use prism_core::error::{AppError, ErrorKind};
pub use prism_core::result::AppResult;
pub use prism_core::traits::host::{ComponentConstructor, CustomElement, HostEnvironment};

pub use crate::context::PluginContext;
pub use crate::definition::{
    HookKind, LifecycleHook, Plugin, PluginBuilder, PluginMetadata, PluginOptions, create_plugin,
    hook,
};
pub use crate::events::{EmitReport, EventHandler};
pub use crate::manager::PluginManager;
pub use crate::state::PluginState;
pub use crate::theme::{DarkTheme, ThemeDefinition};

pub use crate::plugin_metadata;
