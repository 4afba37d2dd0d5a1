//! Plugin registry. Stores plugin definitions, their lifecycle state, and
//! their contexts, in registration order.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use prism_core::error::AppError;
use prism_core::result::AppResult;

use crate::context::PluginContext;
use crate::definition::{HookKind, Plugin, PluginMetadata};
use crate::state::PluginState;

/// Snapshot of one registered plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Plugin metadata.
    #[serde(flatten)]
    pub metadata: PluginMetadata,
    /// Current lifecycle state.
    pub state: PluginState,
    /// Hooks the plugin defines.
    pub hooks: Vec<HookKind>,
    /// When the plugin was registered.
    pub registered_at: DateTime<Utc>,
    /// When the state last changed.
    pub updated_at: DateTime<Utc>,
}

/// Everything the manager tracks for one plugin.
#[derive(Debug, Clone)]
pub(crate) struct PluginRecord {
    pub(crate) plugin: Plugin,
    pub(crate) state: PluginState,
    pub(crate) context: Option<Arc<PluginContext>>,
    pub(crate) registered_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl PluginRecord {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            metadata: self.plugin.metadata().clone(),
            state: self.state,
            hooks: self.plugin.declared_hooks(),
            registered_at: self.registered_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Default)]
struct Entries {
    by_id: HashMap<String, PluginRecord>,
    order: Vec<String>,
}

/// Registry of every plugin known to one manager.
#[derive(Debug, Default)]
pub struct PluginRegistry {
    entries: RwLock<Entries>,
}

impl PluginRegistry {
    /// Creates a new empty plugin registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plugin in the `Registered` state. Ids must be non-blank
    /// and unique.
    pub async fn register(&self, plugin: Plugin) -> AppResult<()> {
        let id = plugin.id().to_string();
        if id.trim().is_empty() {
            return Err(AppError::validation(format!(
                "Plugin '{}' has a blank id",
                plugin.metadata().name
            )));
        }

        let mut entries = self.entries.write().await;
        if entries.by_id.contains_key(&id) {
            return Err(AppError::conflict(format!(
                "Plugin '{id}' is already registered"
            )));
        }

        info!(
            plugin_id = %id,
            name = %plugin.metadata().name,
            version = %plugin.metadata().version,
            "Registering plugin"
        );

        let now = Utc::now();
        entries.order.push(id.clone());
        entries.by_id.insert(
            id,
            PluginRecord {
                plugin,
                state: PluginState::Registered,
                context: None,
                registered_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    /// Returns a copy of the record for `plugin_id`.
    pub(crate) async fn record(&self, plugin_id: &str) -> AppResult<PluginRecord> {
        let entries = self.entries.read().await;
        entries
            .by_id
            .get(plugin_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Plugin '{plugin_id}' not found")))
    }

    /// Records a state change, attaching or detaching the context.
    pub(crate) async fn transition(
        &self,
        plugin_id: &str,
        state: PluginState,
        context: Option<Arc<PluginContext>>,
    ) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        let record = entries
            .by_id
            .get_mut(plugin_id)
            .ok_or_else(|| AppError::not_found(format!("Plugin '{plugin_id}' not found")))?;

        record.state = state;
        record.context = context;
        record.updated_at = Utc::now();
        Ok(())
    }

    /// Gets a plugin definition by id.
    pub async fn get(&self, plugin_id: &str) -> Option<Plugin> {
        let entries = self.entries.read().await;
        entries.by_id.get(plugin_id).map(|r| r.plugin.clone())
    }

    /// Returns the state of a plugin.
    pub async fn state(&self, plugin_id: &str) -> Option<PluginState> {
        let entries = self.entries.read().await;
        entries.by_id.get(plugin_id).map(|r| r.state)
    }

    /// Returns the live context of an installed plugin.
    pub async fn context(&self, plugin_id: &str) -> Option<Arc<PluginContext>> {
        let entries = self.entries.read().await;
        entries.by_id.get(plugin_id).and_then(|r| r.context.clone())
    }

    /// Returns every plugin id in registration order.
    pub async fn ids(&self) -> Vec<String> {
        self.entries.read().await.order.clone()
    }

    /// Returns one plugin's snapshot.
    pub async fn info(&self, plugin_id: &str) -> Option<PluginInfo> {
        let entries = self.entries.read().await;
        entries.by_id.get(plugin_id).map(PluginRecord::info)
    }

    /// Lists every plugin in registration order.
    pub async fn list(&self) -> Vec<PluginInfo> {
        let entries = self.entries.read().await;
        entries
            .order
            .iter()
            .filter_map(|id| entries.by_id.get(id))
            .map(PluginRecord::info)
            .collect()
    }

    /// Returns every live context.
    pub async fn contexts(&self) -> Vec<Arc<PluginContext>> {
        let entries = self.entries.read().await;
        entries
            .order
            .iter()
            .filter_map(|id| entries.by_id.get(id))
            .filter_map(|r| r.context.clone())
            .collect()
    }

    /// Checks whether a plugin is registered.
    pub async fn contains(&self, plugin_id: &str) -> bool {
        self.entries.read().await.by_id.contains_key(plugin_id)
    }

    /// Returns plugin count.
    pub async fn count(&self) -> usize {
        self.entries.read().await.order.len()
    }
}
