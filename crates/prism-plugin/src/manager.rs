//! Plugin manager: drives every plugin through its lifecycle.
//!
//! Commands are serialized: one install/activate/deactivate/uninstall runs
//! at a time across all plugins, and each hook settles before the next one
//! starts. A plugin's recorded state only advances once every hook for the
//! transition has succeeded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use prism_core::config::plugin::PluginConfig;
use prism_core::error::{AppError, ErrorKind};
use prism_core::result::AppResult;
use prism_core::traits::host::HostEnvironment;

use crate::context::PluginContext;
use crate::definition::{HookKind, Plugin, PluginMetadata};
use crate::logger::Logger;
use crate::registry::{PluginInfo, PluginRecord, PluginRegistry};
use crate::state::{LifecycleCommand, PluginState};

/// Manages the lifecycle of every registered plugin.
#[derive(Debug)]
pub struct PluginManager {
    /// Host capabilities handed to every context.
    host: HostEnvironment,
    /// Runtime configuration.
    config: PluginConfig,
    /// Plugin registry.
    registry: Arc<PluginRegistry>,
    /// Serializes lifecycle commands.
    lifecycle: Mutex<()>,
    /// Enabled switch applied to plugin loggers.
    logging_enabled: AtomicBool,
}

impl PluginManager {
    /// Creates a manager with the default configuration.
    pub fn new(host: HostEnvironment) -> Self {
        Self::with_config(host, PluginConfig::default())
    }

    /// Creates a manager with an explicit configuration.
    pub fn with_config(host: HostEnvironment, config: PluginConfig) -> Self {
        Self {
            logging_enabled: AtomicBool::new(config.logging_enabled),
            host,
            config,
            registry: Arc::new(PluginRegistry::new()),
            lifecycle: Mutex::new(()),
        }
    }

    /// Adds a plugin definition in the `Registered` state.
    pub async fn register(&self, plugin: Plugin) -> AppResult<()> {
        self.registry.register(plugin).await
    }

    /// Creates the plugin's context, runs `install`, then `on_install`.
    pub async fn install(&self, plugin_id: &str) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;
        self.install_locked(plugin_id).await
    }

    /// Runs `on_activate` on an installed or inactive plugin.
    pub async fn activate(&self, plugin_id: &str) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;
        self.activate_locked(plugin_id).await
    }

    /// Runs `on_deactivate` on an active plugin.
    pub async fn deactivate(&self, plugin_id: &str) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;

        let record = self.registry.record(plugin_id).await?;
        let context = self.checked(&record, LifecycleCommand::Deactivate)?;

        self.run_hook(&record.plugin, HookKind::OnDeactivate, &context)
            .await?;
        self.registry
            .transition(plugin_id, PluginState::Inactive, Some(context))
            .await?;

        info!(plugin_id = %plugin_id, "Plugin deactivated");
        Ok(())
    }

    /// Runs `on_uninstall`, then cleans up the plugin's context.
    ///
    /// An active plugin is deactivated first.
    pub async fn uninstall(&self, plugin_id: &str) -> AppResult<()> {
        let _guard = self.lifecycle.lock().await;
        self.uninstall_locked(plugin_id).await
    }

    /// Installs every `Registered` plugin in registration order. Stops at the
    /// first failure.
    pub async fn install_all(&self) -> AppResult<usize> {
        let _guard = self.lifecycle.lock().await;
        let mut installed = 0;

        for id in self.registry.ids().await {
            if self.registry.state(&id).await == Some(PluginState::Registered) {
                self.install_locked(&id).await?;
                installed += 1;
            }
        }
        Ok(installed)
    }

    /// Activates every `Installed` or `Inactive` plugin in registration
    /// order. Stops at the first failure.
    pub async fn activate_all(&self) -> AppResult<usize> {
        let _guard = self.lifecycle.lock().await;
        let mut activated = 0;

        for id in self.registry.ids().await {
            let state = self.registry.state(&id).await;
            if matches!(state, Some(PluginState::Installed | PluginState::Inactive)) {
                self.activate_locked(&id).await?;
                activated += 1;
            }
        }
        Ok(activated)
    }

    /// Uninstalls every installed plugin in reverse registration order.
    ///
    /// Failures are logged and collected; the remaining plugins are still
    /// uninstalled.
    pub async fn uninstall_all(&self) -> Vec<AppError> {
        let _guard = self.lifecycle.lock().await;
        let mut failures = Vec::new();

        for id in self.registry.ids().await.into_iter().rev() {
            let installed = self
                .registry
                .state(&id)
                .await
                .is_some_and(PluginState::is_installed);
            if !installed {
                continue;
            }
            if let Err(e) = self.uninstall_locked(&id).await {
                error!(plugin_id = %id, error = %e, "Error uninstalling plugin");
                failures.push(e);
            }
        }

        info!(failed = failures.len(), "All plugins uninstalled");
        failures
    }

    // ── Queries ──

    /// Returns a plugin's lifecycle state.
    pub async fn state(&self, plugin_id: &str) -> Option<PluginState> {
        self.registry.state(plugin_id).await
    }

    /// Returns a plugin's metadata.
    pub async fn metadata(&self, plugin_id: &str) -> Option<PluginMetadata> {
        self.registry
            .get(plugin_id)
            .await
            .map(|p| p.metadata().clone())
    }

    /// Returns the context of an installed plugin. `None` before install and
    /// after uninstall.
    pub async fn context(&self, plugin_id: &str) -> Option<Arc<PluginContext>> {
        self.registry.context(plugin_id).await
    }

    /// Lists every plugin in registration order.
    pub async fn list_plugins(&self) -> Vec<PluginInfo> {
        self.registry.list().await
    }

    pub async fn is_installed(&self, plugin_id: &str) -> bool {
        self.state(plugin_id)
            .await
            .is_some_and(PluginState::is_installed)
    }

    pub async fn is_active(&self, plugin_id: &str) -> bool {
        self.state(plugin_id).await == Some(PluginState::Active)
    }

    pub async fn len(&self) -> usize {
        self.registry.count().await
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Turns logging on or off for every current plugin and for plugins
    /// installed later. Waits for any lifecycle command in flight.
    pub async fn set_logging_enabled(&self, enabled: bool) {
        let _guard = self.lifecycle.lock().await;
        self.logging_enabled.store(enabled, Ordering::Relaxed);
        for context in self.registry.contexts().await {
            context.logger().set_enabled(enabled);
        }
    }

    // ── Transitions (lifecycle lock held) ──

    async fn install_locked(&self, plugin_id: &str) -> AppResult<()> {
        let record = self.registry.record(plugin_id).await?;
        Self::ensure_transition(&record, LifecycleCommand::Install)?;

        self.check_dependencies(record.plugin.metadata()).await;

        let logger = Arc::new(Logger::from_config(plugin_id, &self.config));
        logger.set_enabled(self.logging_enabled.load(Ordering::Relaxed));
        let context = Arc::new(PluginContext::new(
            plugin_id,
            self.host.clone(),
            &self.config,
            logger,
        ));

        for kind in [HookKind::Install, HookKind::OnInstall] {
            if let Err(e) = self.run_hook(&record.plugin, kind, &context).await {
                // The context never reaches the registry; drop what it injected.
                context.cleanup().await;
                return Err(e);
            }
        }

        self.registry
            .transition(plugin_id, PluginState::Installed, Some(context))
            .await?;

        let metadata = record.plugin.metadata();
        info!(
            plugin_id = %plugin_id,
            name = %metadata.name,
            version = %metadata.version,
            "Plugin installed"
        );
        Ok(())
    }

    async fn activate_locked(&self, plugin_id: &str) -> AppResult<()> {
        let record = self.registry.record(plugin_id).await?;
        let context = self.checked(&record, LifecycleCommand::Activate)?;

        self.run_hook(&record.plugin, HookKind::OnActivate, &context)
            .await?;
        self.registry
            .transition(plugin_id, PluginState::Active, Some(context))
            .await?;

        info!(plugin_id = %plugin_id, "Plugin activated");
        Ok(())
    }

    async fn uninstall_locked(&self, plugin_id: &str) -> AppResult<()> {
        let record = self.registry.record(plugin_id).await?;
        let context = self.checked(&record, LifecycleCommand::Uninstall)?;

        if record.state == PluginState::Active {
            self.run_hook(&record.plugin, HookKind::OnDeactivate, &context)
                .await?;
            self.registry
                .transition(plugin_id, PluginState::Inactive, Some(context.clone()))
                .await?;
        }

        self.run_hook(&record.plugin, HookKind::OnUninstall, &context)
            .await?;
        let removed = context.cleanup().await;
        self.registry
            .transition(plugin_id, PluginState::Uninstalled, None)
            .await?;

        info!(plugin_id = %plugin_id, styles_removed = removed, "Plugin uninstalled");
        Ok(())
    }

    // ── Helpers ──

    fn ensure_transition(record: &PluginRecord, command: LifecycleCommand) -> AppResult<()> {
        let target = command.target();
        if record.state.can_transition_to(target) {
            return Ok(());
        }

        let id = record.plugin.id();
        warn!(
            plugin_id = %id,
            command = %command,
            state = %record.state,
            "Rejected illegal lifecycle transition"
        );
        Err(AppError::illegal_transition(format!(
            "Cannot {command} plugin '{id}': plugin is {}",
            record.state
        )))
    }

    /// Validates the transition and returns the plugin's live context.
    fn checked(
        &self,
        record: &PluginRecord,
        command: LifecycleCommand,
    ) -> AppResult<Arc<PluginContext>> {
        Self::ensure_transition(record, command)?;
        record.context.clone().ok_or_else(|| {
            AppError::internal(format!(
                "Plugin '{}' is {} but has no context",
                record.plugin.id(),
                record.state
            ))
        })
    }

    /// Runs one hook if the plugin defines it, wrapping failures with the
    /// plugin id and hook name.
    async fn run_hook(
        &self,
        plugin: &Plugin,
        kind: HookKind,
        context: &Arc<PluginContext>,
    ) -> AppResult<()> {
        let Some(hook) = plugin.hook(kind) else {
            debug!(plugin_id = %plugin.id(), hook = %kind, "Plugin defines no hook, skipping");
            return Ok(());
        };

        debug!(plugin_id = %plugin.id(), hook = %kind, "Running plugin hook");
        hook(context.clone()).await.map_err(|e| {
            error!(plugin_id = %plugin.id(), hook = %kind, error = %e, "Plugin hook failed");
            AppError::with_source(
                ErrorKind::Plugin,
                format!("Plugin '{}' {kind} hook failed: {}", plugin.id(), e.message),
                e,
            )
        })
    }

    /// Logs declared dependencies that are missing or not yet installed.
    /// Installation proceeds regardless.
    async fn check_dependencies(&self, metadata: &PluginMetadata) {
        for dependency in &metadata.dependencies {
            match self.registry.state(dependency).await {
                None => warn!(
                    plugin_id = %metadata.id,
                    dependency = %dependency,
                    "Declared dependency is not registered"
                ),
                Some(state) if !state.is_installed() => warn!(
                    plugin_id = %metadata.id,
                    dependency = %dependency,
                    state = %state,
                    "Declared dependency is not installed"
                ),
                Some(_) => {}
            }
        }
    }
}
