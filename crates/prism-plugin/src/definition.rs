//! Plugin definitions: metadata, lifecycle hooks, and the factory that
//! normalizes them.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

use prism_core::error::AppError;
use prism_core::result::AppResult;

use crate::context::PluginContext;

/// Immutable metadata describing a plugin. `id` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Unique plugin identifier.
    pub id: String,
    /// Human-readable plugin name.
    pub name: String,
    /// Plugin version string.
    pub version: String,
    /// Plugin description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Author or maintainer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Ids of plugins this one expects. Informational only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
}

impl PluginMetadata {
    /// Creates metadata with the required fields.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: None,
            author: None,
            dependencies: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the author.
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the declared dependencies.
    pub fn dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }
}

/// Future returned by a lifecycle hook.
pub type HookFuture = BoxFuture<'static, AppResult<()>>;

/// A lifecycle callback. Receives the plugin's context; may complete
/// immediately or later.
pub type LifecycleHook = Arc<dyn Fn(Arc<PluginContext>) -> HookFuture + Send + Sync>;

/// Wraps an async closure as a [`LifecycleHook`].
///
/// ```rust,ignore
/// let install = hook(|ctx| async move {
///     ctx.register_component("x-widget", widget()).await
/// });
/// ```
pub fn hook<F, Fut>(f: F) -> LifecycleHook
where
    F: Fn(Arc<PluginContext>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = AppResult<()>> + Send + 'static,
{
    Arc::new(move |ctx: Arc<PluginContext>| -> HookFuture { Box::pin(f(ctx)) })
}

/// Names of the lifecycle hooks, as used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookKind {
    Install,
    OnInstall,
    OnActivate,
    OnDeactivate,
    OnUninstall,
}

impl HookKind {
    /// Returns the hook name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::OnInstall => "on_install",
            Self::OnActivate => "on_activate",
            Self::OnDeactivate => "on_deactivate",
            Self::OnUninstall => "on_uninstall",
        }
    }
}

impl std::fmt::Display for HookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input to [`create_plugin`].
pub struct PluginOptions {
    pub metadata: PluginMetadata,
    pub install: LifecycleHook,
    pub on_install: Option<LifecycleHook>,
    pub on_uninstall: Option<LifecycleHook>,
    pub on_activate: Option<LifecycleHook>,
    pub on_deactivate: Option<LifecycleHook>,
}

/// A plugin definition: metadata, the install function, and optional
/// lifecycle hooks.
///
/// Absent hooks stay `None`; callers check for presence before invoking.
#[derive(Clone)]
pub struct Plugin {
    metadata: PluginMetadata,
    install: LifecycleHook,
    on_install: Option<LifecycleHook>,
    on_uninstall: Option<LifecycleHook>,
    on_activate: Option<LifecycleHook>,
    on_deactivate: Option<LifecycleHook>,
}

/// Normalizes plugin options into a [`Plugin`]. Performs no validation.
pub fn create_plugin(options: PluginOptions) -> Plugin {
    Plugin {
        metadata: options.metadata,
        install: options.install,
        on_install: options.on_install,
        on_uninstall: options.on_uninstall,
        on_activate: options.on_activate,
        on_deactivate: options.on_deactivate,
    }
}

impl Plugin {
    /// Starts a fluent definition.
    pub fn builder(metadata: PluginMetadata) -> PluginBuilder {
        PluginBuilder {
            metadata,
            install: None,
            on_install: None,
            on_uninstall: None,
            on_activate: None,
            on_deactivate: None,
        }
    }

    pub fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Returns the hook for `kind`, if the plugin defines one. `Install` is
    /// always present.
    pub fn hook(&self, kind: HookKind) -> Option<&LifecycleHook> {
        match kind {
            HookKind::Install => Some(&self.install),
            HookKind::OnInstall => self.on_install.as_ref(),
            HookKind::OnActivate => self.on_activate.as_ref(),
            HookKind::OnDeactivate => self.on_deactivate.as_ref(),
            HookKind::OnUninstall => self.on_uninstall.as_ref(),
        }
    }

    /// Lists the hooks this plugin defines.
    pub fn declared_hooks(&self) -> Vec<HookKind> {
        [
            HookKind::Install,
            HookKind::OnInstall,
            HookKind::OnActivate,
            HookKind::OnDeactivate,
            HookKind::OnUninstall,
        ]
        .into_iter()
        .filter(|kind| self.hook(*kind).is_some())
        .collect()
    }
}

impl std::fmt::Debug for Plugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plugin")
            .field("metadata", &self.metadata)
            .field("hooks", &self.declared_hooks())
            .finish()
    }
}

/// Fluent builder for [`Plugin`].
pub struct PluginBuilder {
    metadata: PluginMetadata,
    install: Option<LifecycleHook>,
    on_install: Option<LifecycleHook>,
    on_uninstall: Option<LifecycleHook>,
    on_activate: Option<LifecycleHook>,
    on_deactivate: Option<LifecycleHook>,
}

impl PluginBuilder {
    pub fn install<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<PluginContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.install = Some(hook(f));
        self
    }

    pub fn on_install<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<PluginContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.on_install = Some(hook(f));
        self
    }

    pub fn on_uninstall<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<PluginContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.on_uninstall = Some(hook(f));
        self
    }

    pub fn on_activate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<PluginContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.on_activate = Some(hook(f));
        self
    }

    pub fn on_deactivate<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<PluginContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        self.on_deactivate = Some(hook(f));
        self
    }

    /// Finishes the definition. Fails if no install function was given.
    pub fn build(self) -> AppResult<Plugin> {
        let install = self.install.ok_or_else(|| {
            AppError::validation(format!(
                "Plugin '{}' has no install function",
                self.metadata.id
            ))
        })?;

        Ok(create_plugin(PluginOptions {
            metadata: self.metadata,
            install,
            on_install: self.on_install,
            on_uninstall: self.on_uninstall,
            on_activate: self.on_activate,
            on_deactivate: self.on_deactivate,
        }))
    }
}
