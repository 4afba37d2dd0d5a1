//! Plugin context: the capability surface handed to each plugin.
//!
//! A context is created once per plugin when it is installed and flows
//! through every lifecycle hook until `cleanup` runs on uninstall. It records
//! what the plugin contributed (components, themes, tokens, styles) and owns
//! the plugin's private event bus.
//!
//! Known limitations of `cleanup`: custom-element definitions cannot be
//! undone, and root custom properties set by themes or token extensions stay
//! in place because no undo list is kept.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;

use prism_core::config::plugin::PluginConfig;
use prism_core::error::ErrorKind;
use prism_core::result::AppResult;
use prism_core::traits::host::{ComponentConstructor, HostEnvironment};
use prism_core::types::{HandlerId, StyleId, TagName, TokenMap, token_map};

use crate::events::{EmitReport, EventBus, EventHandler};
use crate::logger::Logger;
use crate::theme::ThemeDefinition;

/// Per-plugin capability object.
pub struct PluginContext {
    plugin_id: String,
    host: HostEnvironment,
    style_attribute: String,
    logger: Arc<Logger>,
    components: RwLock<HashMap<TagName, ComponentConstructor>>,
    themes: RwLock<HashMap<String, ThemeDefinition>>,
    tokens: RwLock<TokenMap>,
    global_styles: RwLock<Vec<String>>,
    events: EventBus,
    cleaned_up: AtomicBool,
}

impl std::fmt::Debug for PluginContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin_id", &self.plugin_id)
            .finish()
    }
}

impl PluginContext {
    /// Creates a context for `plugin_id` on `host`.
    pub fn new(
        plugin_id: impl Into<String>,
        host: HostEnvironment,
        config: &PluginConfig,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            host,
            style_attribute: config.style_attribute.clone(),
            events: EventBus::new(logger.clone()),
            logger,
            components: RwLock::new(HashMap::new()),
            themes: RwLock::new(HashMap::new()),
            tokens: RwLock::new(TokenMap::new()),
            global_styles: RwLock::new(Vec::new()),
            cleaned_up: AtomicBool::new(false),
        }
    }

    /// Returns the owning plugin's id.
    pub fn plugin_id(&self) -> &str {
        &self.plugin_id
    }

    /// Returns the plugin's logger.
    pub fn logger(&self) -> &Arc<Logger> {
        &self.logger
    }

    /// Returns the attribute injected style elements are tagged with.
    pub fn style_attribute(&self) -> &str {
        &self.style_attribute
    }

    // ── Components ──

    /// Defines a custom element and records it as this plugin's.
    ///
    /// Re-registering a tag this plugin already recorded overwrites the
    /// local record without touching the global registry. A tag already
    /// defined globally by someone else is left alone with a warning.
    /// Fails only if `tag_name` is not a valid custom-element name.
    pub async fn register_component(
        &self,
        tag_name: &str,
        constructor: ComponentConstructor,
    ) -> AppResult<()> {
        let tag = TagName::parse(tag_name)?;
        let mut components = self.components.write().await;

        if components.contains_key(&tag) {
            self.logger.warn(format!(
                "Component '{tag}' is already registered by this plugin, overwriting"
            ));
            components.insert(tag, constructor);
            return Ok(());
        }

        if self.host.elements.is_defined(&tag) {
            self.logger
                .warn(format!("Component '{tag}' is already defined, skipping"));
            return Ok(());
        }

        match self.host.elements.define(&tag, constructor.clone()) {
            Ok(()) => {
                self.logger.info(format!(
                    "Registered component '{tag}' ({})",
                    constructor.class_name()
                ));
                components.insert(tag, constructor);
                Ok(())
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                self.logger
                    .warn(format!("Component '{tag}' is already defined, skipping"));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    // ── Themes ──

    /// Stores a theme and applies it immediately.
    ///
    /// Token names are validated before anything is stored or applied.
    /// Re-registering a name overwrites the stored definition; effects of
    /// the earlier application stay until overwritten.
    pub async fn register_theme(&self, name: &str, theme: ThemeDefinition) -> AppResult<()> {
        let application = theme.application()?;

        {
            let mut themes = self.themes.write().await;
            if themes.contains_key(name) {
                self.logger
                    .warn(format!("Theme '{name}' is already registered, overwriting"));
            }
            themes.insert(name.to_string(), theme);
        }

        for (variable, value) in &application.root_tokens {
            self.host.document.set_root_property(variable, value);
        }
        for css in &application.styles {
            self.add_global_styles(css).await;
        }

        self.logger.info(format!(
            "Registered theme '{name}' ({} tokens)",
            application.root_tokens.len()
        ));
        Ok(())
    }

    // ── Tokens ──

    /// Merges custom properties into this plugin's token map and sets each
    /// on the document root. No conflict detection against other plugins.
    pub async fn extend_tokens<I, K, V>(&self, tokens: I) -> AppResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let validated = token_map(tokens)?;

        let mut extended = self.tokens.write().await;
        for (variable, value) in validated {
            self.host.document.set_root_property(&variable, &value);
            extended.insert(variable, value);
        }

        self.logger
            .debug(format!("Extended tokens ({} total)", extended.len()));
        Ok(())
    }

    // ── Styles ──

    /// Injects one style element tagged with this plugin's id.
    ///
    /// Returns `None` once the context has been cleaned up, since nothing
    /// would ever remove the element.
    pub async fn add_global_styles(&self, css: &str) -> Option<StyleId> {
        if self.is_cleaned_up() {
            self.logger
                .warn("Context was already cleaned up, ignoring global styles");
            return None;
        }
        self.global_styles.write().await.push(css.to_string());
        Some(
            self.host
                .document
                .append_style(css, &self.style_attribute, &self.plugin_id),
        )
    }

    // ── Events ──

    /// Subscribes `handler` to `event` on this plugin's bus.
    pub async fn on<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: Fn(&[Value]) -> Result<(), String> + Send + Sync + 'static,
    {
        self.events.subscribe(event, Arc::new(handler)).await
    }

    /// Subscribes a shared handler. Subscribing the same handler twice to
    /// one event keeps a single subscription.
    pub async fn on_handler(&self, event: &str, handler: EventHandler) -> HandlerId {
        self.events.subscribe(event, handler).await
    }

    /// Removes a subscription. A no-op if it was never registered.
    pub async fn off(&self, event: &str, id: HandlerId) -> bool {
        self.events.unsubscribe(event, id).await
    }

    /// Invokes every handler for `event` in subscription order. Failing
    /// handlers are logged and do not stop the rest.
    pub async fn emit(&self, event: &str, args: &[Value]) -> EmitReport {
        self.events.emit(event, args).await
    }

    /// Returns the number of handlers subscribed to `event`.
    pub async fn listener_count(&self, event: &str) -> usize {
        self.events.listener_count(event).await
    }

    /// Returns `true` if `event` has at least one handler.
    pub async fn has_listeners(&self, event: &str) -> bool {
        self.listener_count(event).await > 0
    }

    // ── Accessors (copies) ──

    pub async fn registered_components(&self) -> HashMap<TagName, ComponentConstructor> {
        self.components.read().await.clone()
    }

    pub async fn registered_themes(&self) -> HashMap<String, ThemeDefinition> {
        self.themes.read().await.clone()
    }

    pub async fn extended_tokens(&self) -> TokenMap {
        self.tokens.read().await.clone()
    }

    pub async fn global_styles(&self) -> Vec<String> {
        self.global_styles.read().await.clone()
    }

    // ── Teardown ──

    /// Returns `true` once `cleanup` has run.
    pub fn is_cleaned_up(&self) -> bool {
        self.cleaned_up.load(Ordering::Acquire)
    }

    /// Removes every style element tagged with this plugin's id and drops
    /// every event subscription. Returns the number of style elements
    /// removed.
    pub async fn cleanup(&self) -> usize {
        self.cleaned_up.store(true, Ordering::Release);
        let removed = self
            .host
            .document
            .remove_styles(&self.style_attribute, &self.plugin_id);
        self.global_styles.write().await.clear();
        self.events.clear().await;

        self.logger
            .debug(format!("Cleaned up {removed} style elements"));
        removed
    }
}
