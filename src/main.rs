//! Prism Playground
//!
//! Wires the plugin runtime to an in-memory document, drives a sample
//! plugin through its whole lifecycle, and prints what the document looks
//! like at each stage.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use prism_core::config::AppConfig;
use prism_core::error::AppError;
use prism_core::traits::host::{CustomElement, ElementRegistry};
use prism_dom::{MemoryDocument, MemoryElementRegistry, memory_host};
use prism_plugin::prelude::*;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Playground error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration for the environment named by `PRISM_ENV`.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("PRISM_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

#[derive(Debug)]
struct BrandButton;

impl CustomElement for BrandButton {
    fn class_name(&self) -> &str {
        "BrandButton"
    }

    fn observed_attributes(&self) -> Vec<String> {
        vec!["variant".to_string(), "disabled".to_string()]
    }
}

/// A plugin contributing a component, a theme with dark overrides, a few
/// spacing tokens, and an event handler.
fn brand_plugin() -> AppResult<Plugin> {
    Plugin::builder(plugin_metadata!(
        id: "brand",
        name: "Brand Kit",
        version: "1.0.0",
        description: "Brand button, sunset theme and spacing scale",
        author: "Prism Design System Team"
    ))
    .install(|ctx| async move {
        ctx.register_component("brand-button", Arc::new(BrandButton))
            .await?;
        ctx.register_theme(
            "sunset",
            ThemeDefinition::new("sunset")
                .token("--c-primary", "#ff6b35")
                .token("--c-surface", "#fffaf5")
                .dark_token("--c-surface", "#1a1410")
                .styles("brand-button { background: var(--c-primary); }"),
        )
        .await?;
        ctx.extend_tokens([("--space-1", "4px"), ("--space-2", "8px")])
            .await?;

        let logger = ctx.logger().clone();
        ctx.on("theme-changed", move |args| {
            logger.info(format!("theme changed: {args:?}"));
            Ok(())
        })
        .await;
        Ok(())
    })
    .on_activate(|ctx| async move {
        ctx.emit("theme-changed", &[serde_json::json!("sunset")])
            .await;
        Ok(())
    })
    .build()
}

fn report(stage: &str, elements: &MemoryElementRegistry, document: &MemoryDocument) {
    let tags: Vec<String> = elements
        .defined_names()
        .into_iter()
        .map(String::from)
        .collect();
    println!("── {stage} ──");
    println!("custom elements: {}", tags.join(", "));
    println!("--c-primary: {}", document.computed_property("--c-primary"));
    println!("style elements: {}", document.style_count());
}

/// Main playground run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Prism playground v{}", env!("CARGO_PKG_VERSION"));

    let (host, elements, document) = memory_host();
    let manager = PluginManager::with_config(host, config.plugins.clone());

    manager.register(brand_plugin()?).await?;
    report("registered", &elements, &document);

    manager.install("brand").await?;
    manager.activate("brand").await?;
    report("active", &elements, &document);
    println!("{}", document.stylesheet_text());

    manager.deactivate("brand").await?;
    manager.uninstall("brand").await?;
    report("uninstalled", &elements, &document);

    println!("{}", serde_json::to_string_pretty(&manager.list_plugins().await)?);
    Ok(())
}
