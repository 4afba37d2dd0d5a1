//! Integration tests for the plugin lifecycle state machine.

mod common;

use std::sync::Arc;
use std::time::Duration;

use prism_core::traits::host::ElementRegistry;
use prism_core::types::TagName;
use prism_plugin::prelude::*;

use common::{CallLog, TestHost, capture_logs, element};

fn plain(id: &str) -> Plugin {
    Plugin::builder(PluginMetadata::new(id, id, "1.0.0"))
        .install(|_| async { Ok(()) })
        .build()
        .unwrap()
}

/// A plugin recording every hook it runs into `log`.
fn traced(id: &str, log: &CallLog) -> Plugin {
    let (a, b, c, d, e) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
    Plugin::builder(PluginMetadata::new(id, id, "1.0.0"))
        .install(move |ctx| {
            let log = a.clone();
            async move {
                log.push(format!("{}:install", ctx.plugin_id()));
                Ok(())
            }
        })
        .on_install(move |ctx| {
            let log = b.clone();
            async move {
                log.push(format!("{}:on_install", ctx.plugin_id()));
                Ok(())
            }
        })
        .on_activate(move |ctx| {
            let log = c.clone();
            async move {
                log.push(format!("{}:on_activate", ctx.plugin_id()));
                Ok(())
            }
        })
        .on_deactivate(move |ctx| {
            let log = d.clone();
            async move {
                log.push(format!("{}:on_deactivate", ctx.plugin_id()));
                Ok(())
            }
        })
        .on_uninstall(move |ctx| {
            let log = e.clone();
            async move {
                log.push(format!("{}:on_uninstall", ctx.plugin_id()));
                Ok(())
            }
        })
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_initial_state_is_registered() {
    let host = TestHost::new();
    host.manager.register(plain("p1")).await.unwrap();

    assert_eq!(host.manager.state("p1").await, Some(PluginState::Registered));
    assert!(host.manager.context("p1").await.is_none());
    assert!(!host.manager.is_installed("p1").await);
}

#[tokio::test]
async fn test_activate_before_install_is_rejected() {
    let host = TestHost::new();
    host.manager.register(plain("p1")).await.unwrap();

    let err = host.manager.activate("p1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::IllegalTransition);
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Registered));
}

#[tokio::test]
async fn test_illegal_transitions_leave_state_unchanged() {
    let host = TestHost::new();
    host.manager.register(plain("p1")).await.unwrap();
    host.manager.install("p1").await.unwrap();

    let err = host.manager.install("p1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalTransition);
    let err = host.manager.deactivate("p1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalTransition);
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Installed));

    host.manager.activate("p1").await.unwrap();
    let err = host.manager.activate("p1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalTransition);
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Active));
}

#[tokio::test]
async fn test_uninstalled_plugin_rejects_every_command() {
    let host = TestHost::new();
    host.manager.register(plain("p1")).await.unwrap();
    host.manager.install("p1").await.unwrap();
    host.manager.uninstall("p1").await.unwrap();

    for result in [
        host.manager.install("p1").await,
        host.manager.activate("p1").await,
        host.manager.deactivate("p1").await,
        host.manager.uninstall("p1").await,
    ] {
        assert_eq!(result.unwrap_err().kind, ErrorKind::IllegalTransition);
    }
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Uninstalled));
    assert!(host.manager.context("p1").await.is_none());
}

#[tokio::test]
async fn test_uninstall_from_registered_is_rejected() {
    let host = TestHost::new();
    host.manager.register(plain("p1")).await.unwrap();
    let err = host.manager.uninstall("p1").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::IllegalTransition);
}

#[tokio::test]
async fn test_unknown_plugin_is_not_found() {
    let host = TestHost::new();
    let err = host.manager.install("ghost").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(host.manager.state("ghost").await.is_none());
}

#[tokio::test]
async fn test_duplicate_id_rejected_at_registration() {
    let host = TestHost::new();
    host.manager.register(plain("p1")).await.unwrap();
    let err = host.manager.register(plain("p1")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(host.manager.len().await, 1);
}

#[tokio::test]
async fn test_blank_id_rejected_at_registration() {
    let host = TestHost::new();
    let err = host.manager.register(plain("")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(host.manager.is_empty().await);

    let err = host.manager.install("").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(host.document.style_count(), 0);
}

#[tokio::test]
async fn test_hooks_run_in_order_with_one_context() {
    let host = TestHost::new();
    let log = CallLog::default();
    host.manager.register(traced("p1", &log)).await.unwrap();

    host.manager.install("p1").await.unwrap();
    let ctx = host.manager.context("p1").await.unwrap();
    host.manager.activate("p1").await.unwrap();
    host.manager.deactivate("p1").await.unwrap();
    host.manager.activate("p1").await.unwrap();
    assert!(Arc::ptr_eq(&ctx, &host.manager.context("p1").await.unwrap()));
    host.manager.deactivate("p1").await.unwrap();
    host.manager.uninstall("p1").await.unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "p1:install",
            "p1:on_install",
            "p1:on_activate",
            "p1:on_deactivate",
            "p1:on_activate",
            "p1:on_deactivate",
            "p1:on_uninstall",
        ]
    );
}

#[tokio::test]
async fn test_uninstall_active_plugin_deactivates_first() {
    let host = TestHost::new();
    let log = CallLog::default();
    host.manager.register(traced("p1", &log)).await.unwrap();
    host.manager.install("p1").await.unwrap();
    host.manager.activate("p1").await.unwrap();

    host.manager.uninstall("p1").await.unwrap();

    let entries = log.entries();
    assert_eq!(
        &entries[entries.len() - 2..],
        &["p1:on_deactivate".to_string(), "p1:on_uninstall".to_string()]
    );
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Uninstalled));
}

#[tokio::test]
async fn test_deferred_install_settles_before_on_install() {
    let host = TestHost::new();
    let log = CallLog::default();
    let (a, b) = (log.clone(), log.clone());
    let plugin = Plugin::builder(PluginMetadata::new("slow", "Slow", "1.0.0"))
        .install(move |_| {
            let log = a.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                log.push("install settled");
                Ok(())
            }
        })
        .on_install(move |_| {
            let log = b.clone();
            async move {
                log.push("on_install");
                Ok(())
            }
        })
        .build()
        .unwrap();
    host.manager.register(plugin).await.unwrap();

    host.manager.install("slow").await.unwrap();

    assert_eq!(log.entries(), vec!["install settled", "on_install"]);
}

#[tokio::test]
async fn test_failing_install_keeps_registered_and_propagates() {
    let host = TestHost::new();
    let plugin = Plugin::builder(PluginMetadata::new("bad", "Bad", "1.0.0"))
        .install(|ctx| async move {
            ctx.add_global_styles(".half-done {}").await;
            Err(AppError::internal("network unavailable"))
        })
        .build()
        .unwrap();
    host.manager.register(plugin).await.unwrap();

    let err = host.manager.install("bad").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Plugin);
    assert!(err.message.contains("'bad' install hook failed"));
    assert!(err.message.contains("network unavailable"));
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(host.manager.state("bad").await, Some(PluginState::Registered));
    assert!(host.manager.context("bad").await.is_none());
    assert!(host.document.query_styles("data-plugin", "bad").is_empty());
}

#[tokio::test]
async fn test_failing_on_activate_keeps_state() {
    let host = TestHost::new();
    let plugin = Plugin::builder(PluginMetadata::new("p1", "P1", "1.0.0"))
        .install(|_| async { Ok(()) })
        .on_activate(|_| async { Err(AppError::internal("refused")) })
        .build()
        .unwrap();
    host.manager.register(plugin).await.unwrap();
    host.manager.install("p1").await.unwrap();

    let err = host.manager.activate("p1").await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Plugin);
    assert!(err.message.contains("on_activate"));
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Installed));
}

#[tokio::test]
async fn test_failing_on_uninstall_keeps_context() {
    let host = TestHost::new();
    let plugin = Plugin::builder(PluginMetadata::new("p1", "P1", "1.0.0"))
        .install(|ctx| async move {
            ctx.add_global_styles(".kept {}").await;
            Ok(())
        })
        .on_uninstall(|_| async { Err(AppError::internal("busy")) })
        .build()
        .unwrap();
    host.manager.register(plugin).await.unwrap();
    host.manager.install("p1").await.unwrap();

    assert!(host.manager.uninstall("p1").await.is_err());

    assert_eq!(host.manager.state("p1").await, Some(PluginState::Installed));
    assert!(host.manager.context("p1").await.is_some());
    assert_eq!(host.document.query_styles("data-plugin", "p1").len(), 1);
}

#[tokio::test]
async fn test_end_to_end_widget_plugin() {
    let host = TestHost::new();
    let widget = element("WidgetCtor");
    let ctor = widget.clone();
    let plugin = Plugin::builder(plugin_metadata!(id: "p1", name: "Widgets", version: "1.0.0"))
        .install(move |ctx| {
            let ctor = ctor.clone();
            async move {
                ctx.register_component("x-widget", ctor).await?;
                ctx.add_global_styles("x-widget { display: block; }").await;
                Ok(())
            }
        })
        .build()
        .unwrap();
    host.manager.register(plugin).await.unwrap();
    let tag = TagName::parse("x-widget").unwrap();

    host.manager.install("p1").await.unwrap();
    host.manager.activate("p1").await.unwrap();
    assert!(Arc::ptr_eq(&host.elements.get(&tag).unwrap(), &widget));
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Active));
    assert!(host.manager.is_active("p1").await);

    host.manager.deactivate("p1").await.unwrap();
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Inactive));
    assert!(Arc::ptr_eq(&host.elements.get(&tag).unwrap(), &widget));

    host.manager.uninstall("p1").await.unwrap();
    assert_eq!(host.manager.state("p1").await, Some(PluginState::Uninstalled));
    assert!(host.document.query_styles("data-plugin", "p1").is_empty());
    // Definitions are permanent.
    assert!(host.elements.is_defined(&tag));
}

#[tokio::test]
async fn test_theme_plugin_sets_root_property() {
    let host = TestHost::new();
    let plugin = Plugin::builder(PluginMetadata::new("p2", "Sunset", "1.0.0"))
        .install(|ctx| async move {
            ctx.register_theme(
                "sunset",
                ThemeDefinition::new("sunset").token("--c-primary", "#ff6b35"),
            )
            .await
        })
        .build()
        .unwrap();
    host.manager.register(plugin).await.unwrap();

    host.manager.install("p2").await.unwrap();

    assert_eq!(host.document.computed_property("--c-primary"), "#ff6b35");
}

#[tokio::test]
async fn test_install_all_in_registration_order() {
    let host = TestHost::new();
    let log = CallLog::default();
    for id in ["c", "a", "b"] {
        host.manager.register(traced(id, &log)).await.unwrap();
    }

    assert_eq!(host.manager.install_all().await.unwrap(), 3);
    assert_eq!(host.manager.activate_all().await.unwrap(), 3);

    let installs: Vec<String> = log
        .entries()
        .into_iter()
        .filter(|e| e.ends_with(":install"))
        .collect();
    assert_eq!(installs, vec!["c:install", "a:install", "b:install"]);
    assert_eq!(host.manager.install_all().await.unwrap(), 0);
}

#[tokio::test]
async fn test_uninstall_all_in_reverse_order() {
    let host = TestHost::new();
    let log = CallLog::default();
    for id in ["a", "b", "c"] {
        host.manager.register(traced(id, &log)).await.unwrap();
    }
    host.manager.install_all().await.unwrap();
    host.manager.activate("b").await.unwrap();
    host.manager.register(plain("never-installed")).await.unwrap();

    let failures = host.manager.uninstall_all().await;

    assert!(failures.is_empty());
    let uninstalls: Vec<String> = log
        .entries()
        .into_iter()
        .filter(|e| e.ends_with(":on_uninstall"))
        .collect();
    assert_eq!(uninstalls, vec!["c:on_uninstall", "b:on_uninstall", "a:on_uninstall"]);
    assert_eq!(
        host.manager.state("never-installed").await,
        Some(PluginState::Registered)
    );
}

#[tokio::test]
async fn test_uninstall_all_continues_past_failures() {
    let host = TestHost::new();
    let failing = Plugin::builder(PluginMetadata::new("stuck", "Stuck", "1.0.0"))
        .install(|_| async { Ok(()) })
        .on_uninstall(|_| async { Err(AppError::internal("nope")) })
        .build()
        .unwrap();
    host.manager.register(plain("first")).await.unwrap();
    host.manager.register(failing).await.unwrap();
    host.manager.install_all().await.unwrap();

    let failures = host.manager.uninstall_all().await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].kind, ErrorKind::Plugin);
    assert_eq!(host.manager.state("first").await, Some(PluginState::Uninstalled));
    assert_eq!(host.manager.state("stuck").await, Some(PluginState::Installed));
}

#[tokio::test]
async fn test_dependencies_are_informational() {
    let host = TestHost::new();
    let dependent = Plugin::builder(
        PluginMetadata::new("child", "Child", "1.0.0").dependencies(["parent", "missing"]),
    )
    .install(|_| async { Ok(()) })
    .build()
    .unwrap();
    host.manager.register(plain("parent")).await.unwrap();
    host.manager.register(dependent).await.unwrap();

    let (logs, _guard) = capture_logs();
    host.manager.install("child").await.unwrap();

    let output = logs.contents();
    assert!(output.contains("Declared dependency is not registered"));
    assert!(output.contains("Declared dependency is not installed"));
    assert_eq!(host.manager.state("child").await, Some(PluginState::Installed));
    assert_eq!(host.manager.state("parent").await, Some(PluginState::Registered));
}

#[tokio::test]
async fn test_list_plugins_snapshot() {
    let host = TestHost::new();
    host.manager.register(plain("a")).await.unwrap();
    host.manager.register(plain("b")).await.unwrap();
    host.manager.install("b").await.unwrap();

    let list = host.manager.list_plugins().await;

    assert_eq!(list.len(), 2);
    assert_eq!(list[0].metadata.id, "a");
    assert_eq!(list[0].state, PluginState::Registered);
    assert_eq!(list[1].state, PluginState::Installed);
    assert!(list[1].updated_at >= list[1].registered_at);
    assert_eq!(
        host.manager.metadata("b").await.unwrap().version,
        "1.0.0"
    );
}

#[tokio::test]
async fn test_set_logging_enabled_reaches_every_logger() {
    let host = TestHost::new();
    host.manager.register(plain("a")).await.unwrap();
    host.manager.register(plain("b")).await.unwrap();
    host.manager.install("a").await.unwrap();

    host.manager.set_logging_enabled(false).await;
    host.manager.install("b").await.unwrap();

    for id in ["a", "b"] {
        let ctx = host.manager.context(id).await.unwrap();
        assert!(!ctx.logger().is_enabled());
    }

    host.manager.set_logging_enabled(true).await;
    assert!(host.manager.context("a").await.unwrap().logger().is_enabled());
}

#[tokio::test]
async fn test_concurrent_installs_do_not_interleave() {
    let host = Arc::new(TestHost::new());
    let log = CallLog::default();
    for id in ["a", "b"] {
        let (start, end) = (log.clone(), log.clone());
        let plugin = Plugin::builder(PluginMetadata::new(id, id, "1.0.0"))
            .install(move |ctx| {
                let (start, end) = (start.clone(), end.clone());
                async move {
                    start.push(format!("{}:start", ctx.plugin_id()));
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    end.push(format!("{}:end", ctx.plugin_id()));
                    Ok(())
                }
            })
            .build()
            .unwrap();
        host.manager.register(plugin).await.unwrap();
    }

    let (first, second) = tokio::join!(host.manager.install("a"), host.manager.install("b"));
    first.unwrap();
    second.unwrap();

    let entries = log.entries();
    assert_eq!(entries.len(), 4);
    let pid = |e: &String| e.split(':').next().unwrap().to_string();
    assert_eq!(pid(&entries[0]), pid(&entries[1]));
    assert_eq!(pid(&entries[2]), pid(&entries[3]));
}

#[tokio::test(start_paused = true)]
async fn test_logging_toggle_waits_for_install_in_flight() {
    let host = TestHost::new();
    let plugin = Plugin::builder(PluginMetadata::new("slow", "Slow", "1.0.0"))
        .install(|_| async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(())
        })
        .build()
        .unwrap();
    host.manager.register(plugin).await.unwrap();

    let toggle = async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        host.manager.set_logging_enabled(false).await;
    };
    let (installed, ()) = tokio::join!(host.manager.install("slow"), toggle);
    installed.unwrap();

    let ctx = host.manager.context("slow").await.unwrap();
    assert!(!ctx.logger().is_enabled());
}
