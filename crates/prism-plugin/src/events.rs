//! Plugin-scoped publish/subscribe bus.
//!
//! Each [`PluginContext`](crate::PluginContext) owns one bus; nothing is
//! shared across plugins. Handlers are kept per event name in subscription
//! order and behave like a set: subscribing the same handler twice keeps a
//! single entry.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use prism_core::types::HandlerId;

use crate::logger::Logger;

/// An event handler. Receives the emitted arguments; an `Err` is logged and
/// does not affect other handlers.
pub type EventHandler = Arc<dyn Fn(&[Value]) -> Result<(), String> + Send + Sync>;

struct HandlerEntry {
    id: HandlerId,
    handler: EventHandler,
}

/// Outcome of one `emit` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Handlers invoked.
    pub invoked: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Event name → handlers, in subscription order.
pub struct EventBus {
    handlers: RwLock<HashMap<String, Vec<HandlerEntry>>>,
    logger: Arc<Logger>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("plugin_id", &self.logger.plugin_id())
            .finish()
    }
}

impl EventBus {
    /// Creates an empty bus reporting handler failures through `logger`.
    pub fn new(logger: Arc<Logger>) -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            logger,
        }
    }

    /// Subscribes `handler` to `event`. Subscribing a handler that is
    /// already present returns its existing id.
    pub async fn subscribe(&self, event: &str, handler: EventHandler) -> HandlerId {
        let mut handlers = self.handlers.write().await;
        let entries = handlers.entry(event.to_string()).or_default();

        if let Some(existing) = entries.iter().find(|e| Arc::ptr_eq(&e.handler, &handler)) {
            return existing.id;
        }

        let id = HandlerId::new();
        entries.push(HandlerEntry { id, handler });
        self.logger
            .debug(format!("Subscribed to '{event}' ({} handlers)", entries.len()));
        id
    }

    /// Removes one subscription. Returns `false` if it was not registered.
    pub async fn unsubscribe(&self, event: &str, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write().await;
        let Some(entries) = handlers.get_mut(event) else {
            return false;
        };

        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;

        if entries.is_empty() {
            handlers.remove(event);
        }
        removed
    }

    /// Invokes every handler for `event` in subscription order.
    ///
    /// Handlers are snapshotted first, so a handler may subscribe,
    /// unsubscribe, or emit without deadlocking; changes apply to the next
    /// emit.
    pub async fn emit(&self, event: &str, args: &[Value]) -> EmitReport {
        let snapshot: Vec<EventHandler> = {
            let handlers = self.handlers.read().await;
            match handlers.get(event) {
                Some(entries) => entries.iter().map(|e| e.handler.clone()).collect(),
                None => return EmitReport::default(),
            }
        };

        let mut report = EmitReport::default();
        for handler in snapshot {
            report.invoked += 1;
            match catch_unwind(AssertUnwindSafe(|| handler(args))) {
                Ok(Ok(())) => {}
                Ok(Err(message)) => {
                    report.failed += 1;
                    self.logger
                        .error(format!("Error in event handler for '{event}': {message}"));
                }
                Err(panic) => {
                    report.failed += 1;
                    self.logger.error(format!(
                        "Event handler for '{event}' panicked: {}",
                        panic_message(panic.as_ref())
                    ));
                }
            }
        }
        report
    }

    /// Returns the number of handlers subscribed to `event`.
    pub async fn listener_count(&self, event: &str) -> usize {
        let handlers = self.handlers.read().await;
        handlers.get(event).map(Vec::len).unwrap_or(0)
    }

    /// Returns every event name with at least one handler.
    pub async fn event_names(&self) -> Vec<String> {
        let handlers = self.handlers.read().await;
        handlers.keys().cloned().collect()
    }

    /// Drops every subscription.
    pub async fn clear(&self) {
        self.handlers.write().await.clear();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
