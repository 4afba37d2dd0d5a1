//! In-memory custom-element registry.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use prism_core::error::AppError;
use prism_core::result::AppResult;
use prism_core::traits::host::{ComponentConstructor, ElementRegistry};
use prism_core::types::TagName;

#[derive(Debug, Default)]
struct Definitions {
    by_name: HashMap<TagName, ComponentConstructor>,
    order: Vec<TagName>,
}

/// Custom-element registry held in process memory.
///
/// Mirrors the platform: a name can be defined once, and there is no way to
/// remove a definition.
#[derive(Debug, Default)]
pub struct MemoryElementRegistry {
    definitions: Mutex<Definitions>,
}

impl MemoryElementRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of defined elements.
    pub fn len(&self) -> usize {
        let defs = self.definitions.lock().unwrap_or_else(|e| e.into_inner());
        defs.order.len()
    }

    /// Returns `true` if nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ElementRegistry for MemoryElementRegistry {
    fn get(&self, tag: &TagName) -> Option<ComponentConstructor> {
        let defs = self.definitions.lock().unwrap_or_else(|e| e.into_inner());
        defs.by_name.get(tag).cloned()
    }

    fn define(&self, tag: &TagName, constructor: ComponentConstructor) -> AppResult<()> {
        let mut defs = self.definitions.lock().unwrap_or_else(|e| e.into_inner());
        if defs.by_name.contains_key(tag) {
            return Err(AppError::conflict(format!(
                "the name '{tag}' has already been used with this registry"
            )));
        }

        debug!(tag = %tag, class = constructor.class_name(), "Custom element defined");
        defs.by_name.insert(tag.clone(), constructor);
        defs.order.push(tag.clone());
        Ok(())
    }

    fn defined_names(&self) -> Vec<TagName> {
        let defs = self.definitions.lock().unwrap_or_else(|e| e.into_inner());
        defs.order.clone()
    }
}
