//! Host platform capabilities consumed by the plugin runtime.
//!
//! The runtime never talks to a concrete document. It goes through these
//! two narrow contracts: a custom-element registry and a document that
//! holds root custom properties and tagged style elements. Both are global,
//! unsynchronized platform state shared by every plugin.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::{CssVariable, StyleId, TagName};

/// A class usable as a custom-element definition.
pub trait CustomElement: Send + Sync + fmt::Debug {
    /// Class name, used in diagnostics.
    fn class_name(&self) -> &str;

    /// Attribute names whose changes the element wants to observe.
    fn observed_attributes(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Shared handle to a custom-element class. Identity is pointer identity.
pub type ComponentConstructor = Arc<dyn CustomElement>;

/// The global custom-element registry.
///
/// Definitions are permanent: there is no `undefine`.
pub trait ElementRegistry: Send + Sync + fmt::Debug {
    /// Returns the constructor defined for `tag`, if any.
    fn get(&self, tag: &TagName) -> Option<ComponentConstructor>;

    /// Defines `tag`. Fails with a conflict if `tag` is already defined.
    fn define(&self, tag: &TagName, constructor: ComponentConstructor) -> AppResult<()>;

    /// Returns `true` if `tag` is defined.
    fn is_defined(&self, tag: &TagName) -> bool {
        self.get(tag).is_some()
    }

    /// Returns every defined tag name in definition order.
    fn defined_names(&self) -> Vec<TagName>;
}

/// One `<style>` element in the document head.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleElement {
    /// Element identity.
    pub id: StyleId,
    /// Name of the tagging attribute (e.g. `data-plugin`).
    pub attribute: String,
    /// Value of the tagging attribute (the owning plugin id).
    pub owner: String,
    /// Style text.
    pub css: String,
    /// When the element was appended.
    pub created_at: DateTime<Utc>,
}

/// The shared document: root custom properties and injected style elements.
pub trait DocumentHost: Send + Sync + fmt::Debug {
    /// Sets a custom property on the document root. Last write wins.
    fn set_root_property(&self, name: &CssVariable, value: &str);

    /// Reads a custom property from the document root.
    fn root_property(&self, name: &CssVariable) -> Option<String>;

    /// Appends one style element tagged with `attribute="owner"`.
    fn append_style(&self, css: &str, attribute: &str, owner: &str) -> StyleId;

    /// Removes every style element tagged with `attribute="owner"`.
    /// Returns the number removed.
    fn remove_styles(&self, attribute: &str, owner: &str) -> usize;

    /// Returns every style element tagged with `attribute="owner"`, in
    /// document order.
    fn styles_for(&self, attribute: &str, owner: &str) -> Vec<StyleElement>;
}

/// The pair of host capabilities handed to the plugin runtime.
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    /// Global custom-element registry.
    pub elements: Arc<dyn ElementRegistry>,
    /// Shared document.
    pub document: Arc<dyn DocumentHost>,
}

impl HostEnvironment {
    /// Creates a host environment from its two capabilities.
    pub fn new(elements: Arc<dyn ElementRegistry>, document: Arc<dyn DocumentHost>) -> Self {
        Self { elements, document }
    }
}
