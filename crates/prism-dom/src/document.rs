//! In-memory document: root custom properties and tagged style elements.

use std::sync::Mutex;

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use prism_core::traits::host::{DocumentHost, StyleElement};
use prism_core::types::{CssVariable, StyleId};

/// A document held in process memory.
///
/// Root properties are last-write-wins. Style elements keep document order
/// so the effective cascade can be reconstructed with [`stylesheet_text`].
///
/// [`stylesheet_text`]: MemoryDocument::stylesheet_text
#[derive(Debug, Default)]
pub struct MemoryDocument {
    /// Custom properties set inline on the document root.
    root_properties: DashMap<CssVariable, String>,
    /// `<style>` elements in the head, in insertion order.
    head: Mutex<Vec<StyleElement>>,
}

impl MemoryDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a root custom property the way `getPropertyValue` does:
    /// an unset property reads as the empty string.
    pub fn computed_property(&self, name: &str) -> String {
        CssVariable::parse(name)
            .ok()
            .and_then(|variable| self.root_property(&variable))
            .unwrap_or_default()
    }

    /// Returns every style element, in document order.
    pub fn style_elements(&self) -> Vec<StyleElement> {
        self.head.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns the number of style elements in the head.
    pub fn style_count(&self) -> usize {
        self.head.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Equivalent of `style[attribute="owner"]`: the CSS text of every
    /// matching element.
    pub fn query_styles(&self, attribute: &str, owner: &str) -> Vec<String> {
        self.styles_for(attribute, owner)
            .into_iter()
            .map(|style| style.css)
            .collect()
    }

    /// Concatenation of every style element's text, in document order.
    pub fn stylesheet_text(&self) -> String {
        let head = self.head.lock().unwrap_or_else(|e| e.into_inner());
        head.iter()
            .map(|style| style.css.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DocumentHost for MemoryDocument {
    fn set_root_property(&self, name: &CssVariable, value: &str) {
        self.root_properties.insert(name.clone(), value.to_string());
    }

    fn root_property(&self, name: &CssVariable) -> Option<String> {
        self.root_properties.get(name).map(|v| v.value().clone())
    }

    fn append_style(&self, css: &str, attribute: &str, owner: &str) -> StyleId {
        let element = StyleElement {
            id: StyleId::new(),
            attribute: attribute.to_string(),
            owner: owner.to_string(),
            css: css.to_string(),
            created_at: Utc::now(),
        };
        let id = element.id;

        let mut head = self.head.lock().unwrap_or_else(|e| e.into_inner());
        head.push(element);

        debug!(style_id = %id, owner = %owner, bytes = css.len(), "Style element appended");
        id
    }

    fn remove_styles(&self, attribute: &str, owner: &str) -> usize {
        let mut head = self.head.lock().unwrap_or_else(|e| e.into_inner());
        let before = head.len();
        head.retain(|style| !(style.attribute == attribute && style.owner == owner));
        before - head.len()
    }

    fn styles_for(&self, attribute: &str, owner: &str) -> Vec<StyleElement> {
        let head = self.head.lock().unwrap_or_else(|e| e.into_inner());
        head.iter()
            .filter(|style| style.attribute == attribute && style.owner == owner)
            .cloned()
            .collect()
    }
}
