//! # prism-dom
//!
//! In-process implementations of the host capabilities the plugin runtime
//! consumes:
//!
//! - [`MemoryElementRegistry`]: a custom-element registry with platform
//!   semantics (first definition wins, definitions are permanent)
//! - [`MemoryDocument`]: document-root custom properties plus a head of
//!   tagged `<style>` elements
//!
//! Used by tests and by the playground binary. A browser binding implements
//! the same traits against the real document.

pub mod document;
pub mod elements;

pub use document::MemoryDocument;
pub use elements::MemoryElementRegistry;

use std::sync::Arc;

use prism_core::traits::HostEnvironment;

/// Creates a fresh host environment backed by in-memory implementations,
/// returning the concrete handles alongside it for inspection.
pub fn memory_host() -> (HostEnvironment, Arc<MemoryElementRegistry>, Arc<MemoryDocument>) {
    let elements = Arc::new(MemoryElementRegistry::new());
    let document = Arc::new(MemoryDocument::new());
    let host = HostEnvironment::new(elements.clone(), document.clone());
    (host, elements, document)
}
