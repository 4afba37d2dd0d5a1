//! Core traits defined in `prism-core` and implemented by host crates.

pub mod host;

pub use host::{
    ComponentConstructor, CustomElement, DocumentHost, ElementRegistry, HostEnvironment,
    StyleElement,
};
