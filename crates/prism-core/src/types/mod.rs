//! Core type definitions used across the Prism workspace.

pub mod css;
pub mod id;
pub mod tag_name;

pub use css::{CssVariable, TokenMap, render_declarations, token_map};
pub use id::{HandlerId, StyleId};
pub use tag_name::TagName;
