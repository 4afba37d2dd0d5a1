//! # prism-core
//!
//! Core crate for the Prism plugin runtime. Contains the host capability
//! traits (custom-element registry and document), configuration schemas,
//! validated identifiers, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Prism crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
