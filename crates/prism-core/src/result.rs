//! Convenience result type alias for Prism.

use crate::error::AppError;

/// A specialized `Result` type for Prism operations.
pub type AppResult<T> = Result<T, AppError>;
