//! Convenience result type alias for IDaaS.

use crate::error::AppError;

/// A specialized `Result` type for IDaaS operations.
pub type AppResult<T> = Result<T, AppError>;
