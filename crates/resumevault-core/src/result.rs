//! Convenience result type alias for ResumeVault.

use crate::error::AppError;

/// A specialized `Result` type for ResumeVault operations.
pub type AppResult<T> = Result<T, AppError>;
