//! # resumevault-core
//!
//! Core crate for ResumeVault. Contains the unified error system,
//! configuration schemas, and the traits implemented by the collaborator
//! crates (cache, blob storage, recompute queue).
//!
//! This crate has **no** internal dependencies on other ResumeVault crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
