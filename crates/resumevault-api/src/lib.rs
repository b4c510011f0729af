//! # resumevault-api
//!
//! HTTP API layer for ResumeVault built on Axum.
//!
//! Provides the REST endpoints for uploads, resume lifecycle, shares,
//! signed links, stats and the internal/admin surfaces, plus the signed
//! blob endpoint used by the local storage provider, CORS, and error
//! mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
