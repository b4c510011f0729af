//! # resumevault-cache
//!
//! Cache provider implementations for ResumeVault. The cache holds the
//! transient upload-token bindings and, when configured, the fixed-window
//! access counters. Two modes:
//!
//! - **memory**: In-process cache using [moka](https://crates.io/crates/moka),
//!   correct for single-instance deployments only
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! The provider is selected at runtime based on configuration.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
