//! Grant management.

pub mod service;

pub use service::{CreateShareRequest, ShareService};
