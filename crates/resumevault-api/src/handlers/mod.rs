//! Route handlers grouped by domain.

pub mod admin;
pub mod blob;
pub mod health;
pub mod internal;
pub mod link;
pub mod resume;
pub mod share;
pub mod stats;
pub mod upload;
