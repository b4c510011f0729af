//! Access log domain entities.

pub mod model;

pub use model::{AccessType, CreateAccessLog, ResumeAccessLog};
