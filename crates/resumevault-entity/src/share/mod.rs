//! Share (grant) domain entities.

pub mod model;

pub use model::{AccessLevel, CreateShare, ResumeShare, ShareSource};
