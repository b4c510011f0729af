//! Resume lifecycle.

pub mod service;

pub use service::{ConfirmUpload, ResumeService};
