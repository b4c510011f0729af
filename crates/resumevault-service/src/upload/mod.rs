//! Two-phase upload protocol.

pub mod token;
pub mod validation;

pub use token::{UploadSlot, UploadTokenManager};
