//! Resume domain entities.

pub mod model;
pub mod status;

pub use model::{CreateResume, Resume};
pub use status::{ScanStatus, Visibility};
