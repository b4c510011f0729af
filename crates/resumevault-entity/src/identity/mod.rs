//! Actor identity entities.

pub mod model;
pub mod role;

pub use model::Identity;
pub use role::Role;
