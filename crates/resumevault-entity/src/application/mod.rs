//! Marketplace application references.

pub mod model;

pub use model::Application;
