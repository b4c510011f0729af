//! Administrative maintenance.

pub mod retention;

pub use retention::{RetentionReport, RetentionService};
