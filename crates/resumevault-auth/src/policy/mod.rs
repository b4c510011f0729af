//! Grant & visibility model.

pub mod grant;

pub use grant::{Decision, DenyReason, GrantEvaluator};
