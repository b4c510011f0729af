//! # resumevault-auth
//!
//! Who may obtain a link to a resume, and how often.
//!
//! - [`jwt`]: verifies identity-provider bearer tokens into an [`Identity`](resumevault_entity::identity::Identity)
//! - [`policy`]: the grant & visibility model
//! - [`limiter`]: per-(resume, company) access rate limiting

pub mod jwt;
pub mod limiter;
pub mod policy;

pub use jwt::IdentityDecoder;
pub use limiter::{AccessRateLimiter, RateDecision};
pub use policy::{Decision, DenyReason, GrantEvaluator};
