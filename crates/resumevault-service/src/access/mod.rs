//! Signed-link issuance.

pub mod issuer;

pub use issuer::{IssuedLink, LinkIssuer, LinkRequest};
