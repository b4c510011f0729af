//! # resumevault-entity
//!
//! Domain entity models for ResumeVault. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod access;
pub mod application;
pub mod identity;
pub mod job;
pub mod resume;
pub mod share;
pub mod stats;
pub mod upload;
