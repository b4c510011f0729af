//! # resumevault-database
//!
//! Persistence for the ResumeVault engine: PostgreSQL connection management,
//! migrations, one repository trait per entity with a PostgreSQL
//! implementation, and an in-process [`MemoryDatabase`] implementing every
//! trait for single-instance deployments and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use memory::MemoryDatabase;
pub use repositories::Repositories;
