//! In-process implementation of every repository trait.
//!
//! All tables live behind a single `tokio::sync::RwLock`, so every
//! repository method is one atomic unit of work. State is lost on restart
//! and is not shared between instances.

mod store;

pub use store::MemoryDatabase;
