//! SQLite backend for the PenPal store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Collection snapshots are published to
//! subscribers through [`tokio::sync::watch`] channels after every write.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
