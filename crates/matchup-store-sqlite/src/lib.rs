//! SQLite backend for the matchup participant store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. The claim and clear
//! operations run inside SQLite transactions, which is what gives the
//! engine its two-sided-edge atomicity.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
