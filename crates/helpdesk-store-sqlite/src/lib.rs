//! SQLite backend for the help desk ticket store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Writes are staged in memory and applied
//! in a single transaction on [`helpdesk_core::store::TicketStore::commit`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
