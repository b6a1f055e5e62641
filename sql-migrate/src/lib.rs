//! Replication-safe, file-based SQL migration engine and dialect client
//! manager, built on top of `sql_core`'s dialect transformer.

pub mod client;
pub mod engine;
pub mod error;

pub use client::{ClientManager, ConnectionConfig};
pub use engine::{MigrationEngine, MigrationFile};
pub use error::{MigrateError, Result};
