//! Shared database schema, migrations, and query builders.
//!
//! Every builder returns `(sql, values)` for the server's rusqlite adapter.

pub mod entries;
pub mod migrations;
pub mod moods;
pub mod sessions;
pub mod tables;
pub mod tasks;
pub mod users;
pub mod wipe;

// Re-export tables for convenience
pub use tables::*;

/// A built statement: SQL text plus positional values.
pub type Built = (String, sea_query::Values);
