//! Command handlers for the rulebook binaries.

pub mod index;
pub mod query;

pub use index::IndexCommand;
pub use query::QueryCommand;
