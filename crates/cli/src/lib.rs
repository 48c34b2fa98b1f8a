//! Command-line front end for the rulebook assistant.
//!
//! Shared by the `rulebook` and `rulebook-index` binaries.

pub mod commands;
pub mod output;
