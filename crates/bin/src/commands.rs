//! Subcommand implementations.

pub mod items;
pub mod list;
