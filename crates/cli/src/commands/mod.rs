//! Subcommand implementations

pub mod estimate;
pub mod health;
pub mod options;
