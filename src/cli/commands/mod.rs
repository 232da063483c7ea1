//! Command implementations for the pkgsieve CLI
//!
//! Each subcommand is organized into its own module.

pub mod config;
pub mod filter;
