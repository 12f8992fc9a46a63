//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod input;
pub mod process;
