//! Frontend components
//!
//! This module contains the CLI and configuration components that form the
//! user-facing interface of plugwire.

pub mod cli;
pub mod config;

pub use cli::main as cli_main;
pub use config::{Config, LoggingConfig, PartitionConfig};
