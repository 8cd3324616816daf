//! CLI tool for inspecting node-set selection.
//!
//! Provides commands for:
//! - Computing the storage-set size of a log
//! - Selecting the storage set of a log

pub mod cluster_file;
pub mod commands;
pub mod config;

pub use cluster_file::ClusterFile;
pub use commands::{Command, CommandResult};
pub use config::CliConfig;
