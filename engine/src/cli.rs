//! CLI interface for DLX
//!
//! This module provides the command-line interface using clap's derive API.
//! It defines all commands and global flags for running the command center.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DLX Command Center
///
/// Runs the directive/agent orchestration server, its compliance and health
/// monitors, and the AI and remote-desktop proxies the dashboard talks to.
#[derive(Parser, Debug)]
#[command(name = "dlx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log: Option<String>,

    /// Specify alternate configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the command center server in the foreground
    Serve {
        /// Override the configured listen address
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run system diagnostics
    Doctor,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,
}
