//! CLI module - Command-line interface for Watcharr
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Watcharr - Personal media tracker
/// Tracks what you watched and want to watch, backed by the TMDB catalog
#[derive(Parser)]
#[command(name = "watcharr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server (default when no command is given)
    #[command(alias = "daemon")]
    Serve,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Fill in origin countries for watched items that predate the field
    Backfill,

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Create a new user account
    Add {
        /// Username for the new account
        username: String,
    },

    /// Change a user's password
    Passwd {
        /// Username of the account
        username: String,
    },

    /// Show or regenerate a user's API key
    #[command(name = "api-key", alias = "apikey")]
    ApiKey {
        /// Username of the account
        username: String,

        /// Generate a new key instead of showing the current one
        #[arg(long)]
        regenerate: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Create a default config file in the working directory
    Init,

    /// Print the effective configuration
    Show,
}

pub use commands::*;
