//! Command-line interface, parsed with clap.

mod commands;

use clap::{Parser, Subcommand};

/// Bookstore - account and catalog backend
#[derive(Parser)]
#[command(name = "bookstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web API and the background scheduler
    #[command(alias = "-d", alias = "--daemon")]
    Daemon,

    /// Remove accounts that were never activated, once
    #[command(alias = "cleanup")]
    Sweep,

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
