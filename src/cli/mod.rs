//! Command-line interface for the movie ratings server.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Movie ratings REST API
#[derive(Parser)]
#[command(name = "movie-ratings")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Default)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[default]
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Write a default config file with a fresh signing secret
    Init {
        /// Where to write the file
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Create an administrator account
    CreateAdmin {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

pub use commands::*;
