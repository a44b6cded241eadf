//! # Arbor CLI Module
//!
//! This module implements the CLI interface for Arbor.
//!
//! ## Available Commands
//!
//! - `serve` - Start the HTTP server
//! - `demo` - Build a sample family in memory and print its tree

mod commands;

use clap::{Parser, Subcommand};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Arbor - genealogy graph server
///
/// Maintains a graph of people connected by parentage and marriage, with a
/// two-party confirmation workflow, and answers structural queries over it:
/// genealogy trees, generational peers, and kinship labels.
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Build a sample family in memory and print its rendered tree
    Demo,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve { host, port }) => cmd_serve(&host, port).await,
        Some(Commands::Demo) | None => cmd_demo(),
    }
}
