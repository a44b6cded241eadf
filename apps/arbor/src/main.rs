//! # Arbor - Genealogy Graph Server
//!
//! The main binary for the Arbor family-graph service.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface (serve, demo)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                apps/arbor (THE BINARY)              │
//! │                                                     │
//! │   ┌─────────────┐          ┌─────────────┐          │
//! │   │   CLI       │          │   HTTP API  │          │
//! │   │  (clap)     │          │   (axum)    │          │
//! │   └──────┬──────┘          └──────┬──────┘          │
//! │          │                        │                 │
//! │          └───────────┬────────────┘                 │
//! │                      ▼                              │
//! │              ┌───────────────┐                      │
//! │              │  arbor-core   │                      │
//! │              │  (THE LOGIC)  │                      │
//! │              └───────────────┘                      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! arbor serve --host 0.0.0.0 --port 8080
//!
//! # Print a sample family tree
//! arbor demo
//! ```

use arbor::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Initialize tracing — ARBOR_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("ARBOR_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "arbor=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Arbor startup banner.
fn print_banner() {
    println!(
        r#"
   arbor v{}

   people · parentage · marriage
   trees · generations · kinship
"#,
        env!("CARGO_PKG_VERSION")
    );
}
