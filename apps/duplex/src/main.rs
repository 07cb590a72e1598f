//! # Duplex - Pipeline Driver
//!
//! The main binary for the duplex stage algebra.
//!
//! This application provides:
//! - The collect-three scenario on the reference engine
//! - A conformance run over the stage laws
//! - A console pipeline (read, grep, number, take, write)
//!
//! ## Usage
//!
//! ```bash
//! # Run the scenario
//! duplex scenario
//!
//! # Check the laws over extra seeds, report as JSON
//! duplex --json-mode laws --seeds 0,7,1000
//!
//! # Console pipeline
//! duplex pipe --input notes.txt --grep TODO --number --take 10
//! cat notes.txt | duplex --max-steps 0 pipe
//! ```

use clap::Parser;
use duplex::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // DUPLEX_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("DUPLEX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "duplex=info,duplex_core=warn".into());

    // Logs go to stderr so they never mix with pipeline output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
