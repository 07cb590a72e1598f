//! # Duplex CLI Module
//!
//! This module implements the CLI interface for duplex.
//!
//! ## Available Commands
//!
//! - `scenario` - Run the collect-three scenario
//! - `laws` - Check the stage laws on the reference engine
//! - `pipe` - Run a line pipeline from a file or stdin to stdout

mod commands;

use crate::config::AppConfig;
use crate::console::PipeOptions;
use clap::{Parser, Subcommand};
use duplex_core::DuplexError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Duplex - bidirectional pipeline stages
///
/// Runs pipelines built from stages that request from upstream, respond
/// downstream and embed effects, and checks the laws they obey.
#[derive(Parser, Debug)]
#[command(name = "duplex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress summary output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Driver step limit (0 = unlimited); overrides the config file
    #[arg(long, global = true)]
    pub max_steps: Option<u64>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the collect-three scenario and print the collected values
    Scenario,

    /// Check the stage laws on the reference engine
    Laws {
        /// Seeds every fixture is started with (comma-separated)
        #[arg(short, long, value_delimiter = ',')]
        seeds: Vec<u32>,
    },

    /// Copy lines from a file or stdin to stdout through a pipeline
    Pipe {
        /// Input file (stdin when absent)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Keep only lines containing this text
        #[arg(short, long)]
        grep: Option<String>,

        /// Number the output lines
        #[arg(short, long)]
        number: bool,

        /// Stop after this many lines
        #[arg(short, long)]
        take: Option<usize>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), DuplexError> {
    let config = AppConfig::resolve(cli.config.as_deref(), cli.max_steps)?;
    if cli.verbose {
        tracing::info!(
            max_steps = config.driver().max_steps,
            pipe_max_steps = config.pipe_driver().max_steps,
            "driver configured"
        );
    }

    let json_mode = cli.json_mode;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Some(Commands::Scenario) => cmd_scenario(&mut stdout, &config, json_mode),
        Some(Commands::Laws { seeds }) => {
            cmd_laws(&mut stdout, &config, json_mode, cli.quiet, seeds).map(|_| ())
        }
        Some(Commands::Pipe {
            input,
            grep,
            number,
            take,
        }) => {
            drop(stdout);
            let options = PipeOptions { grep, number, take };
            let summary = cmd_pipe(input.as_deref(), &options, &config)?;
            if !cli.quiet {
                print_pipe_summary(&mut std::io::stderr(), &summary, json_mode)?;
            }
            Ok(())
        }
        None => {
            // No subcommand - run the scenario by default
            cmd_scenario(&mut stdout, &config, json_mode)
        }
    }
}
