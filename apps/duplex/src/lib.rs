//! # duplex
//!
//! Command-line driver for duplex-core.
//!
//! - `cli`: argument parsing and command dispatch
//! - `config`: TOML configuration for the driver
//! - `console`: line-oriented stages whose effects touch real I/O

pub mod cli;
pub mod config;
pub mod console;
