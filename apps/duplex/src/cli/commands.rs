//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Commands write their report to the writer they are given, so tests can
//! capture it in memory.

use crate::config::AppConfig;
use crate::console::{Console, PipeOptions, PipeSummary, run_pipe};
use duplex_core::conformance::run_scenario;
use duplex_core::{DuplexError, Probe, Reference, Suite, SuiteReport};
use serde::Serialize;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum input file size for `pipe` (1 GB).
const MAX_PIPE_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Validate an input path: it must exist, be a regular file, and fit the
/// size limit.
fn validate_file_path(path: &Path, max_size: u64) -> Result<PathBuf, DuplexError> {
    let canonical = path.canonicalize().map_err(|e| {
        DuplexError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(DuplexError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| DuplexError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > max_size {
        return Err(DuplexError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }

    Ok(canonical)
}

fn write_err(e: std::io::Error) -> DuplexError {
    DuplexError::IoError(format!("Cannot write output: {}", e))
}

fn write_json(out: &mut impl Write, value: &impl Serialize) -> Result<(), DuplexError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| DuplexError::IoError(format!("Cannot encode JSON output: {}", e)))?;
    writeln!(out, "{}", text).map_err(write_err)
}

// =============================================================================
// SCENARIO COMMAND
// =============================================================================

/// Run the collect-three scenario and print what the downstream collected.
pub fn cmd_scenario(
    out: &mut impl Write,
    config: &AppConfig,
    json_mode: bool,
) -> Result<(), DuplexError> {
    let values = run_scenario::<Reference>(&config.driver())?;
    tracing::debug!(?values, "scenario finished");

    if json_mode {
        let output = serde_json::json!({
            "scenario": "collect_three",
            "collected": values,
        });
        return write_json(out, &output);
    }

    writeln!(out, "Scenario: collect three").map_err(write_err)?;
    writeln!(out, "Collected: {:?}", values).map_err(write_err)
}

// =============================================================================
// LAWS COMMAND
// =============================================================================

/// Run the conformance suite on the reference engine.
///
/// Empty `seeds` means the suite's default seeds. Prints one line per law
/// (or the whole report as JSON) and fails with the first violation.
pub fn cmd_laws(
    out: &mut impl Write,
    config: &AppConfig,
    json_mode: bool,
    quiet: bool,
    seeds: Vec<u32>,
) -> Result<SuiteReport, DuplexError> {
    let defaults = Suite::default();
    let seeds = if seeds.is_empty() {
        defaults.seeds().to_vec()
    } else {
        seeds
    };
    let probe: Probe = defaults.probe().clone().with_config(config.driver());
    let suite = Suite::new(seeds, probe);

    let report = suite.run::<Reference>();
    tracing::info!(
        laws = report.laws.len(),
        cases = report.cases(),
        failures = report.failures(),
        "conformance run finished"
    );

    if json_mode {
        let output = serde_json::json!({
            "engine": "reference",
            "seeds": suite.seeds(),
            "passed": report.passed(),
            "cases": report.cases(),
            "failures": report.failures(),
            "laws": report.laws,
        });
        write_json(out, &output)?;
    } else {
        writeln!(out, "Conformance: reference engine").map_err(write_err)?;
        writeln!(out, "Seeds: {:?}", suite.seeds()).map_err(write_err)?;
        writeln!(out).map_err(write_err)?;
        for law in &report.laws {
            if law.passed() && quiet {
                continue;
            }
            let status = if law.passed() { "PASS" } else { "FAIL" };
            writeln!(out, "{} {:<36} {:>5} cases", status, law.law, law.cases)
                .map_err(write_err)?;
            for failure in &law.failures {
                writeln!(out, "     {}", failure).map_err(write_err)?;
            }
        }
        writeln!(out).map_err(write_err)?;
        writeln!(
            out,
            "{} laws, {} cases, {} failures",
            report.laws.len(),
            report.cases(),
            report.failures()
        )
        .map_err(write_err)?;
    }

    report.into_result()
}

// =============================================================================
// PIPE COMMAND
// =============================================================================

/// Copy lines from `input` (or stdin) to stdout through the console
/// pipeline.
pub fn cmd_pipe(
    input: Option<&Path>,
    options: &PipeOptions,
    config: &AppConfig,
) -> Result<PipeSummary, DuplexError> {
    let output = BufWriter::new(std::io::stdout());

    match input {
        Some(path) => {
            let path = validate_file_path(path, MAX_PIPE_FILE_SIZE)?;
            let file = std::fs::File::open(&path).map_err(|e| {
                DuplexError::IoError(format!("Cannot open '{}': {}", path.display(), e))
            })?;
            tracing::debug!(path = %path.display(), "reading from file");
            let mut console = Console::new(BufReader::new(file), output);
            run_pipe(&mut console, options, config)
        }
        None => {
            let mut console = Console::new(std::io::stdin().lock(), output);
            run_pipe(&mut console, options, config)
        }
    }
}

/// Print the counters of a finished `pipe` run.
pub fn print_pipe_summary(
    out: &mut impl Write,
    summary: &PipeSummary,
    json_mode: bool,
) -> Result<(), DuplexError> {
    if json_mode {
        return write_json(out, summary);
    }
    writeln!(
        out,
        "{} lines read, {} lines written",
        summary.lines_read, summary.lines_written
    )
    .map_err(write_err)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_not_a_valid_input() {
        let dir = std::env::temp_dir();
        let result = validate_file_path(&dir, MAX_PIPE_FILE_SIZE);
        assert!(matches!(result, Err(DuplexError::IoError(_))));
    }

    #[test]
    fn unencodable_json_is_an_error_not_a_blank_line() {
        use std::collections::BTreeMap;

        // JSON object keys must be strings; tuple keys cannot be encoded.
        let value: BTreeMap<(u32, u32), u32> = BTreeMap::from([((1, 2), 3)]);
        let mut out = Vec::new();
        let result = write_json(&mut out, &value);
        assert!(matches!(result, Err(DuplexError::IoError(ref msg)) if msg.contains("JSON")));
        assert!(out.is_empty());
    }

    #[test]
    fn summary_prints_as_json() {
        let mut out = Vec::new();
        let summary = PipeSummary {
            lines_read: 4,
            lines_written: 2,
        };
        print_pipe_summary(&mut out, &summary, true).unwrap();
        let decoded: PipeSummary = serde_json::from_slice(&out).unwrap();
        assert_eq!(decoded, summary);
    }

    #[test]
    fn summary_prints_as_text() {
        let mut out = Vec::new();
        let summary = PipeSummary {
            lines_read: 4,
            lines_written: 2,
        };
        print_pipe_summary(&mut out, &summary, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "4 lines read, 2 lines written\n");
    }
}
