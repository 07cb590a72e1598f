//! # Console Pipeline
//!
//! Line-oriented stages over a reader and a writer.
//!
//! ```text
//! read_lines >-> [grep] >-> [number] >-> [take n] >-> write_lines
//! ```
//!
//! The reader and writer live in a [`Console`], which is the effect
//! context of the pipeline. Only [`read_lines`] and [`write_lines`] touch
//! it, through embedded effects; the stages in between are plain
//! duplex-core combinators. The pipeline ends when input runs out, when
//! `take` has forwarded enough lines, or when a write fails.

use std::io::{self, BufRead, Write};

use duplex_core::combinators::{filter, map, take};
use duplex_core::{
    Compositor, Consumer, Driver, DuplexError, Effect, Producer, Reference, embed, pure, request,
    respond,
};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

// =============================================================================
// CONSOLE (Effect Context)
// =============================================================================

/// Reader, writer and counters shared by every effect of a pipeline run.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
    lines_read: u64,
    lines_written: u64,
    error: Option<io::Error>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console over `input` and `output`.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            lines_read: 0,
            lines_written: 0,
            error: None,
        }
    }

    /// The writer, with everything written so far.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Read one line without its terminator. `None` at end of input or on
    /// the first read error.
    fn read_line(&mut self) -> Option<String> {
        if self.error.is_some() {
            return None;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                self.lines_read += 1;
                Some(line)
            }
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Write one line. Returns false once a write has failed.
    fn write_line(&mut self, line: &str) -> bool {
        if self.error.is_some() {
            return false;
        }
        match writeln!(self.output, "{}", line) {
            Ok(()) => {
                self.lines_written += 1;
                true
            }
            Err(e) => {
                self.error = Some(e);
                false
            }
        }
    }

    /// Flush the writer and report the run, or the first I/O error.
    pub fn finish(&mut self) -> Result<PipeSummary, DuplexError> {
        if let Some(e) = self.error.take() {
            return Err(DuplexError::IoError(format!("Console pipeline failed: {}", e)));
        }
        self.output
            .flush()
            .map_err(|e| DuplexError::IoError(format!("Cannot flush output: {}", e)))?;
        Ok(PipeSummary {
            lines_read: self.lines_read,
            lines_written: self.lines_written,
        })
    }
}

/// Counters of a finished pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipeSummary {
    pub lines_read: u64,
    pub lines_written: u64,
}

/// Which optional stages sit between the reader and the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeOptions {
    /// Keep only lines containing this text.
    pub grep: Option<String>,
    /// Prefix each line with its 1-based position in the output.
    pub number: bool,
    /// Stop after this many lines.
    pub take: Option<usize>,
}

// =============================================================================
// STAGES
// =============================================================================

/// Respond with every line of the console's input, then terminate.
pub fn read_lines<R, W>() -> Producer<String, Console<R, W>, ()>
where
    R: BufRead + 'static,
    W: Write + 'static,
{
    embed(|console: &mut Console<R, W>| console.read_line()).and_then(|line| match line {
        Some(line) => respond(line).and_then(|()| read_lines::<R, W>()),
        None => pure(()),
    })
}

/// Write every line received to the console's output.
///
/// Terminates on the first failed write.
pub fn write_lines<R, W>() -> Consumer<String, Console<R, W>, ()>
where
    R: BufRead + 'static,
    W: Write + 'static,
{
    request(()).and_then(|line: String| {
        embed(move |console: &mut Console<R, W>| console.write_line(&line)).and_then(|written| {
            if written {
                write_lines::<R, W>()
            } else {
                pure(())
            }
        })
    })
}

/// Assemble the closed pipeline for `options`.
pub fn pipeline<R, W>(options: &PipeOptions) -> Effect<Console<R, W>, ()>
where
    R: BufRead + 'static,
    W: Write + 'static,
{
    let mut source: Producer<String, Console<R, W>, ()> = read_lines();

    if let Some(needle) = options.grep.clone() {
        let keep = filter::<Reference, String, Console<R, W>, (), _>(move |line: &String| {
            line.contains(needle.as_str())
        });
        source = Compositor::connect(move |()| source, keep);
    }

    if options.number {
        let mut position: u64 = 0;
        let numbered = map::<Reference, String, String, Console<R, W>, (), _>(move |line| {
            position += 1;
            format!("{:>6}\t{}", position, line)
        });
        source = Compositor::connect(move |()| source, numbered);
    }

    if let Some(n) = options.take {
        source = Compositor::connect(move |()| source, take::<Reference, String, Console<R, W>>(n));
    }

    Compositor::connect(move |()| source, write_lines::<R, W>())
}

/// Run the pipeline for `options` against `console`.
pub fn run_pipe<R, W>(
    console: &mut Console<R, W>,
    options: &PipeOptions,
    config: &AppConfig,
) -> Result<PipeSummary, DuplexError>
where
    R: BufRead + 'static,
    W: Write + 'static,
{
    Driver::with_config(config.pipe_driver()).run(pipeline(options), console)?;
    let summary = console.finish()?;
    tracing::info!(
        lines_read = summary.lines_read,
        lines_written = summary.lines_written,
        "pipe finished"
    );
    Ok(summary)
}

// =============================================================================
// TESTS
// =============================================================================
