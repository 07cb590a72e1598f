//! # Core Type Definitions
//!
//! This module contains the channel-level and driver-level types shared by
//! every part of the stage algebra:
//! - The uninhabited channel type (`Closed`)
//! - Driver input (`Script`)
//! - Driver output (`Event`, `Outcome`, `Trace`)
//! - Error types (`DuplexError`)
//!
//! ## Determinism Guarantees
//!
//! Traces record events in the exact order a stage emitted them. Two stages
//! are observationally equal under a script when their traces and effect
//! contexts are equal after driving.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

// =============================================================================
// CLOSED CHANNEL
// =============================================================================

/// A channel type with no values.
///
/// Using `Closed` as a request or response type seals that end of a stage:
/// a stage of type `Stage<Closed, (), _, _, _, _>` can never request, and
/// one of type `Stage<_, _, (), Closed, _, _>` can never respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Closed {}

impl Closed {
    /// Eliminate an impossible value.
    pub fn absurd<T>(self) -> T {
        match self {}
    }
}

// =============================================================================
// SCRIPT (Driver Input)
// =============================================================================

/// Finite supply of inputs for driving an open stage.
///
/// `upstream` answers the stage's requests in order; `downstream` supplies
/// the requests that resume it after each respond. A driver stops with
/// [`Outcome::Stalled`] when the queue it needs is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script<UResp, DReq> {
    /// Responses handed back for each upstream request, in order.
    pub upstream: VecDeque<UResp>,
    /// Requests handed back after each downstream respond, in order.
    pub downstream: VecDeque<DReq>,
}

impl<UResp, DReq> Script<UResp, DReq> {
    /// Create a script from the two input sequences.
    #[must_use]
    pub fn new(
        upstream: impl IntoIterator<Item = UResp>,
        downstream: impl IntoIterator<Item = DReq>,
    ) -> Self {
        Self {
            upstream: upstream.into_iter().collect(),
            downstream: downstream.into_iter().collect(),
        }
    }

    /// Take the next upstream response, if any remain.
    pub fn next_upstream(&mut self) -> Option<UResp> {
        self.upstream.pop_front()
    }

    /// Take the next downstream request, if any remain.
    pub fn next_downstream(&mut self) -> Option<DReq> {
        self.downstream.pop_front()
    }

    /// Check whether both queues are drained.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.upstream.is_empty() && self.downstream.is_empty()
    }
}

// =============================================================================
// TRACE (Driver Output)
// =============================================================================

/// A single observable suspension of a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event<UReq, DResp> {
    /// The stage emitted an upstream request.
    Requested(UReq),
    /// The stage emitted a downstream response.
    Responded(DResp),
}

/// How a driven stage stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<R> {
    /// The stage terminated with a result.
    Finished(R),
    /// The stage suspended and the script had no input to resume it.
    /// The pending continuation was dropped without running.
    Stalled,
    /// The driver's step limit ran out before the stage stopped.
    Exhausted,
}

impl<R> Outcome<R> {
    /// Return the terminal result, if the stage finished.
    pub fn finished(self) -> Option<R> {
        match self {
            Outcome::Finished(r) => Some(r),
            Outcome::Stalled | Outcome::Exhausted => None,
        }
    }
}

/// Ordered record of what a stage did while being driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace<UReq, DResp, R> {
    /// Requests and responses, in emission order.
    pub events: Vec<Event<UReq, DResp>>,
    /// Number of effect steps executed.
    pub effects: u64,
    /// Why driving stopped.
    pub outcome: Outcome<R>,
}

impl<UReq, DResp, R> Trace<UReq, DResp, R> {
    /// Create an empty trace that has not stopped yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            effects: 0,
            outcome: Outcome::Stalled,
        }
    }

    /// All emitted downstream responses, in order.
    pub fn responses(&self) -> Vec<&DResp> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Responded(value) => Some(value),
                Event::Requested(_) => None,
            })
            .collect()
    }

    /// All emitted upstream requests, in order.
    pub fn requests(&self) -> Vec<&UReq> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Requested(value) => Some(value),
                Event::Responded(_) => None,
            })
            .collect()
    }
}

impl<UReq, DResp, R> Default for Trace<UReq, DResp, R> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by drivers, the conformance suite and tooling.
///
/// The primitive stage interface itself never fails at run time: channel
/// mismatches are rejected by the type checker before anything runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DuplexError {
    /// A closed pipeline did not terminate within the configured step limit.
    #[error("Step limit exceeded: pipeline still running after {limit} steps")]
    StepLimitExceeded { limit: u64 },

    /// Two sides of an algebraic law were observably different.
    #[error("Law violated: {law}: {detail}")]
    LawViolation { law: String, detail: String },

    /// An I/O error occurred in an effect context.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================
