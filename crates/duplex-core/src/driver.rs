//! # Driver Module
//!
//! Advances stages until they stop.
//!
//! A stage is inert until something drives it. The [`Driver`] is that
//! something for the reference engine:
//! - [`Driver::run`] executes a closed pipeline ([`Effect`]) to termination,
//!   running every embedded action against the caller's context.
//! - [`Driver::drive`] executes an open stage, answering its requests and
//!   resuming its responds from a [`Script`], and records a [`Trace`].
//!
//! Driving is single-threaded and synchronous. When a script runs dry the
//! pending continuation is dropped without running, which is how a
//! pipeline is cancelled.
//!
//! The step budget counts what the driver sees: effects, plus requests and
//! responds on the outer channels. Composition resolves inner round trips
//! on its own, so an effect-free loop between two composed stages runs
//! until it terminates, however long that takes.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::primitives::DEFAULT_MAX_STEPS;
use crate::stage::{Effect, Stage};
use crate::types::{DuplexError, Event, Outcome, Script, Trace};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Driver limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Maximum number of steps before the driver gives up. Zero means
    /// unlimited.
    ///
    /// A step is one effect, or one request or respond that reaches the
    /// driver. Round trips fused inside a composed pipeline never reach
    /// the driver and are not counted, so a pipeline that loops without
    /// effects or outer suspensions is not bounded by this limit.
    pub max_steps: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl DriverConfig {
    /// A configuration with the given step limit.
    #[must_use]
    pub const fn with_max_steps(max_steps: u64) -> Self {
        Self { max_steps }
    }

    /// A configuration with no step limit.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { max_steps: 0 }
    }

    /// Check whether `steps` already taken leave room for one more.
    #[must_use]
    pub const fn allows(&self, steps: u64) -> bool {
        self.max_steps == 0 || steps < self.max_steps
    }
}

// =============================================================================
// DRIVER
// =============================================================================

/// Runs reference-engine stages.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    config: DriverConfig,
}

impl Driver {
    /// Create a driver with the default step limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver with explicit limits.
    #[must_use]
    pub const fn with_config(config: DriverConfig) -> Self {
        Self { config }
    }

    /// The limits this driver enforces.
    #[must_use]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Run a closed pipeline to termination.
    ///
    /// Returns `DuplexError::StepLimitExceeded` if the pipeline is still
    /// running when the step limit is reached.
    pub fn run<Ctx, R>(&self, effect: Effect<Ctx, R>, ctx: &mut Ctx) -> Result<R, DuplexError>
    where
        Ctx: 'static,
        R: 'static,
    {
        let mut stage = effect;
        let mut steps: u64 = 0;
        loop {
            match stage {
                Stage::Pure(result) => {
                    debug!(steps, "pipeline finished");
                    return Ok(result);
                }
                Stage::Effect(action) => {
                    if !self.config.allows(steps) {
                        warn!(limit = self.config.max_steps, "step limit exceeded");
                        return Err(DuplexError::StepLimitExceeded {
                            limit: self.config.max_steps,
                        });
                    }
                    steps += 1;
                    trace!(step = steps, "effect");
                    stage = action(ctx);
                }
                Stage::Request(never, _) => return Ok(never.absurd()),
                Stage::Respond(never, _) => return Ok(never.absurd()),
            }
        }
    }

    /// Drive an open stage against a script, recording what it emits.
    ///
    /// Stops when the stage terminates ([`Outcome::Finished`]), when the
    /// script has no input for the pending suspension ([`Outcome::Stalled`]),
    /// or when the step limit is reached ([`Outcome::Exhausted`]).
    pub fn drive<UReq, UResp, DReq, DResp, Ctx, R>(
        &self,
        stage: Stage<UReq, UResp, DReq, DResp, Ctx, R>,
        script: &mut Script<UResp, DReq>,
        ctx: &mut Ctx,
    ) -> Trace<UReq, DResp, R> {
        let mut trace = Trace::new();
        let mut stage = stage;
        let mut steps: u64 = 0;
        loop {
            if let Stage::Pure(result) = stage {
                debug!(steps, events = trace.events.len(), "stage finished");
                trace.outcome = Outcome::Finished(result);
                return trace;
            }
            if !self.config.allows(steps) {
                warn!(limit = self.config.max_steps, "step limit exceeded");
                trace.outcome = Outcome::Exhausted;
                return trace;
            }
            steps += 1;
            stage = match stage {
                Stage::Request(value, resume) => {
                    trace.events.push(Event::Requested(value));
                    match script.next_upstream() {
                        Some(resp) => resume(resp),
                        None => {
                            debug!(steps, "stalled on request");
                            trace.outcome = Outcome::Stalled;
                            return trace;
                        }
                    }
                }
                Stage::Respond(value, resume) => {
                    trace.events.push(Event::Responded(value));
                    match script.next_downstream() {
                        Some(req) => resume(req),
                        None => {
                            debug!(steps, "stalled on respond");
                            trace.outcome = Outcome::Stalled;
                            return trace;
                        }
                    }
                }
                Stage::Effect(action) => {
                    trace.effects += 1;
                    trace!(step = steps, "effect");
                    action(ctx)
                }
                Stage::Pure(result) => Stage::Pure(result),
            };
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
