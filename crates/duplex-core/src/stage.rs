//! # Stage
//!
//! The reference representation of a bidirectional pipeline stage.
//!
//! A `Stage<UReq, UResp, DReq, DResp, Ctx, R>` is a suspended computation.
//! Each time a driver inspects it, it is in exactly one of four states:
//!
//! | Variant    | Meaning                                               |
//! |------------|-------------------------------------------------------|
//! | `Request`  | emitted `UReq` upstream, waiting for a `UResp`        |
//! | `Respond`  | emitted `DResp` downstream, waiting for a `DReq`      |
//! | `Effect`   | wants one step of the effect context `Ctx`            |
//! | `Pure`     | terminated with `R`                                   |
//!
//! ```text
//!            UReq ◄──┐          ┌──► DResp
//!   upstream         │  Stage   │          downstream
//!           UResp ──►┘          └◄── DReq
//! ```
//!
//! Continuations are boxed `FnOnce` closures: each suspension is resumed at
//! most once, and dropping a stage drops its continuation unrun.

use std::fmt;

use crate::types::Closed;

/// A bidirectional, effectful, suspendable computation.
pub enum Stage<UReq, UResp, DReq, DResp, Ctx, R> {
    /// Suspended on an upstream request.
    Request(
        UReq,
        Box<dyn FnOnce(UResp) -> Stage<UReq, UResp, DReq, DResp, Ctx, R>>,
    ),
    /// Suspended on a downstream response.
    Respond(
        DResp,
        Box<dyn FnOnce(DReq) -> Stage<UReq, UResp, DReq, DResp, Ctx, R>>,
    ),
    /// One step in the effect context.
    Effect(Box<dyn FnOnce(&mut Ctx) -> Stage<UReq, UResp, DReq, DResp, Ctx, R>>),
    /// Terminated.
    Pure(R),
}

// =============================================================================
// ALIASES
// =============================================================================

/// A pipeline closed at both ends. Only effects and termination remain.
pub type Effect<Ctx, R> = Stage<Closed, (), (), Closed, Ctx, R>;

/// Emits values downstream; never requests.
pub type Producer<B, Ctx, R> = Stage<Closed, (), (), B, Ctx, R>;

/// Pulls `A` values, pushes `B` values.
pub type Pipe<A, B, Ctx, R> = Stage<(), A, (), B, Ctx, R>;

/// Pulls values; never responds.
pub type Consumer<A, Ctx, R> = Stage<(), A, (), Closed, Ctx, R>;

/// Sends requests upstream and receives responses; closed downstream.
pub type Client<Req, Resp, Ctx, R> = Stage<Req, Resp, (), Closed, Ctx, R>;

/// Answers requests from downstream; closed upstream.
pub type Server<Req, Resp, Ctx, R> = Stage<Closed, (), Req, Resp, Ctx, R>;

// =============================================================================
// SEQUENCING
// =============================================================================

impl<UReq, UResp, DReq, DResp, Ctx, R> Stage<UReq, UResp, DReq, DResp, Ctx, R>
where
    UReq: 'static,
    UResp: 'static,
    DReq: 'static,
    DResp: 'static,
    Ctx: 'static,
    R: 'static,
{
    /// Run this stage to termination, then continue with `next(result)`.
    ///
    /// Requests, responses and effects of `self` pass through unchanged;
    /// `next` is only invoked once `self` reaches `Pure`.
    pub fn and_then<S, K>(self, next: K) -> Stage<UReq, UResp, DReq, DResp, Ctx, S>
    where
        S: 'static,
        K: FnOnce(R) -> Stage<UReq, UResp, DReq, DResp, Ctx, S> + 'static,
    {
        match self {
            Stage::Request(value, resume) => {
                Stage::Request(value, Box::new(move |resp| resume(resp).and_then(next)))
            }
            Stage::Respond(value, resume) => {
                Stage::Respond(value, Box::new(move |req| resume(req).and_then(next)))
            }
            Stage::Effect(action) => {
                Stage::Effect(Box::new(move |ctx| action(ctx).and_then(next)))
            }
            Stage::Pure(result) => next(result),
        }
    }

    /// Transform the terminal result.
    pub fn map<S, F>(self, f: F) -> Stage<UReq, UResp, DReq, DResp, Ctx, S>
    where
        S: 'static,
        F: FnOnce(R) -> S + 'static,
    {
        self.and_then(move |result| Stage::Pure(f(result)))
    }

    /// Run this stage, discard its result, then run `next`.
    pub fn then<S>(
        self,
        next: Stage<UReq, UResp, DReq, DResp, Ctx, S>,
    ) -> Stage<UReq, UResp, DReq, DResp, Ctx, S>
    where
        S: 'static,
    {
        self.and_then(move |_| next)
    }

    /// Swap the upstream and downstream interfaces.
    ///
    /// Every request becomes a respond and vice versa: a value sent
    /// upstream is now sent downstream, and the answer arrives from below.
    /// Reflecting twice gives back an equivalent stage.
    pub fn reflect(self) -> Stage<DResp, DReq, UResp, UReq, Ctx, R> {
        match self {
            Stage::Request(value, resume) => {
                Stage::Respond(value, Box::new(move |resp| resume(resp).reflect()))
            }
            Stage::Respond(value, resume) => {
                Stage::Request(value, Box::new(move |req| resume(req).reflect()))
            }
            Stage::Effect(action) => Stage::Effect(Box::new(move |ctx| action(ctx).reflect())),
            Stage::Pure(result) => Stage::Pure(result),
        }
    }
}

// =============================================================================
// INSPECTION
// =============================================================================

impl<UReq, UResp, DReq, DResp, Ctx, R> Stage<UReq, UResp, DReq, DResp, Ctx, R> {
    /// Check whether the stage has terminated.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Stage::Pure(_))
    }

    /// Return the result of a terminated stage, or the stage itself.
    pub fn into_result(self) -> Result<R, Self> {
        match self {
            Stage::Pure(result) => Ok(result),
            other => Err(other),
        }
    }
}

impl<UReq, UResp, DReq, DResp, Ctx, R> fmt::Debug for Stage<UReq, UResp, DReq, DResp, Ctx, R>
where
    UReq: fmt::Debug,
    DResp: fmt::Debug,
    R: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Request(value, _) => f.debug_tuple("Request").field(value).finish(),
            Stage::Respond(value, _) => f.debug_tuple("Respond").field(value).finish(),
            Stage::Effect(_) => f.write_str("Effect(..)"),
            Stage::Pure(result) => f.debug_tuple("Pure").field(result).finish(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
