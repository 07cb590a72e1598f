//! # Compositor Module
//!
//! Joins stages end to end.
//!
//! Two categories live here:
//! - **Pull** (`compose`, unit [`identity`](crate::primitives::identity)):
//!   the downstream stage drives; each of its requests runs the upstream
//!   stage until it responds.
//! - **Push** (`push_compose`, unit [`push`](crate::primitives::push)):
//!   the upstream stage drives; each of its responses runs the downstream
//!   stage until it requests.
//!
//! Both are built from one loop over a `Link`, which holds whichever side
//! is currently running plus the parked continuation of the other side. A
//! respond meeting a request is resolved inside the loop, so fused round
//! trips never grow the call stack.
//!
//! Channel types must line up exactly; a mismatch does not compile:
//!
//! ```compile_fail
//! use duplex_core::compositor::Compositor;
//! use duplex_core::primitives::{request, respond};
//! use duplex_core::Stage;
//!
//! // Upstream answers with `String`, downstream expects `u32`.
//! let up = |_: ()| -> Stage<(), (), (), String, (), ()> {
//!     respond("one".to_string()).map(|_| ())
//! };
//! let down = |_: ()| -> Stage<(), u32, (), (), (), ()> { request(()).map(|_| ()) };
//! let _pipeline = Compositor::compose(up, down);
//! ```

use crate::stage::Stage;

/// Which side of a connection is running.
enum Link<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R> {
    /// Downstream runs; upstream is parked waiting for a request.
    Pull(
        Box<dyn FnOnce(BReq) -> Stage<AReq, AResp, BReq, BResp, Ctx, R>>,
        Stage<BReq, BResp, CReq, CResp, Ctx, R>,
    ),
    /// Upstream runs; downstream is parked waiting for a response.
    Push(
        Stage<AReq, AResp, BReq, BResp, Ctx, R>,
        Box<dyn FnOnce(BResp) -> Stage<BReq, BResp, CReq, CResp, Ctx, R>>,
    ),
}

impl<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R>
    Link<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R>
where
    AReq: 'static,
    AResp: 'static,
    BReq: 'static,
    BResp: 'static,
    CReq: 'static,
    CResp: 'static,
    Ctx: 'static,
    R: 'static,
{
    /// Advance until the pipeline suspends on an outer channel, needs an
    /// effect, or terminates.
    fn run(self) -> Stage<AReq, AResp, CReq, CResp, Ctx, R> {
        let mut link = self;
        loop {
            link = match link {
                Link::Pull(upstream, downstream) => match downstream {
                    Stage::Request(req, resume) => Link::Push(upstream(req), resume),
                    Stage::Respond(value, resume) => {
                        return Stage::Respond(
                            value,
                            Box::new(move |next| Link::Pull(upstream, resume(next)).run()),
                        );
                    }
                    Stage::Effect(action) => {
                        return Stage::Effect(Box::new(move |ctx| {
                            Link::Pull(upstream, action(ctx)).run()
                        }));
                    }
                    Stage::Pure(result) => return Stage::Pure(result),
                },
                Link::Push(upstream, downstream) => match upstream {
                    Stage::Request(req, resume) => {
                        return Stage::Request(
                            req,
                            Box::new(move |resp| Link::Push(resume(resp), downstream).run()),
                        );
                    }
                    Stage::Respond(value, resume) => Link::Pull(resume, downstream(value)),
                    Stage::Effect(action) => {
                        return Stage::Effect(Box::new(move |ctx| {
                            Link::Push(action(ctx), downstream).run()
                        }));
                    }
                    Stage::Pure(result) => return Stage::Pure(result),
                },
            };
        }
    }
}

/// The Compositor joins the downstream channel of one stage to the upstream
/// channel of another.
///
/// The joined channel disappears from the resulting type: composing
/// `Stage<A.., B..>` with `Stage<B.., C..>` gives `Stage<A.., C..>`.
pub struct Compositor;

impl Compositor {
    /// Serve every request of `downstream` by running `upstream`.
    ///
    /// `upstream` is started with the first request `downstream` makes.
    /// If `downstream` terminates first, `upstream` is never started.
    pub fn connect<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, F>(
        upstream: F,
        downstream: Stage<BReq, BResp, CReq, CResp, Ctx, R>,
    ) -> Stage<AReq, AResp, CReq, CResp, Ctx, R>
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: FnOnce(BReq) -> Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
    {
        Link::Pull(Box::new(upstream), downstream).run()
    }

    /// Deliver every response of `upstream` to `downstream`.
    ///
    /// `downstream` is started with the first response `upstream` makes.
    /// If `upstream` terminates first, `downstream` is never started.
    pub fn feed<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, G>(
        upstream: Stage<AReq, AResp, BReq, BResp, Ctx, R>,
        downstream: G,
    ) -> Stage<AReq, AResp, CReq, CResp, Ctx, R>
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        G: FnOnce(BResp) -> Stage<BReq, BResp, CReq, CResp, Ctx, R> + 'static,
    {
        Link::Push(upstream, Box::new(downstream)).run()
    }

    /// Pull composition, upstream first (`f >-> g`).
    ///
    /// Associative, with [`identity`](crate::primitives::identity) as unit
    /// on both sides.
    pub fn compose<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
        f: F,
        g: G,
    ) -> impl FnOnce(Seed) -> Stage<AReq, AResp, CReq, CResp, Ctx, R> + 'static
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        Seed: 'static,
        F: FnOnce(BReq) -> Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
        G: FnOnce(Seed) -> Stage<BReq, BResp, CReq, CResp, Ctx, R> + 'static,
    {
        move |seed| Self::connect(f, g(seed))
    }

    /// Pull composition, downstream first (`g <-< f`).
    pub fn compose_rev<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
        g: G,
        f: F,
    ) -> impl FnOnce(Seed) -> Stage<AReq, AResp, CReq, CResp, Ctx, R> + 'static
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        Seed: 'static,
        F: FnOnce(BReq) -> Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
        G: FnOnce(Seed) -> Stage<BReq, BResp, CReq, CResp, Ctx, R> + 'static,
    {
        Self::compose(f, g)
    }

    /// Push composition, upstream first (`f >~> g`).
    ///
    /// Associative, with [`push`](crate::primitives::push) as unit on both
    /// sides.
    pub fn push_compose<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
        f: F,
        g: G,
    ) -> impl FnOnce(Seed) -> Stage<AReq, AResp, CReq, CResp, Ctx, R> + 'static
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        Seed: 'static,
        F: FnOnce(Seed) -> Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
        G: FnOnce(BResp) -> Stage<BReq, BResp, CReq, CResp, Ctx, R> + 'static,
    {
        move |seed| Self::feed(f(seed), g)
    }

    /// Push composition, downstream first (`g <~< f`).
    pub fn push_compose_rev<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
        g: G,
        f: F,
    ) -> impl FnOnce(Seed) -> Stage<AReq, AResp, CReq, CResp, Ctx, R> + 'static
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        Seed: 'static,
        F: FnOnce(Seed) -> Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
        G: FnOnce(BResp) -> Stage<BReq, BResp, CReq, CResp, Ctx, R> + 'static,
    {
        Self::push_compose(f, g)
    }
}

// =============================================================================
// TESTS
// =============================================================================
