//! # Engine Interface
//!
//! The stage interface as a set of traits, so that algorithms can be written
//! once and run on any engine that satisfies the laws.
//!
//! - [`Engine`]: the primitive operations and pull composition.
//! - [`Substitute`]: the optional request/respond substitution capability.
//! - [`Drive`]: the driver contract used by the conformance suite.
//!
//! An engine names its stage type through the generic associated type
//! [`Engine::Stage`]. Engine-generic code, such as
//! [`crate::combinators`], only ever sees that associated type and the trait
//! methods, never the representation behind it.
//!
//! ## Laws
//!
//! Every implementation must satisfy, observationally:
//!
//! - sequencing: `and_then(pure(v), k) == k(v)`, `and_then(s, pure) == s`,
//!   and `and_then(and_then(s, f), g) == and_then(s, x => and_then(f(x), g))`
//! - composition: `compose(identity, f) == f == compose(f, identity)` and
//!   `compose(compose(f, g), h) == compose(f, compose(g, h))`
//! - fusion: an upstream `and_then(respond(v), k)` connected to a downstream
//!   `and_then(request(q), h)` behaves as `connect(k, h(v))`
//! - effects: embedding an action before a downstream stage commutes with
//!   composition
//!
//! [`crate::conformance`] checks these against fixed stages.

use std::rc::Rc;

use crate::compositor::Compositor;
use crate::driver::{Driver, DriverConfig};
use crate::primitives;
use crate::stage::Stage;
use crate::substitution;
use crate::types::{Script, Trace};

// =============================================================================
// ENGINE
// =============================================================================

/// The primitive stage interface.
pub trait Engine: Sized + 'static {
    /// The engine's stage type.
    type Stage<UReq, UResp, DReq, DResp, Ctx, R>;

    /// A terminated stage.
    fn pure<UReq, UResp, DReq, DResp, Ctx, R>(
        value: R,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static;

    /// Suspend upstream with `value`; the result is the response.
    fn request<UReq, UResp, DReq, DResp, Ctx>(
        value: UReq,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, UResp>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static;

    /// Suspend downstream with `value`; the result is the next request.
    fn respond<UReq, UResp, DReq, DResp, Ctx>(
        value: DResp,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, DReq>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static;

    /// Lift one action of the effect context.
    fn embed<UReq, UResp, DReq, DResp, Ctx, R, F>(
        action: F,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: FnOnce(&mut Ctx) -> R + 'static;

    /// Run `stage` to termination, then `next` with its result.
    fn and_then<UReq, UResp, DReq, DResp, Ctx, R, S, K>(
        stage: Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>,
        next: K,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, S>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static,
        S: 'static,
        K: FnOnce(R) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, S> + 'static;

    /// The transparent forwarder; unit of [`Engine::compose`].
    fn identity<Req, Resp, Ctx, R>(seed: Req) -> Self::Stage<Req, Resp, Req, Resp, Ctx, R>
    where
        Req: 'static,
        Resp: 'static,
        Ctx: 'static,
        R: 'static;

    /// Serve every request of `downstream` by running `upstream`.
    fn connect<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, F>(
        upstream: F,
        downstream: Self::Stage<BReq, BResp, CReq, CResp, Ctx, R>,
    ) -> Self::Stage<AReq, AResp, CReq, CResp, Ctx, R>
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: FnOnce(BReq) -> Self::Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static;

    /// Transform the terminal result.
    fn map<UReq, UResp, DReq, DResp, Ctx, R, S, F>(
        stage: Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>,
        f: F,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, S>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static,
        S: 'static,
        F: FnOnce(R) -> S + 'static,
    {
        Self::and_then::<UReq, UResp, DReq, DResp, Ctx, R, S, _>(stage, move |result| {
            Self::pure::<UReq, UResp, DReq, DResp, Ctx, S>(f(result))
        })
    }

    /// Pull composition (`f >-> g`).
    fn compose<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
        f: F,
        g: G,
    ) -> impl FnOnce(Seed) -> Self::Stage<AReq, AResp, CReq, CResp, Ctx, R> + 'static
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
        F: FnOnce(BReq) -> Self::Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
        G: FnOnce(Seed) -> Self::Stage<BReq, BResp, CReq, CResp, Ctx, R> + 'static,
    {
        move |seed| {
            Self::connect::<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, F>(f, g(seed))
        }
    }

    /// Pull composition with the arguments flipped (`g <-< f`).
    fn compose_rev<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
        g: G,
        f: F,
    ) -> impl FnOnce(Seed) -> Self::Stage<AReq, AResp, CReq, CResp, Ctx, R> + 'static
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
        F: FnOnce(BReq) -> Self::Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
        G: FnOnce(Seed) -> Self::Stage<BReq, BResp, CReq, CResp, Ctx, R> + 'static,
    {
        Self::compose::<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(f, g)
    }
}

// =============================================================================
// SUBSTITUTION CAPABILITY
// =============================================================================

/// Request/respond substitution.
pub trait Substitute: Engine {
    /// Replace every respond in `stage` with `each` (`stage //> each`).
    fn for_each_respond<XReq, XResp, BReq, BResp, CReq, CResp, Ctx, R, F>(
        stage: Self::Stage<XReq, XResp, BReq, BResp, Ctx, R>,
        each: F,
    ) -> Self::Stage<XReq, XResp, CReq, CResp, Ctx, R>
    where
        XReq: 'static,
        XResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: Fn(BResp) -> Self::Stage<XReq, XResp, CReq, CResp, Ctx, BReq> + 'static;

    /// Replace every request in `stage` with `each` (`each >\\ stage`).
    fn for_each_request<AReq, AResp, BReq, BResp, YReq, YResp, Ctx, R, F>(
        each: F,
        stage: Self::Stage<BReq, BResp, YReq, YResp, Ctx, R>,
    ) -> Self::Stage<AReq, AResp, YReq, YResp, Ctx, R>
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        YReq: 'static,
        YResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: Fn(BReq) -> Self::Stage<AReq, AResp, YReq, YResp, Ctx, BResp> + 'static;

    /// Respond-substitution composition (`f />/ g`); unit `respond`.
    fn substitute_responds<XReq, XResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
        f: F,
        g: G,
    ) -> impl Fn(Seed) -> Self::Stage<XReq, XResp, CReq, CResp, Ctx, R> + 'static
    where
        XReq: 'static,
        XResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        Seed: 'static,
        F: Fn(Seed) -> Self::Stage<XReq, XResp, BReq, BResp, Ctx, R> + 'static,
        G: Fn(BResp) -> Self::Stage<XReq, XResp, CReq, CResp, Ctx, BReq> + 'static,
    {
        let each = Rc::new(g);
        move |seed| {
            let each = Rc::clone(&each);
            Self::for_each_respond::<XReq, XResp, BReq, BResp, CReq, CResp, Ctx, R, _>(
                f(seed),
                move |value| each(value),
            )
        }
    }

    /// Request-substitution composition (`f \>\ g`); unit `request`.
    fn substitute_requests<AReq, AResp, BReq, BResp, YReq, YResp, Ctx, R, Seed, F, G>(
        f: F,
        g: G,
    ) -> impl Fn(Seed) -> Self::Stage<AReq, AResp, YReq, YResp, Ctx, R> + 'static
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        YReq: 'static,
        YResp: 'static,
        Ctx: 'static,
        R: 'static,
        Seed: 'static,
        F: Fn(BReq) -> Self::Stage<AReq, AResp, YReq, YResp, Ctx, BResp> + 'static,
        G: Fn(Seed) -> Self::Stage<BReq, BResp, YReq, YResp, Ctx, R> + 'static,
    {
        let each = Rc::new(f);
        move |seed| {
            let each = Rc::clone(&each);
            Self::for_each_request::<AReq, AResp, BReq, BResp, YReq, YResp, Ctx, R, _>(
                move |value| each(value),
                g(seed),
            )
        }
    }
}

// =============================================================================
// DRIVER CONTRACT
// =============================================================================

/// Advancing an engine's stages against a script.
pub trait Drive: Engine {
    /// Drive `stage` until it finishes, stalls, or exhausts `config`'s step
    /// limit, running effects against `ctx`.
    fn drive<UReq, UResp, DReq, DResp, Ctx, R>(
        stage: Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>,
        script: &mut Script<UResp, DReq>,
        ctx: &mut Ctx,
        config: &DriverConfig,
    ) -> Trace<UReq, DResp, R>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static;
}

// =============================================================================
// REFERENCE ENGINE
// =============================================================================

/// The engine backed by [`Stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reference;

impl Engine for Reference {
    type Stage<UReq, UResp, DReq, DResp, Ctx, R> = Stage<UReq, UResp, DReq, DResp, Ctx, R>;

    fn pure<UReq, UResp, DReq, DResp, Ctx, R>(
        value: R,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static,
    {
        primitives::pure(value)
    }

    fn request<UReq, UResp, DReq, DResp, Ctx>(
        value: UReq,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, UResp>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
    {
        primitives::request(value)
    }

    fn respond<UReq, UResp, DReq, DResp, Ctx>(
        value: DResp,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, DReq>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
    {
        primitives::respond(value)
    }

    fn embed<UReq, UResp, DReq, DResp, Ctx, R, F>(
        action: F,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: FnOnce(&mut Ctx) -> R + 'static,
    {
        primitives::embed(action)
    }

    fn and_then<UReq, UResp, DReq, DResp, Ctx, R, S, K>(
        stage: Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>,
        next: K,
    ) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, S>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static,
        S: 'static,
        K: FnOnce(R) -> Self::Stage<UReq, UResp, DReq, DResp, Ctx, S> + 'static,
    {
        stage.and_then(next)
    }

    fn identity<Req, Resp, Ctx, R>(seed: Req) -> Self::Stage<Req, Resp, Req, Resp, Ctx, R>
    where
        Req: 'static,
        Resp: 'static,
        Ctx: 'static,
        R: 'static,
    {
        primitives::identity(seed)
    }

    fn connect<AReq, AResp, BReq, BResp, CReq, CResp, Ctx, R, F>(
        upstream: F,
        downstream: Self::Stage<BReq, BResp, CReq, CResp, Ctx, R>,
    ) -> Self::Stage<AReq, AResp, CReq, CResp, Ctx, R>
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: FnOnce(BReq) -> Self::Stage<AReq, AResp, BReq, BResp, Ctx, R> + 'static,
    {
        Compositor::connect(upstream, downstream)
    }
}

impl Substitute for Reference {
    fn for_each_respond<XReq, XResp, BReq, BResp, CReq, CResp, Ctx, R, F>(
        stage: Self::Stage<XReq, XResp, BReq, BResp, Ctx, R>,
        each: F,
    ) -> Self::Stage<XReq, XResp, CReq, CResp, Ctx, R>
    where
        XReq: 'static,
        XResp: 'static,
        BReq: 'static,
        BResp: 'static,
        CReq: 'static,
        CResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: Fn(BResp) -> Self::Stage<XReq, XResp, CReq, CResp, Ctx, BReq> + 'static,
    {
        substitution::for_each_respond(stage, each)
    }

    fn for_each_request<AReq, AResp, BReq, BResp, YReq, YResp, Ctx, R, F>(
        each: F,
        stage: Self::Stage<BReq, BResp, YReq, YResp, Ctx, R>,
    ) -> Self::Stage<AReq, AResp, YReq, YResp, Ctx, R>
    where
        AReq: 'static,
        AResp: 'static,
        BReq: 'static,
        BResp: 'static,
        YReq: 'static,
        YResp: 'static,
        Ctx: 'static,
        R: 'static,
        F: Fn(BReq) -> Self::Stage<AReq, AResp, YReq, YResp, Ctx, BResp> + 'static,
    {
        substitution::for_each_request(each, stage)
    }
}

impl Drive for Reference {
    fn drive<UReq, UResp, DReq, DResp, Ctx, R>(
        stage: Self::Stage<UReq, UResp, DReq, DResp, Ctx, R>,
        script: &mut Script<UResp, DReq>,
        ctx: &mut Ctx,
        config: &DriverConfig,
    ) -> Trace<UReq, DResp, R>
    where
        UReq: 'static,
        UResp: 'static,
        DReq: 'static,
        DResp: 'static,
        Ctx: 'static,
        R: 'static,
    {
        Driver::with_config(*config).drive(stage, script, ctx)
    }
}

// =============================================================================
// TESTS
// =============================================================================
