//! # Substitution Module
//!
//! Rewrites the requests or responds *inside* a stage instead of joining
//! two stages end to end.
//!
//! - [`for_each_respond`] (`stage //> f`): every `respond(b)` in `stage`
//!   becomes `f(b)`; the result of `f(b)` resumes `stage`.
//! - [`for_each_request`] (`f >\\ stage`): every `request(b)` in `stage`
//!   becomes `f(b)`; the result of `f(b)` resumes `stage`.
//!
//! Lifted to functions they form two categories:
//!
//! | Operation              | Identity  | Law                                  |
//! |------------------------|-----------|--------------------------------------|
//! | `substitute_responds`  | `respond` | `(f />/ g) />/ h == f />/ (g />/ h)` |
//! | `substitute_requests`  | `request` | `(f \>\ g) \>\ h == f \>\ (g \>\ h)` |
//!
//! The substituted function is called once per occurrence, so it must be
//! `Fn`; it is shared between continuations through an `Rc`.

use std::rc::Rc;

use crate::stage::Stage;

/// Replace every respond in `stage` with a call to `each`.
///
/// A replacement that terminates immediately resumes `stage` in place, so
/// long runs of pure replacements use constant stack.
pub fn for_each_respond<XReq, XResp, BReq, BResp, CReq, CResp, Ctx, R, F>(
    stage: Stage<XReq, XResp, BReq, BResp, Ctx, R>,
    each: F,
) -> Stage<XReq, XResp, CReq, CResp, Ctx, R>
where
    XReq: 'static,
    XResp: 'static,
    BReq: 'static,
    BResp: 'static,
    CReq: 'static,
    CResp: 'static,
    Ctx: 'static,
    R: 'static,
    F: Fn(BResp) -> Stage<XReq, XResp, CReq, CResp, Ctx, BReq> + 'static,
{
    respond_loop(stage, Rc::new(each))
}

fn respond_loop<XReq, XResp, BReq, BResp, CReq, CResp, Ctx, R, F>(
    stage: Stage<XReq, XResp, BReq, BResp, Ctx, R>,
    each: Rc<F>,
) -> Stage<XReq, XResp, CReq, CResp, Ctx, R>
where
    XReq: 'static,
    XResp: 'static,
    BReq: 'static,
    BResp: 'static,
    CReq: 'static,
    CResp: 'static,
    Ctx: 'static,
    R: 'static,
    F: Fn(BResp) -> Stage<XReq, XResp, CReq, CResp, Ctx, BReq> + 'static,
{
    let mut stage = stage;
    loop {
        match stage {
            Stage::Request(req, resume) => {
                return Stage::Request(
                    req,
                    Box::new(move |resp| respond_loop(resume(resp), each)),
                );
            }
            Stage::Respond(value, resume) => {
                let replacement = each(value);
                match replacement {
                    Stage::Pure(reply) => stage = resume(reply),
                    replacement => {
                        return replacement
                            .and_then(move |reply| respond_loop(resume(reply), each));
                    }
                }
            }
            Stage::Effect(action) => {
                return Stage::Effect(Box::new(move |ctx| respond_loop(action(ctx), each)));
            }
            Stage::Pure(result) => return Stage::Pure(result),
        }
    }
}

/// Replace every request in `stage` with a call to `each`.
///
/// A replacement that terminates immediately resumes `stage` in place, so
/// long runs of pure replacements use constant stack.
pub fn for_each_request<AReq, AResp, BReq, BResp, YReq, YResp, Ctx, R, F>(
    each: F,
    stage: Stage<BReq, BResp, YReq, YResp, Ctx, R>,
) -> Stage<AReq, AResp, YReq, YResp, Ctx, R>
where
    AReq: 'static,
    AResp: 'static,
    BReq: 'static,
    BResp: 'static,
    YReq: 'static,
    YResp: 'static,
    Ctx: 'static,
    R: 'static,
    F: Fn(BReq) -> Stage<AReq, AResp, YReq, YResp, Ctx, BResp> + 'static,
{
    request_loop(Rc::new(each), stage)
}

fn request_loop<AReq, AResp, BReq, BResp, YReq, YResp, Ctx, R, F>(
    each: Rc<F>,
    stage: Stage<BReq, BResp, YReq, YResp, Ctx, R>,
) -> Stage<AReq, AResp, YReq, YResp, Ctx, R>
where
    AReq: 'static,
    AResp: 'static,
    BReq: 'static,
    BResp: 'static,
    YReq: 'static,
    YResp: 'static,
    Ctx: 'static,
    R: 'static,
    F: Fn(BReq) -> Stage<AReq, AResp, YReq, YResp, Ctx, BResp> + 'static,
{
    let mut stage = stage;
    loop {
        match stage {
            Stage::Request(req, resume) => {
                let replacement = each(req);
                match replacement {
                    Stage::Pure(resp) => stage = resume(resp),
                    replacement => {
                        return replacement.and_then(move |resp| request_loop(each, resume(resp)));
                    }
                }
            }
            Stage::Respond(value, resume) => {
                return Stage::Respond(
                    value,
                    Box::new(move |next| request_loop(each, resume(next))),
                );
            }
            Stage::Effect(action) => {
                return Stage::Effect(Box::new(move |ctx| request_loop(each, action(ctx))));
            }
            Stage::Pure(result) => return Stage::Pure(result),
        }
    }
}

/// Respond-substitution composition (`f />/ g`).
///
/// Runs `f(seed)` with each of its responds replaced by `g`.
pub fn substitute_responds<XReq, XResp, BReq, BResp, CReq, CResp, Ctx, R, Seed, F, G>(
    f: F,
    g: G,
) -> impl Fn(Seed) -> Stage<XReq, XResp, CReq, CResp, Ctx, R> + 'static
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
    F: Fn(Seed) -> Stage<XReq, XResp, BReq, BResp, Ctx, R> + 'static,
    G: Fn(BResp) -> Stage<XReq, XResp, CReq, CResp, Ctx, BReq> + 'static,
{
    let each = Rc::new(g);
    move |seed| respond_loop(f(seed), Rc::clone(&each))
}

/// Request-substitution composition (`f \>\ g`).
///
/// Runs `g(seed)` with each of its requests replaced by `f`.
pub fn substitute_requests<AReq, AResp, BReq, BResp, YReq, YResp, Ctx, R, Seed, F, G>(
    f: F,
    g: G,
) -> impl Fn(Seed) -> Stage<AReq, AResp, YReq, YResp, Ctx, R> + 'static
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
    F: Fn(BReq) -> Stage<AReq, AResp, YReq, YResp, Ctx, BResp> + 'static,
    G: Fn(Seed) -> Stage<BReq, BResp, YReq, YResp, Ctx, R> + 'static,
{
    let each = Rc::new(f);
    move |seed| request_loop(Rc::clone(&each), g(seed))
}

// =============================================================================
// TESTS
// =============================================================================
