//! # Primitives
//!
//! The constructors every stage is built from.
//!
//! 1. **`request`**: suspend upstream, resume with the response.
//! 2. **`respond`**: suspend downstream, resume with the next request.
//! 3. **`pure`**: terminate with a value.
//! 4. **`embed`**: lift one action of the effect context.
//! 5. **`identity`** / **`push`**: the transparent forwarders that are the
//!    units of pull and push composition.
//!
//! Sequencing is [`Stage::and_then`]; composition lives in
//! [`crate::compositor`].

use crate::stage::Stage;

/// Default step budget for drivers.
///
/// A step is one effect or outer request/respond seen by the driver;
/// fused round trips inside a pipeline are free. Zero disables the limit.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

/// Emit `value` upstream and resume with the matching response.
pub fn request<UReq, UResp, DReq, DResp, Ctx>(
    value: UReq,
) -> Stage<UReq, UResp, DReq, DResp, Ctx, UResp>
where
    UReq: 'static,
    UResp: 'static,
    DReq: 'static,
    DResp: 'static,
    Ctx: 'static,
{
    Stage::Request(value, Box::new(Stage::Pure))
}

/// Emit `value` downstream and resume with the next request.
pub fn respond<UReq, UResp, DReq, DResp, Ctx>(
    value: DResp,
) -> Stage<UReq, UResp, DReq, DResp, Ctx, DReq>
where
    UReq: 'static,
    UResp: 'static,
    DReq: 'static,
    DResp: 'static,
    Ctx: 'static,
{
    Stage::Respond(value, Box::new(Stage::Pure))
}

/// A stage that has already terminated with `value`.
pub fn pure<UReq, UResp, DReq, DResp, Ctx, R>(value: R) -> Stage<UReq, UResp, DReq, DResp, Ctx, R> {
    Stage::Pure(value)
}

/// Lift one action of the effect context into a stage.
///
/// The action runs when a driver reaches this step, not before.
pub fn embed<UReq, UResp, DReq, DResp, Ctx, R, F>(
    action: F,
) -> Stage<UReq, UResp, DReq, DResp, Ctx, R>
where
    UReq: 'static,
    UResp: 'static,
    DReq: 'static,
    DResp: 'static,
    Ctx: 'static,
    R: 'static,
    F: FnOnce(&mut Ctx) -> R + 'static,
{
    Stage::Effect(Box::new(move |ctx| Stage::Pure(action(ctx))))
}

/// The identity of pull composition.
///
/// Forwards `seed` upstream, hands the response downstream, and repeats with
/// each following downstream request. Never terminates.
pub fn identity<Req, Resp, Ctx, R>(seed: Req) -> Stage<Req, Resp, Req, Resp, Ctx, R>
where
    Req: 'static,
    Resp: 'static,
    Ctx: 'static,
    R: 'static,
{
    Stage::Request(
        seed,
        Box::new(|resp| Stage::Respond(resp, Box::new(identity))),
    )
}

/// The identity of push composition.
///
/// Forwards `seed` downstream, hands the next request upstream, and repeats
/// with each following upstream response. Never terminates.
pub fn push<Req, Resp, Ctx, R>(seed: Resp) -> Stage<Req, Resp, Req, Resp, Ctx, R>
where
    Req: 'static,
    Resp: 'static,
    Ctx: 'static,
    R: 'static,
{
    Stage::Respond(seed, Box::new(|req| Stage::Request(req, Box::new(push))))
}
