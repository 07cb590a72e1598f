//! Fixed stages the conformance checks are run over.
//!
//! Every fixture has the same shape, `u32 -> Stage<u32, u32, u32, u32,
//! EffectLog, u32>`, so any two or three of them compose in every order.
//! Fixtures that perform effects append a line to the [`EffectLog`], which
//! makes effect order part of what the checks compare.
//!
//! Arithmetic wraps so arbitrary seeds never overflow.

use crate::engine::Engine;

/// Effect context used by the fixtures: an append-only log.
pub type EffectLog = Vec<String>;

/// The stage type every fixture produces on engine `E`.
pub type Fixture<E> = <E as Engine>::Stage<u32, u32, u32, u32, EffectLog, u32>;

/// A fixture constructor.
pub type FixtureFn<E> = fn(u32) -> Fixture<E>;

/// Number of requests `counter` makes and responds `source` emits.
pub const ROUNDS: u32 = 3;

/// Amount `offset` adds to every request it answers.
pub const OFFSET: u32 = 100;

// =============================================================================
// BUILDING BLOCKS
// =============================================================================

pub(crate) fn request<E: Engine>(value: u32) -> Fixture<E> {
    E::request::<u32, u32, u32, u32, EffectLog>(value)
}

pub(crate) fn respond<E: Engine>(value: u32) -> Fixture<E> {
    E::respond::<u32, u32, u32, u32, EffectLog>(value)
}

pub(crate) fn done<E: Engine>(value: u32) -> Fixture<E> {
    E::pure::<u32, u32, u32, u32, EffectLog, u32>(value)
}

/// Append `line` to the log and return `value`.
pub(crate) fn note<E: Engine>(line: String, value: u32) -> Fixture<E> {
    E::embed::<u32, u32, u32, u32, EffectLog, u32, _>(move |log: &mut EffectLog| {
        log.push(line);
        value
    })
}

pub(crate) fn bind<E, K>(stage: Fixture<E>, next: K) -> Fixture<E>
where
    E: Engine,
    K: FnOnce(u32) -> Fixture<E> + 'static,
{
    E::and_then::<u32, u32, u32, u32, EffectLog, u32, u32, K>(stage, next)
}

// =============================================================================
// FIXTURES
// =============================================================================

/// Request `q`, log the answer, respond with it, repeat with the next
/// request. Never terminates.
pub fn echo<E: Engine>(q: u32) -> Fixture<E> {
    bind::<E, _>(request::<E>(q), |a| {
        bind::<E, _>(note::<E>(format!("echo {a}"), a), |a| {
            bind::<E, _>(respond::<E>(a), echo::<E>)
        })
    })
}

/// Request `q`, `q + 1`, ... [`ROUNDS`] times, then terminate with the sum
/// of the answers. Never responds.
pub fn counter<E: Engine>(q: u32) -> Fixture<E> {
    count_from::<E>(q, ROUNDS, 0)
}

fn count_from<E: Engine>(q: u32, left: u32, total: u32) -> Fixture<E> {
    if left == 0 {
        return done::<E>(total);
    }
    bind::<E, _>(request::<E>(q), move |a| {
        count_from::<E>(q.wrapping_add(1), left - 1, total.wrapping_add(a))
    })
}

/// Answer every request with itself plus [`OFFSET`]. Never requests and
/// never terminates.
pub fn offset<E: Engine>(q: u32) -> Fixture<E> {
    bind::<E, _>(respond::<E>(q.wrapping_add(OFFSET)), offset::<E>)
}

/// Respond `q`, `q + 1`, ... [`ROUNDS`] times, then terminate with `q`.
/// Never requests.
pub fn source<E: Engine>(q: u32) -> Fixture<E> {
    emit_from::<E>(q, q, ROUNDS)
}

fn emit_from<E: Engine>(start: u32, next: u32, left: u32) -> Fixture<E> {
    if left == 0 {
        return done::<E>(start);
    }
    bind::<E, _>(respond::<E>(next), move |_| {
        emit_from::<E>(start, next.wrapping_add(1), left - 1)
    })
}

/// Request twice, logging in between, and terminate with the sum.
pub fn tally<E: Engine>(q: u32) -> Fixture<E> {
    bind::<E, _>(request::<E>(q), |a| {
        bind::<E, _>(note::<E>(format!("tally {a}"), a), |a| {
            bind::<E, _>(request::<E>(a), move |b| done::<E>(a.wrapping_add(b)))
        })
    })
}

/// Alternate requests and responds on both ends, then terminate with the
/// last request received.
pub fn relay<E: Engine>(q: u32) -> Fixture<E> {
    bind::<E, _>(request::<E>(q), |a| {
        bind::<E, _>(respond::<E>(a.wrapping_mul(2)), |q2| {
            bind::<E, _>(note::<E>(format!("relay {q2}"), q2), |q2| {
                bind::<E, _>(request::<E>(q2), |b| {
                    bind::<E, _>(respond::<E>(b.wrapping_add(1)), done::<E>)
                })
            })
        })
    })
}

/// Every fixture, by name.
#[must_use]
pub fn all<E: Engine>() -> [(&'static str, FixtureFn<E>); 6] {
    [
        ("echo", echo::<E>),
        ("counter", counter::<E>),
        ("offset", offset::<E>),
        ("source", source::<E>),
        ("tally", tally::<E>),
        ("relay", relay::<E>),
    ]
}

/// The fixtures whose first action is a request.
#[must_use]
pub fn requesting_first<E: Engine>() -> [(&'static str, FixtureFn<E>); 4] {
    [
        ("echo", echo::<E>),
        ("counter", counter::<E>),
        ("tally", tally::<E>),
        ("relay", relay::<E>),
    ]
}
