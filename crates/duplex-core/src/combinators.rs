//! # Derived Combinators
//!
//! Convenience stages built only from the [`Engine`] trait.
//!
//! Nothing here looks inside a stage: every combinator is a composition of
//! `request`, `respond`, `pure`, `identity` and `and_then`, so each one runs
//! unchanged on any engine.
//!
//! Calls through `E::Stage<..>` carry explicit type arguments because an
//! associated type does not let the compiler recover its parameters.
//!
//! | Combinator | Shape                            | Behaviour                          |
//! |------------|----------------------------------|------------------------------------|
//! | `each`     | producer                         | responds every item, then ends     |
//! | `cat`      | pipe                             | forwards everything forever        |
//! | `map`      | pipe                             | applies `f` to every value         |
//! | `filter`   | pipe                             | drops values failing a predicate   |
//! | `take`     | pipe                             | forwards `n` values, then ends     |
//! | `fold`     | consumer                         | folds `n` values into a result     |
//! | `collect`  | consumer                         | gathers `n` values into a `Vec`    |
//! | `serve`    | server                           | answers each request with `f(req)` |
//! | `forever`  | any                              | repeats a stage without end        |

use crate::engine::Engine;
use crate::types::Closed;

/// Respond with every item in order, then terminate.
pub fn each<E, B, Ctx, I>(items: I) -> E::Stage<Closed, (), (), B, Ctx, ()>
where
    E: Engine,
    B: 'static,
    Ctx: 'static,
    I: IntoIterator<Item = B>,
    I::IntoIter: 'static,
{
    emit::<E, B, Ctx, I::IntoIter>(items.into_iter())
}

fn emit<E, B, Ctx, It>(mut items: It) -> E::Stage<Closed, (), (), B, Ctx, ()>
where
    E: Engine,
    B: 'static,
    Ctx: 'static,
    It: Iterator<Item = B> + 'static,
{
    match items.next() {
        Some(item) => E::and_then::<Closed, (), (), B, Ctx, (), (), _>(
            E::respond::<Closed, (), (), B, Ctx>(item),
            move |()| emit::<E, B, Ctx, It>(items),
        ),
        None => E::pure::<Closed, (), (), B, Ctx, ()>(()),
    }
}

/// The pipe that forwards every value unchanged.
pub fn cat<E, A, Ctx, R>() -> E::Stage<(), A, (), A, Ctx, R>
where
    E: Engine,
    A: 'static,
    Ctx: 'static,
    R: 'static,
{
    E::identity::<(), A, Ctx, R>(())
}

/// Apply `f` to every value flowing downstream.
pub fn map<E, A, B, Ctx, R, F>(mut f: F) -> E::Stage<(), A, (), B, Ctx, R>
where
    E: Engine,
    A: 'static,
    B: 'static,
    Ctx: 'static,
    R: 'static,
    F: FnMut(A) -> B + 'static,
{
    E::and_then::<(), A, (), B, Ctx, A, R, _>(E::request::<(), A, (), B, Ctx>(()), move |a| {
        let b = f(a);
        E::and_then::<(), A, (), B, Ctx, (), R, _>(
            E::respond::<(), A, (), B, Ctx>(b),
            move |()| map::<E, A, B, Ctx, R, F>(f),
        )
    })
}

/// Forward only the values for which `keep` returns true.
pub fn filter<E, A, Ctx, R, P>(mut keep: P) -> E::Stage<(), A, (), A, Ctx, R>
where
    E: Engine,
    A: 'static,
    Ctx: 'static,
    R: 'static,
    P: FnMut(&A) -> bool + 'static,
{
    E::and_then::<(), A, (), A, Ctx, A, R, _>(E::request::<(), A, (), A, Ctx>(()), move |a| {
        if keep(&a) {
            E::and_then::<(), A, (), A, Ctx, (), R, _>(
                E::respond::<(), A, (), A, Ctx>(a),
                move |()| filter::<E, A, Ctx, R, P>(keep),
            )
        } else {
            filter::<E, A, Ctx, R, P>(keep)
        }
    })
}

/// Forward `n` values, then terminate.
pub fn take<E, A, Ctx>(n: usize) -> E::Stage<(), A, (), A, Ctx, ()>
where
    E: Engine,
    A: 'static,
    Ctx: 'static,
{
    if n == 0 {
        return E::pure::<(), A, (), A, Ctx, ()>(());
    }
    E::and_then::<(), A, (), A, Ctx, A, (), _>(E::request::<(), A, (), A, Ctx>(()), move |a| {
        E::and_then::<(), A, (), A, Ctx, (), (), _>(
            E::respond::<(), A, (), A, Ctx>(a),
            move |()| take::<E, A, Ctx>(n - 1),
        )
    })
}

/// Request `count` values and fold them into a result.
pub fn fold<E, A, S, Ctx, F>(
    count: usize,
    init: S,
    mut step: F,
) -> E::Stage<(), A, (), Closed, Ctx, S>
where
    E: Engine,
    A: 'static,
    S: 'static,
    Ctx: 'static,
    F: FnMut(S, A) -> S + 'static,
{
    if count == 0 {
        return E::pure::<(), A, (), Closed, Ctx, S>(init);
    }
    E::and_then::<(), A, (), Closed, Ctx, A, S, _>(
        E::request::<(), A, (), Closed, Ctx>(()),
        move |a| {
            let acc = step(init, a);
            fold::<E, A, S, Ctx, F>(count - 1, acc, step)
        },
    )
}

/// Request `count` values and return them in arrival order.
pub fn collect<E, A, Ctx>(count: usize) -> E::Stage<(), A, (), Closed, Ctx, Vec<A>>
where
    E: Engine,
    A: 'static,
    Ctx: 'static,
{
    fold::<E, A, Vec<A>, Ctx, _>(count, Vec::with_capacity(count), |mut acc, a| {
        acc.push(a);
        acc
    })
}

/// Answer `req`, and every request after it, with `answer(req)`.
///
/// The result is a stateless server: it never requests upstream and never
/// terminates.
pub fn serve<E, UReq, UResp, Req, Resp, Ctx, R, F>(
    mut answer: F,
    req: Req,
) -> E::Stage<UReq, UResp, Req, Resp, Ctx, R>
where
    E: Engine,
    UReq: 'static,
    UResp: 'static,
    Req: 'static,
    Resp: 'static,
    Ctx: 'static,
    R: 'static,
    F: FnMut(Req) -> Resp + 'static,
{
    let resp = answer(req);
    E::and_then::<UReq, UResp, Req, Resp, Ctx, Req, R, _>(
        E::respond::<UReq, UResp, Req, Resp, Ctx>(resp),
        move |next| serve::<E, UReq, UResp, Req, Resp, Ctx, R, F>(answer, next),
    )
}

/// Run `body` again every time it terminates.
///
/// `body` must suspend or perform an effect before terminating; a body that
/// is immediately `pure` would loop without yielding to the driver.
pub fn forever<E, UReq, UResp, DReq, DResp, Ctx, R, F>(
    mut body: F,
) -> E::Stage<UReq, UResp, DReq, DResp, Ctx, R>
where
    E: Engine,
    UReq: 'static,
    UResp: 'static,
    DReq: 'static,
    DResp: 'static,
    Ctx: 'static,
    R: 'static,
    F: FnMut() -> E::Stage<UReq, UResp, DReq, DResp, Ctx, ()> + 'static,
{
    let stage = body();
    E::and_then::<UReq, UResp, DReq, DResp, Ctx, (), R, _>(stage, move |()| {
        forever::<E, UReq, UResp, DReq, DResp, Ctx, R, F>(body)
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::Compositor;
    use crate::driver::Driver;
    use crate::engine::Reference;
    use crate::primitives::embed;
    use crate::stage::{Effect, Stage};
    use crate::types::{Event, Outcome, Script};

    type Log = Vec<String>;

    fn run<R: 'static>(effect: Effect<Log, R>) -> (R, Log) {
        let mut log = Log::new();
        let result = Driver::new().run(effect, &mut log).expect("run");
        (result, log)
    }

    #[test]
    fn each_map_collect() {
        let pipeline = Compositor::compose(
            Compositor::compose(
                |()| each::<Reference, u32, Log, _>(vec![1, 2, 3]).map(|()| Vec::new()),
                |()| map::<Reference, u32, u32, Log, Vec<u32>, _>(|x| x * 10),
            ),
            |()| collect::<Reference, u32, Log>(3),
        );
        let (result, _) = run(pipeline(()));
        assert_eq!(result, vec![10, 20, 30]);
    }

    #[test]
    fn exhausted_producer_ends_the_pipeline() {
        let pipeline = Compositor::compose(
            |()| each::<Reference, u32, Log, _>(vec![1, 2]).map(|()| vec![0]),
            |()| collect::<Reference, u32, Log>(5),
        );
        let (result, _) = run(pipeline(()));
        assert_eq!(result, vec![0]);
    }

    #[test]
    fn filter_drops_rejected_values() {
        let pipeline = Compositor::compose(
            Compositor::compose(
                |()| each::<Reference, u32, Log, _>(1..=10).map(|()| Vec::new()),
                |()| filter::<Reference, u32, Log, Vec<u32>, _>(|x| x % 3 == 0),
            ),
            |()| collect::<Reference, u32, Log>(3),
        );
        let (result, _) = run(pipeline(()));
        assert_eq!(result, vec![3, 6, 9]);
    }

    #[test]
    fn take_stops_an_endless_source() {
        let endless = |()| -> Stage<Closed, (), (), u32, Log, Vec<u32>> {
            forever::<Reference, Closed, (), (), u32, Log, Vec<u32>, _>(|| {
                embed(|log: &mut Log| log.push("emit".into()))
                    .and_then(|()| crate::primitives::respond(7))
            })
        };
        let pipeline = Compositor::compose(
            Compositor::compose(endless, |()| {
                take::<Reference, u32, Log>(2).map(|()| vec![0])
            }),
            |()| collect::<Reference, u32, Log>(10),
        );
        let (result, log) = run(pipeline(()));
        assert_eq!(result, vec![0]);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn cat_is_transparent() {
        let pipeline = Compositor::compose(
            Compositor::compose(
                |()| {
                    each::<Reference, char, Log, _>("ab".chars().collect::<Vec<_>>())
                        .map(|()| Vec::new())
                },
                |()| cat::<Reference, char, Log, Vec<char>>(),
            ),
            |()| collect::<Reference, char, Log>(2),
        );
        let (result, _) = run(pipeline(()));
        assert_eq!(result, vec!['a', 'b']);
    }

    #[test]
    fn serve_answers_every_request() {
        let stage: Stage<Closed, (), u32, u32, Log, ()> =
            serve::<Reference, Closed, (), u32, u32, Log, (), _>(|q| q + 1, 1);
        let mut script = Script::new([], [5, 9]);
        let trace = Driver::new().drive(stage, &mut script, &mut Log::new());
        assert_eq!(
            trace.events,
            vec![
                Event::Responded(2),
                Event::Responded(6),
                Event::Responded(10)
            ]
        );
        assert_eq!(trace.outcome, Outcome::Stalled);
    }

    #[test]
    fn forever_repeats_effects() {
        let stage: Stage<Closed, (), (), u32, Log, ()> =
            forever::<Reference, Closed, (), (), u32, Log, (), _>(|| {
                embed(|log: &mut Log| {
                    log.push("beat".into());
                    log.len() as u32
                })
                .and_then(crate::primitives::respond)
            });
        let mut log = Log::new();
        let trace = Driver::new().drive(stage, &mut Script::new([], [(), ()]), &mut log);
        assert_eq!(trace.responses(), vec![&1, &2, &3]);
        assert_eq!(log.len(), 3);
    }
}
