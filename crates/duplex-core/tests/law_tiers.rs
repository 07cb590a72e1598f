//! # Law Tier Tests (T0-T4)
//!
//! If ANY tier fails, the engine is NOT a valid stage engine.
//!
//! ## Tiers
//! - T0: Primitive Behaviour
//! - T1: Sequencing
//! - T2: Pull Composition
//! - T3: Substitution, Push Composition and Reflection
//! - T4: Driving and Resource Model

#![allow(clippy::panic)]

use duplex_core::conformance::checks;
use duplex_core::conformance::fixtures::{
    self, EffectLog, FixtureFn, counter, echo, offset, relay, source, tally,
};
use duplex_core::{
    Closed, Compositor, Driver, DriverConfig, DuplexError, Event, Outcome, Probe, Reference,
    Script, Stage, Suite, embed, identity, pure, push, request, respond,
};

type Log = Vec<String>;
type Fx = FixtureFn<Reference>;

// =============================================================================
// TIER T0: PRIMITIVE BEHAVIOUR
// =============================================================================

mod t0_primitives {
    use super::*;

    /// T0.1: `request` suspends upstream and resumes with the response.
    #[test]
    fn request_suspends_upstream() {
        let stage: Stage<u8, u16, (), Closed, Log, u16> = request(3);
        let Stage::Request(value, resume) = stage else {
            panic!("request must suspend upstream");
        };
        assert_eq!(value, 3);
        assert_eq!(resume(40).into_result().ok(), Some(40));
    }

    /// T0.2: `respond` suspends downstream and resumes with the next request.
    #[test]
    fn respond_suspends_downstream() {
        let stage: Stage<Closed, (), u8, char, Log, u8> = respond('x');
        let Stage::Respond(value, resume) = stage else {
            panic!("respond must suspend downstream");
        };
        assert_eq!(value, 'x');
        assert_eq!(resume(9).into_result().ok(), Some(9));
    }

    /// T0.3: `pure` never requests or responds.
    #[test]
    fn pure_is_terminal() {
        let stage: Stage<u8, u8, u8, u8, Log, &str> = pure("done");
        assert!(stage.is_finished());
        let mut script = Script::new([1], [2]);
        let trace = Driver::new().drive(stage, &mut script, &mut Log::new());
        assert!(trace.events.is_empty());
        assert_eq!(trace.outcome, Outcome::Finished("done"));
        assert_eq!(script.upstream.len(), 1);
    }

    /// T0.4: `embed` runs its action only when driven.
    #[test]
    fn embed_is_lazy() {
        let stage: Stage<Closed, (), (), Closed, Log, usize> = embed(|log: &mut Log| {
            log.push("ran".to_string());
            log.len()
        });
        let mut log = Log::new();
        assert!(log.is_empty());
        let result = Driver::new().run(stage, &mut log).expect("run");
        assert_eq!(result, 1);
        assert_eq!(log, vec!["ran"]);
    }

    /// T0.5: identity is the loop request, respond, repeat.
    #[test]
    fn identity_unrolls_one_step() {
        let probe = Probe::new([10, 20, 30], [1, 2]);
        let unrolled: Stage<u32, u32, u32, u32, EffectLog, u32> =
            request(0).and_then(|x: u32| respond(x)).and_then(identity);
        let direct = identity(0);
        assert_eq!(probe.compare::<Reference>("identity.unrolled", unrolled, direct), Ok(()));
    }

    /// T0.6: a closed channel can be eliminated.
    #[test]
    fn closed_channels_are_uninhabited() {
        let stage: Stage<Closed, (), (), Closed, Log, u8> = pure(1);
        let value = match stage {
            Stage::Pure(v) => v,
            Stage::Request(never, _) => never.absurd(),
            Stage::Respond(never, _) => never.absurd(),
            Stage::Effect(_) => 0,
        };
        assert_eq!(value, 1);
    }
}

// =============================================================================
// TIER T1: SEQUENCING
// =============================================================================

mod t1_sequencing {
    use super::*;

    /// T1.1: `pure(v) >>= k == k(v)` for every fixture.
    #[test]
    fn left_identity() {
        let probe = Probe::default();
        for (name, k) in fixtures::all::<Reference>() {
            assert_eq!(checks::sequence_left_identity::<Reference>(&probe, k, 5), Ok(()), "{name}");
        }
    }

    /// T1.2: `s >>= pure == s` for every fixture.
    #[test]
    fn right_identity() {
        let probe = Probe::default();
        for (name, s) in fixtures::all::<Reference>() {
            assert_eq!(
                checks::sequence_right_identity::<Reference>(&probe, s, 5),
                Ok(()),
                "{name}"
            );
        }
    }

    /// T1.3: sequencing is associative.
    #[test]
    fn associativity() {
        let probe = Probe::default();
        let triple: (Fx, Fx, Fx) = (tally::<Reference>, relay::<Reference>, counter::<Reference>);
        assert_eq!(checks::sequence_associativity::<Reference>(&probe, triple, 2), Ok(()));
    }

    /// T1.4: `map` and `then` are sequencing in disguise.
    #[test]
    fn map_and_then_sequence() {
        let mapped: Stage<u32, u32, (), Closed, Log, u32> = request(1).map(|x: u32| x * 2);
        let chained: Stage<u32, u32, (), Closed, Log, u32> =
            request(1).then(request(2)).map(|y: u32| y + 1);
        let mut script = Script::new([21], []);
        let trace = Driver::new().drive(mapped, &mut script, &mut Log::new());
        assert_eq!(trace.outcome, Outcome::Finished(42));
        let mut script = Script::new([0, 6], []);
        let trace = Driver::new().drive(chained, &mut script, &mut Log::new());
        assert_eq!(trace.events, vec![Event::Requested(1), Event::Requested(2)]);
        assert_eq!(trace.outcome, Outcome::Finished(7));
    }

    /// T1.5: two embedded actions equal one action doing both.
    #[test]
    fn embed_homomorphism() {
        let probe = Probe::default();
        for (name, k) in fixtures::all::<Reference>() {
            assert_eq!(checks::embed_homomorphism::<Reference>(&probe, k, 3), Ok(()), "{name}");
        }
    }
}

// =============================================================================
// TIER T2: PULL COMPOSITION
// =============================================================================

mod t2_pull_composition {
    use super::*;

    /// T2.1: identity is a unit on both sides.
    #[test]
    fn identity_units() {
        let probe = Probe::default();
        for (name, f) in fixtures::all::<Reference>() {
            assert_eq!(checks::left_identity::<Reference>(&probe, f, 1), Ok(()), "{name}");
            assert_eq!(checks::right_identity::<Reference>(&probe, f, 1), Ok(()), "{name}");
        }
    }

    /// T2.2: composition is associative.
    #[test]
    fn associativity() {
        let probe = Probe::default();
        let triple: (Fx, Fx, Fx) = (offset::<Reference>, echo::<Reference>, tally::<Reference>);
        assert_eq!(checks::compose_associativity::<Reference>(&probe, triple, 4), Ok(()));
    }

    /// T2.3: both orientations are the same operator.
    #[test]
    fn orientation() {
        let probe = Probe::default();
        let pair: (Fx, Fx) = (source::<Reference>, relay::<Reference>);
        assert_eq!(checks::compose_orientation::<Reference>(&probe, pair, 0), Ok(()));
    }

    /// T2.4: a terminated stage absorbs composition on its own side.
    #[test]
    fn absorption() {
        let probe = Probe::default();
        for (name, g) in fixtures::requesting_first::<Reference>() {
            assert_eq!(checks::absorb_upstream::<Reference>(&probe, g, 8), Ok(()), "{name}");
        }
        for (name, f) in fixtures::all::<Reference>() {
            assert_eq!(checks::absorb_downstream::<Reference>(&probe, f, 8), Ok(()), "{name}");
        }
    }

    /// T2.5: respond meeting request fuses into direct continuation.
    #[test]
    fn fusion() {
        let probe = Probe::default();
        let pair: (Fx, Fx) = (echo::<Reference>, counter::<Reference>);
        assert_eq!(checks::fusion::<Reference>(&probe, pair, 6), Ok(()));
    }

    /// T2.6: composition distributes over leading respond and request.
    #[test]
    fn distributivity() {
        let probe = Probe::default();
        let pair: (Fx, Fx) = (relay::<Reference>, tally::<Reference>);
        assert_eq!(checks::distribute_over_respond::<Reference>(&probe, pair, 3), Ok(()));
        assert_eq!(checks::distribute_over_request::<Reference>(&probe, pair, 3), Ok(()));
    }

    /// T2.7: embedded effects commute with composition.
    #[test]
    fn effects_commute() {
        let probe = Probe::default();
        let pair: (Fx, Fx) = (offset::<Reference>, echo::<Reference>);
        assert_eq!(checks::effect_commutes_with_compose::<Reference>(&probe, pair, 1), Ok(()));
    }

    /// T2.8: the joined channel is hidden; only outer events are visible.
    #[test]
    fn inner_channel_is_hidden() {
        let pipeline = Compositor::compose(offset::<Reference>, counter::<Reference>);
        let mut script = Script::new([], []);
        let trace = Driver::new().drive(pipeline(0), &mut script, &mut EffectLog::new());
        assert!(trace.events.is_empty());
        assert_eq!(trace.outcome, Outcome::Finished(303));
    }
}

// =============================================================================
// TIER T3: SUBSTITUTION, PUSH COMPOSITION AND REFLECTION
// =============================================================================

mod t3_substitution_push_reflect {
    use super::*;

    /// T3.1: `request` and `respond` are the substitution units.
    #[test]
    fn substitution_units() {
        let probe = Probe::default();
        for (name, f) in fixtures::all::<Reference>() {
            assert_eq!(
                checks::request_substitution_units::<Reference>(&probe, f, 2),
                Ok(()),
                "{name}"
            );
            assert_eq!(
                checks::respond_substitution_units::<Reference>(&probe, f, 2),
                Ok(()),
                "{name}"
            );
        }
    }

    /// T3.2: both substitutions are associative.
    #[test]
    fn substitution_associativity() {
        let probe = Probe::default();
        let triple: (Fx, Fx, Fx) = (relay::<Reference>, echo::<Reference>, source::<Reference>);
        assert_eq!(
            checks::request_substitution_associativity::<Reference>(&probe, triple, 1),
            Ok(())
        );
        assert_eq!(
            checks::respond_substitution_associativity::<Reference>(&probe, triple, 1),
            Ok(())
        );
    }

    /// T3.3: composing with a stateless server is request substitution.
    #[test]
    fn compose_specialises_substitution() {
        let probe = Probe::default();
        for (name, g) in fixtures::all::<Reference>() {
            assert_eq!(
                checks::compose_is_request_substitution::<Reference>(&probe, g, 7),
                Ok(()),
                "{name}"
            );
        }
    }

    /// T3.4: push is a unit of push composition.
    #[test]
    fn push_units() {
        let probe = Probe::default();
        for (name, f) in fixtures::all::<Reference>() {
            let left = Compositor::push_compose(push::<u32, u32, EffectLog, u32>, f)(3);
            assert_eq!(
                probe.compare::<Reference>("push.left_identity", left, f(3)),
                Ok(()),
                "{name}"
            );
            let right = Compositor::push_compose_rev(push::<u32, u32, EffectLog, u32>, f)(3);
            assert_eq!(
                probe.compare::<Reference>("push.right_identity", right, f(3)),
                Ok(()),
                "{name}"
            );
        }
    }

    /// T3.5: `reflect(request) == respond`.
    #[test]
    fn reflect_request_is_respond() {
        let reflected: Stage<i64, bool, u8, char, Log, u8> =
            request::<char, u8, bool, i64, Log>('a').reflect();
        let Stage::Respond(value, resume) = reflected else {
            panic!("reflected request must respond");
        };
        assert_eq!(value, 'a');
        assert_eq!(resume(5).into_result().ok(), Some(5));
    }
}

// =============================================================================
// TIER T4: DRIVING AND RESOURCE MODEL
// =============================================================================

mod t4_driving {
    use super::*;
    use duplex_core::conformance::run_scenario;

    /// T4.1: the downstream decides the scenario's result.
    #[test]
    fn scenario_collects_in_order() {
        let values = run_scenario::<Reference>(&DriverConfig::default()).expect("scenario");
        assert_eq!(values, vec![1, 2, 3]);
    }

    /// T4.2: a stalled pipeline runs nothing after the suspension.
    #[test]
    fn cancellation() {
        for seed in [0, 1, u32::MAX] {
            assert_eq!(checks::cancellation::<Reference>(seed, &DriverConfig::default()), Ok(()));
        }
    }

    /// T4.3: dropping an undriven pipeline runs no effect.
    #[test]
    fn dropping_runs_nothing() {
        let pipeline = Compositor::compose(echo::<Reference>, echo::<Reference>);
        let stage = pipeline(1);
        let mut log = EffectLog::new();
        let trace = Driver::new().drive(stage, &mut Script::new([], []), &mut log);
        assert_eq!(trace.events, vec![Event::Requested(1)]);
        assert!(log.is_empty());
    }

    /// T4.4: an endless closed pipeline hits the step limit.
    #[test]
    fn step_limit() {
        let pipeline = Compositor::compose(
            |()| -> Stage<Closed, (), (), u32, Log, ()> {
                duplex_core::combinators::forever::<Reference, Closed, (), (), u32, Log, (), _>(|| {
                    embed(|log: &mut Log| log.push("tick".to_string())).then(respond(1))
                })
            },
            |()| {
                duplex_core::combinators::forever::<Reference, (), u32, (), Closed, Log, (), _>(|| {
                    request(()).map(|_: u32| ())
                })
            },
        );
        let driver = Driver::with_config(DriverConfig::with_max_steps(50));
        let mut log = Log::new();
        let result = driver.run(pipeline(()), &mut log);
        assert_eq!(result, Err(DuplexError::StepLimitExceeded { limit: 50 }));
        assert_eq!(log.len(), 50);
    }

    /// T4.5: long fused pipelines do not grow the stack.
    #[test]
    fn long_pipelines_are_stack_safe() {
        let count = 100_000;
        let pipeline = Compositor::compose(
            move |()| duplex_core::combinators::each::<Reference, u32, (), _>(0..count).map(|()| 0u64),
            move |()| {
                duplex_core::combinators::fold::<Reference, u32, u64, (), _>(
                    count as usize,
                    0,
                    |acc, x| acc + u64::from(x),
                )
            },
        );
        let total = Driver::with_config(DriverConfig::unlimited())
            .run(pipeline(()), &mut ())
            .expect("run");
        assert_eq!(total, u64::from(count) * u64::from(count - 1) / 2);
    }

    /// T4.6: the full conformance suite passes on the reference engine.
    #[test]
    fn reference_passes_suite() {
        let report = Suite::default().run::<Reference>();
        assert!(report.passed(), "{:?}", report.into_result());
    }

    /// T4.7: round trips fused inside a pipeline cost no steps; only
    /// effects and outer suspensions count against the limit.
    #[test]
    fn fused_round_trips_are_not_counted() {
        let count = 1_000u32;
        let pipeline = Compositor::compose(
            move |()| duplex_core::combinators::each::<Reference, u32, (), _>(0..count).map(|()| 0u64),
            move |()| {
                duplex_core::combinators::fold::<Reference, u32, u64, (), _>(
                    count as usize,
                    0,
                    |acc, x| acc + u64::from(x),
                )
            },
        );
        let total = Driver::with_config(DriverConfig::with_max_steps(1))
            .run(pipeline(()), &mut ())
            .expect("effect-free pipeline needs no steps");
        assert_eq!(total, u64::from(count) * u64::from(count - 1) / 2);

        let mut script: Script<(), ()> = Script::default();
        let trace = Driver::with_config(DriverConfig::with_max_steps(1))
            .drive(pipeline_with_one_effect(), &mut script, &mut Log::new());
        assert_eq!(trace.effects, 1);
        assert_eq!(trace.outcome, Outcome::Finished(3));
    }

    fn pipeline_with_one_effect() -> Stage<Closed, (), (), Closed, Log, u64> {
        let upstream = |()| -> Stage<Closed, (), (), u32, Log, u64> {
            embed(|log: &mut Log| log.push("start".to_string()))
                .then(duplex_core::combinators::each::<Reference, u32, Log, _>([1, 2]))
                .map(|()| 0)
        };
        let downstream = |()| {
            duplex_core::combinators::fold::<Reference, u32, u64, Log, _>(2, 0, |acc, x| {
                acc + u64::from(x)
            })
        };
        Compositor::compose(upstream, downstream)(())
    }
}
