//! # Property-Based Tests
//!
//! Law checks over arbitrary seeds and scripts using proptest.
//!
//! The conformance suite runs a fixed grid; these tests search the space
//! around it.

use duplex_core::combinators::{collect, each, filter, map};
use duplex_core::conformance::checks;
use duplex_core::conformance::fixtures::{self, EffectLog, FixtureFn};
use duplex_core::{
    Compositor, DriverConfig, DuplexError, Driver, Event, Probe, Reference, Stage, push,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn fixture(index: usize) -> FixtureFn<Reference> {
    let all = fixtures::all::<Reference>();
    all[index % all.len()].1
}

fn script() -> impl Strategy<Value = (Vec<u32>, Vec<u32>)> {
    (vec(any::<u32>(), 0..8), vec(any::<u32>(), 0..8))
}

fn flip(event: Event<u32, u32>) -> Event<u32, u32> {
    match event {
        Event::Requested(value) => Event::Responded(value),
        Event::Responded(value) => Event::Requested(value),
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Identity is a unit of composition on both sides.
    #[test]
    fn compose_identity_laws(i in 0usize..6, seed in any::<u32>(), (up, down) in script()) {
        let probe = Probe::new(up, down);
        prop_assert_eq!(checks::left_identity::<Reference>(&probe, fixture(i), seed), Ok(()));
        prop_assert_eq!(checks::right_identity::<Reference>(&probe, fixture(i), seed), Ok(()));
    }

    /// Composition is associative.
    #[test]
    fn compose_associative(
        (i, j, k) in (0usize..6, 0usize..6, 0usize..6),
        seed in any::<u32>(),
        (up, down) in script()
    ) {
        let probe = Probe::new(up, down);
        let triple = (fixture(i), fixture(j), fixture(k));
        prop_assert_eq!(checks::compose_associativity::<Reference>(&probe, triple, seed), Ok(()));
    }

    /// Sequencing is unital and associative.
    #[test]
    fn sequence_laws(
        (i, j, k) in (0usize..6, 0usize..6, 0usize..6),
        seed in any::<u32>(),
        (up, down) in script()
    ) {
        let probe = Probe::new(up, down);
        prop_assert_eq!(
            checks::sequence_left_identity::<Reference>(&probe, fixture(i), seed),
            Ok(())
        );
        prop_assert_eq!(
            checks::sequence_right_identity::<Reference>(&probe, fixture(i), seed),
            Ok(())
        );
        let triple = (fixture(i), fixture(j), fixture(k));
        prop_assert_eq!(checks::sequence_associativity::<Reference>(&probe, triple, seed), Ok(()));
    }

    /// Fusion and both distributive laws hold for any pair of fixtures.
    #[test]
    fn fusion_and_distribution(
        (i, j) in (0usize..6, 0usize..6),
        value in any::<u32>(),
        (up, down) in script()
    ) {
        let probe = Probe::new(up, down);
        let pair = (fixture(i), fixture(j));
        prop_assert_eq!(checks::fusion::<Reference>(&probe, pair, value), Ok(()));
        prop_assert_eq!(checks::distribute_over_respond::<Reference>(&probe, pair, value), Ok(()));
        prop_assert_eq!(checks::distribute_over_request::<Reference>(&probe, pair, value), Ok(()));
    }

    /// Effects commute with composition and embed is a homomorphism.
    #[test]
    fn effect_laws(
        (i, j) in (0usize..6, 0usize..6),
        seed in any::<u32>(),
        (up, down) in script()
    ) {
        let probe = Probe::new(up, down);
        prop_assert_eq!(checks::embed_homomorphism::<Reference>(&probe, fixture(i), seed), Ok(()));
        let pair = (fixture(i), fixture(j));
        prop_assert_eq!(
            checks::effect_commutes_with_compose::<Reference>(&probe, pair, seed),
            Ok(())
        );
    }

    /// Both substitution operators form categories.
    #[test]
    fn substitution_laws(
        (i, j, k) in (0usize..6, 0usize..6, 0usize..6),
        seed in any::<u32>(),
        (up, down) in script()
    ) {
        let probe = Probe::new(up, down);
        let triple = (fixture(i), fixture(j), fixture(k));
        prop_assert_eq!(
            checks::request_substitution_units::<Reference>(&probe, fixture(i), seed),
            Ok(())
        );
        prop_assert_eq!(
            checks::respond_substitution_units::<Reference>(&probe, fixture(i), seed),
            Ok(())
        );
        prop_assert_eq!(
            checks::request_substitution_associativity::<Reference>(&probe, triple, seed),
            Ok(())
        );
        prop_assert_eq!(
            checks::respond_substitution_associativity::<Reference>(&probe, triple, seed),
            Ok(())
        );
        prop_assert_eq!(
            checks::compose_is_request_substitution::<Reference>(&probe, fixture(i), seed),
            Ok(())
        );
    }

    /// Push is a unit of push composition on both sides.
    #[test]
    fn push_identity_laws(i in 0usize..6, seed in any::<u32>(), (up, down) in script()) {
        let probe = Probe::new(up, down);
        let f = fixture(i);
        let left = Compositor::push_compose(push::<u32, u32, EffectLog, u32>, f)(seed);
        let right = Compositor::push_compose(f, push::<u32, u32, EffectLog, u32>)(seed);
        prop_assert_eq!(probe.compare::<Reference>("push.left_identity", left, f(seed)), Ok(()));
        prop_assert_eq!(probe.compare::<Reference>("push.right_identity", right, f(seed)), Ok(()));
    }

    /// Push composition is associative.
    #[test]
    fn push_compose_associative(
        (i, j, k) in (0usize..6, 0usize..6, 0usize..6),
        seed in any::<u32>(),
        (up, down) in script()
    ) {
        let probe = Probe::new(up, down);
        let (f, g, h) = (fixture(i), fixture(j), fixture(k));
        let left = Compositor::push_compose(Compositor::push_compose(f, g), h)(seed);
        let right = Compositor::push_compose(f, Compositor::push_compose(g, h))(seed);
        prop_assert_eq!(probe.compare::<Reference>("push.associativity", left, right), Ok(()));
    }

    /// Reflecting twice changes nothing; reflecting once swaps the ends.
    #[test]
    fn reflect_swaps_ends(i in 0usize..6, seed in any::<u32>(), (up, down) in script()) {
        let f = fixture(i);
        let probe = Probe::new(up.clone(), down.clone());
        let twice = f(seed).reflect().reflect();
        prop_assert_eq!(probe.compare::<Reference>("reflect.involution", twice, f(seed)), Ok(()));

        let swapped = Probe::new(down, up);
        let straight = probe.observe::<Reference>(f(seed));
        let mirrored = swapped.observe::<Reference>(f(seed).reflect());
        let flipped: Vec<_> = straight.trace.events.into_iter().map(flip).collect();
        prop_assert_eq!(mirrored.trace.events, flipped);
        prop_assert_eq!(mirrored.trace.outcome, straight.trace.outcome);
        prop_assert_eq!(mirrored.log, straight.log);
    }

    /// A producer-map-collect pipeline agrees with `Iterator::map`.
    #[test]
    fn map_pipeline_matches_iterator(items in vec(any::<u32>(), 0..64)) {
        let expected: Vec<u32> = items.iter().map(|x| x.wrapping_mul(3)).collect();
        let count = items.len();
        let pipeline = Compositor::compose(
            Compositor::compose(
                |()| each::<Reference, u32, (), _>(items).map(|()| Vec::new()),
                |()| map::<Reference, u32, u32, (), Vec<u32>, _>(|x| x.wrapping_mul(3)),
            ),
            move |()| collect::<Reference, u32, ()>(count),
        );
        let result = Driver::new().run(pipeline(()), &mut ()).expect("run");
        prop_assert_eq!(result, expected);
    }

    /// A producer-filter-collect pipeline agrees with `Iterator::filter`.
    #[test]
    fn filter_pipeline_matches_iterator(items in vec(0u32..100, 0..64), modulus in 1u32..7) {
        let expected: Vec<u32> = items.iter().copied().filter(|x| x % modulus == 0).collect();
        let count = expected.len();
        let pipeline = Compositor::compose(
            Compositor::compose(
                |()| each::<Reference, u32, (), _>(items).map(|()| Vec::new()),
                move |()| filter::<Reference, u32, (), Vec<u32>, _>(move |x| x % modulus == 0),
            ),
            move |()| collect::<Reference, u32, ()>(count),
        );
        let result = Driver::new().run(pipeline(()), &mut ()).expect("run");
        prop_assert_eq!(result, expected);
    }

    /// The driver stops an endless effect loop exactly at its limit.
    #[test]
    fn step_limit_is_exact(limit in 1u64..500) {
        fn spin() -> Stage<duplex_core::Closed, (), (), duplex_core::Closed, u64, ()> {
            duplex_core::embed(|n: &mut u64| *n += 1).and_then(|()| spin())
        }
        let mut count = 0u64;
        let driver = Driver::with_config(DriverConfig::with_max_steps(limit));
        let result = driver.run(spin(), &mut count);
        prop_assert_eq!(result, Err(DuplexError::StepLimitExceeded { limit }));
        prop_assert_eq!(count, limit);
    }

    /// Stalling never runs an effect past the suspension point.
    #[test]
    fn cancellation_for_any_seed(seed in any::<u32>()) {
        prop_assert_eq!(checks::cancellation::<Reference>(seed, &DriverConfig::default()), Ok(()));
    }
}
