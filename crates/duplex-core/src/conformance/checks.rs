//! Observational law checks.
//!
//! Each check builds the two sides of one law from fixtures, drives both
//! against the same [`Probe`], and fails with
//! [`DuplexError::LawViolation`] if the traces or effect logs differ.

use crate::combinators::serve;
use crate::driver::DriverConfig;
use crate::engine::{Drive, Engine, Substitute};
use crate::types::{DuplexError, Outcome, Script, Trace};

use super::fixtures::{
    EffectLog, Fixture, FixtureFn, OFFSET, bind, done, note, request, respond,
};

// =============================================================================
// OBSERVATION
// =============================================================================

/// What a driven stage looked like from the outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Emitted events and how driving stopped.
    pub trace: Trace<u32, u32, u32>,
    /// Effects performed, in order.
    pub log: EffectLog,
}

/// A script and driver limits shared by both sides of every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// Inputs fed to each side; every observation starts from a copy.
    pub script: Script<u32, u32>,
    /// Driver limits.
    pub config: DriverConfig,
}

impl Default for Probe {
    fn default() -> Self {
        Self::new([5, 8, 13, 21, 34, 55], [2, 3, 7, 11])
    }
}

impl Probe {
    /// Create a probe with the default driver limits.
    pub fn new(
        upstream: impl IntoIterator<Item = u32>,
        downstream: impl IntoIterator<Item = u32>,
    ) -> Self {
        Self {
            script: Script::new(upstream, downstream),
            config: DriverConfig::default(),
        }
    }

    /// Replace the driver limits.
    #[must_use]
    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive `stage` with a fresh copy of the script and an empty log.
    pub fn observe<E: Drive>(&self, stage: Fixture<E>) -> Observation {
        let mut script = self.script.clone();
        let mut log = EffectLog::new();
        let trace = E::drive::<u32, u32, u32, u32, EffectLog, u32>(
            stage,
            &mut script,
            &mut log,
            &self.config,
        );
        Observation { trace, log }
    }

    /// Drive both sides of `law` and compare what they did.
    pub fn compare<E: Drive>(
        &self,
        law: &str,
        left: Fixture<E>,
        right: Fixture<E>,
    ) -> Result<(), DuplexError> {
        let left = self.observe::<E>(left);
        let right = self.observe::<E>(right);
        if left == right {
            Ok(())
        } else {
            Err(DuplexError::LawViolation {
                law: law.to_string(),
                detail: format!("left {left:?} differs from right {right:?}"),
            })
        }
    }
}

// =============================================================================
// COMPOSITION
// =============================================================================

fn compose<E: Engine>(
    f: impl FnOnce(u32) -> Fixture<E> + 'static,
    g: impl FnOnce(u32) -> Fixture<E> + 'static,
) -> impl FnOnce(u32) -> Fixture<E> + 'static {
    E::compose::<u32, u32, u32, u32, u32, u32, EffectLog, u32, u32, _, _>(f, g)
}

fn identity<E: Engine>(seed: u32) -> Fixture<E> {
    E::identity::<u32, u32, EffectLog, u32>(seed)
}

/// `identity >-> f == f`
pub fn left_identity<E: Drive>(
    probe: &Probe,
    f: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    let composed = compose::<E>(identity::<E>, f)(seed);
    probe.compare::<E>("compose.left_identity", composed, f(seed))
}

/// `f >-> identity == f`
pub fn right_identity<E: Drive>(
    probe: &Probe,
    f: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    let composed = compose::<E>(f, identity::<E>)(seed);
    probe.compare::<E>("compose.right_identity", composed, f(seed))
}

/// `(f >-> g) >-> h == f >-> (g >-> h)`
pub fn compose_associativity<E: Drive>(
    probe: &Probe,
    (f, g, h): (FixtureFn<E>, FixtureFn<E>, FixtureFn<E>),
    seed: u32,
) -> Result<(), DuplexError> {
    let left = compose::<E>(compose::<E>(f, g), h)(seed);
    let right = compose::<E>(f, compose::<E>(g, h))(seed);
    probe.compare::<E>("compose.associativity", left, right)
}

/// `compose_rev(g, f) == compose(f, g)`
pub fn compose_orientation<E: Drive>(
    probe: &Probe,
    (f, g): (FixtureFn<E>, FixtureFn<E>),
    seed: u32,
) -> Result<(), DuplexError> {
    let reversed =
        E::compose_rev::<u32, u32, u32, u32, u32, u32, EffectLog, u32, u32, _, _>(g, f)(seed);
    probe.compare::<E>("compose.orientation", reversed, compose::<E>(f, g)(seed))
}

// =============================================================================
// SEQUENCING
// =============================================================================

/// `pure(v) >>= k == k(v)`
pub fn sequence_left_identity<E: Drive>(
    probe: &Probe,
    k: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    probe.compare::<E>("sequence.left_identity", bind::<E, _>(done::<E>(seed), k), k(seed))
}

/// `s >>= pure == s`
pub fn sequence_right_identity<E: Drive>(
    probe: &Probe,
    s: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    probe.compare::<E>("sequence.right_identity", bind::<E, _>(s(seed), done::<E>), s(seed))
}

/// `(s >>= f) >>= g == s >>= (x => f(x) >>= g)`
pub fn sequence_associativity<E: Drive>(
    probe: &Probe,
    (s, f, g): (FixtureFn<E>, FixtureFn<E>, FixtureFn<E>),
    seed: u32,
) -> Result<(), DuplexError> {
    let left = bind::<E, _>(bind::<E, _>(s(seed), f), g);
    let right = bind::<E, _>(s(seed), move |x| bind::<E, _>(f(x), g));
    probe.compare::<E>("sequence.associativity", left, right)
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Two embedded actions in sequence equal one action doing both.
pub fn embed_homomorphism<E: Drive>(
    probe: &Probe,
    k: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    let first = move |log: &mut EffectLog| {
        log.push(format!("first {seed}"));
        seed.wrapping_add(1)
    };
    let second = |x: u32, log: &mut EffectLog| {
        log.push(format!("second {x}"));
        x.wrapping_mul(3)
    };
    let left = bind::<E, _>(
        bind::<E, _>(E::embed::<u32, u32, u32, u32, EffectLog, u32, _>(first), move |x| {
            E::embed::<u32, u32, u32, u32, EffectLog, u32, _>(move |log: &mut EffectLog| {
                second(x, log)
            })
        }),
        k,
    );
    let right = bind::<E, _>(
        E::embed::<u32, u32, u32, u32, EffectLog, u32, _>(move |log: &mut EffectLog| {
            let x = first(log);
            second(x, log)
        }),
        k,
    );
    probe.compare::<E>("effect.homomorphism", left, right)
}

/// `f >-> (embed(a) >>= g) == embed(a) >>= (y => f >-> g(y))`
pub fn effect_commutes_with_compose<E: Drive>(
    probe: &Probe,
    (f, g): (FixtureFn<E>, FixtureFn<E>),
    seed: u32,
) -> Result<(), DuplexError> {
    let action = move || note::<E>(format!("pre {seed}"), seed.wrapping_add(1));
    let left =
        E::connect::<u32, u32, u32, u32, u32, u32, EffectLog, u32, _>(f, bind::<E, _>(action(), g));
    let right = bind::<E, _>(action(), move |y| {
        E::connect::<u32, u32, u32, u32, u32, u32, EffectLog, u32, _>(f, g(y))
    });
    probe.compare::<E>("effect.commutes_with_compose", left, right)
}

// =============================================================================
// ABSORPTION, FUSION, DISTRIBUTIVITY
// =============================================================================

/// A terminated upstream ends the pipeline at the downstream's first
/// request. `g` must request before anything else.
pub fn absorb_upstream<E: Drive>(
    probe: &Probe,
    g: FixtureFn<E>,
    value: u32,
) -> Result<(), DuplexError> {
    let pipeline = compose::<E>(move |_| done::<E>(value), g)(value);
    probe.compare::<E>("absorption.upstream", pipeline, done::<E>(value))
}

/// A terminated downstream ends the pipeline immediately.
pub fn absorb_downstream<E: Drive>(
    probe: &Probe,
    f: FixtureFn<E>,
    value: u32,
) -> Result<(), DuplexError> {
    let pipeline = compose::<E>(f, move |_| done::<E>(value))(value);
    probe.compare::<E>("absorption.downstream", pipeline, done::<E>(value))
}

/// `(_ => respond(v) >>= k) >-> (q => request(q) >>= h) == k +>> h(v)`
pub fn fusion<E: Drive>(
    probe: &Probe,
    (k, h): (FixtureFn<E>, FixtureFn<E>),
    value: u32,
) -> Result<(), DuplexError> {
    let left = compose::<E>(
        move |_| bind::<E, _>(respond::<E>(value), k),
        move |q| bind::<E, _>(request::<E>(q), h),
    )(value);
    let right = E::connect::<u32, u32, u32, u32, u32, u32, EffectLog, u32, _>(k, h(value));
    probe.compare::<E>("fusion", left, right)
}

/// `f +>> (respond(v) >>= g) == respond(v) >>= (y => f +>> g(y))`
pub fn distribute_over_respond<E: Drive>(
    probe: &Probe,
    (f, g): (FixtureFn<E>, FixtureFn<E>),
    value: u32,
) -> Result<(), DuplexError> {
    let left = E::connect::<u32, u32, u32, u32, u32, u32, EffectLog, u32, _>(
        f,
        bind::<E, _>(respond::<E>(value), g),
    );
    let right = bind::<E, _>(respond::<E>(value), move |y| {
        E::connect::<u32, u32, u32, u32, u32, u32, EffectLog, u32, _>(f, g(y))
    });
    probe.compare::<E>("distribute.respond", left, right)
}

/// An upstream that requests before anything else makes that request on
/// behalf of the whole pipeline.
pub fn distribute_over_request<E: Drive>(
    probe: &Probe,
    (f, h): (FixtureFn<E>, FixtureFn<E>),
    value: u32,
) -> Result<(), DuplexError> {
    let upstream = move |b: u32| bind::<E, _>(request::<E>(value), move |x| f(x.wrapping_add(b)));
    let downstream = move || bind::<E, _>(request::<E>(value.wrapping_add(1)), h);
    let left =
        E::connect::<u32, u32, u32, u32, u32, u32, EffectLog, u32, _>(upstream, downstream());
    let right = bind::<E, _>(request::<E>(value), move |x| {
        E::connect::<u32, u32, u32, u32, u32, u32, EffectLog, u32, _>(
            move |b: u32| f(x.wrapping_add(b)),
            downstream(),
        )
    });
    probe.compare::<E>("distribute.request", left, right)
}

// =============================================================================
// SUBSTITUTION
// =============================================================================

fn sub_requests<E: Substitute>(
    f: impl Fn(u32) -> Fixture<E> + 'static,
    g: impl Fn(u32) -> Fixture<E> + 'static,
) -> impl Fn(u32) -> Fixture<E> + 'static {
    E::substitute_requests::<u32, u32, u32, u32, u32, u32, EffectLog, u32, u32, _, _>(f, g)
}

fn sub_responds<E: Substitute>(
    f: impl Fn(u32) -> Fixture<E> + 'static,
    g: impl Fn(u32) -> Fixture<E> + 'static,
) -> impl Fn(u32) -> Fixture<E> + 'static {
    E::substitute_responds::<u32, u32, u32, u32, u32, u32, EffectLog, u32, u32, _, _>(f, g)
}

/// `request \>\ f == f == f \>\ request`
pub fn request_substitution_units<E: Substitute + Drive>(
    probe: &Probe,
    f: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    let left = sub_requests::<E>(request::<E>, f)(seed);
    probe.compare::<E>("substitute_requests.left_unit", left, f(seed))?;
    let right = sub_requests::<E>(f, request::<E>)(seed);
    probe.compare::<E>("substitute_requests.right_unit", right, f(seed))
}

/// `(f \>\ g) \>\ h == f \>\ (g \>\ h)`
pub fn request_substitution_associativity<E: Substitute + Drive>(
    probe: &Probe,
    (f, g, h): (FixtureFn<E>, FixtureFn<E>, FixtureFn<E>),
    seed: u32,
) -> Result<(), DuplexError> {
    let left = sub_requests::<E>(sub_requests::<E>(f, g), h)(seed);
    let right = sub_requests::<E>(f, sub_requests::<E>(g, h))(seed);
    probe.compare::<E>("substitute_requests.associativity", left, right)
}

/// `f />/ respond == f == respond />/ f`
pub fn respond_substitution_units<E: Substitute + Drive>(
    probe: &Probe,
    f: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    let right = sub_responds::<E>(f, respond::<E>)(seed);
    probe.compare::<E>("substitute_responds.right_unit", right, f(seed))?;
    let left = sub_responds::<E>(respond::<E>, f)(seed);
    probe.compare::<E>("substitute_responds.left_unit", left, f(seed))
}

/// `(f />/ g) />/ h == f />/ (g />/ h)`
pub fn respond_substitution_associativity<E: Substitute + Drive>(
    probe: &Probe,
    (f, g, h): (FixtureFn<E>, FixtureFn<E>, FixtureFn<E>),
    seed: u32,
) -> Result<(), DuplexError> {
    let left = sub_responds::<E>(sub_responds::<E>(f, g), h)(seed);
    let right = sub_responds::<E>(f, sub_responds::<E>(g, h))(seed);
    probe.compare::<E>("substitute_responds.associativity", left, right)
}

/// Composing with a stateless server equals substituting its answers.
pub fn compose_is_request_substitution<E: Substitute + Drive>(
    probe: &Probe,
    g: FixtureFn<E>,
    seed: u32,
) -> Result<(), DuplexError> {
    let answer = |q: u32| q.wrapping_add(OFFSET);
    let composed = compose::<E>(
        move |q| serve::<E, u32, u32, u32, u32, EffectLog, u32, _>(answer, q),
        g,
    )(seed);
    let substituted = sub_requests::<E>(move |q| done::<E>(answer(q)), g)(seed);
    probe.compare::<E>("compose.as_substitution", composed, substituted)
}

// =============================================================================
// CANCELLATION
// =============================================================================

/// Stalling a pipeline mid-suspension runs nothing after the suspension.
///
/// The upstream logs, responds and would log again; the downstream
/// forwards that response outward and is never resumed. Only the first
/// line may appear in the log.
pub fn cancellation<E: Drive>(seed: u32, config: &DriverConfig) -> Result<(), DuplexError> {
    let upstream = move |_: u32| {
        bind::<E, _>(note::<E>(format!("before {seed}"), seed), |v| {
            bind::<E, _>(respond::<E>(v), |q| note::<E>(format!("after {q}"), q))
        })
    };
    let downstream = |q: u32| bind::<E, _>(request::<E>(q), respond::<E>);
    let pipeline = compose::<E>(upstream, downstream)(seed);

    let probe = Probe::new([], []).with_config(*config);
    let seen = probe.observe::<E>(pipeline);
    let expected = vec![format!("before {seed}")];
    if seen.log == expected && seen.trace.effects == 1 && seen.trace.outcome == Outcome::Stalled {
        Ok(())
    } else {
        Err(DuplexError::LawViolation {
            law: "cancellation".to_string(),
            detail: format!("expected only {expected:?} before the stall, saw {seen:?}"),
        })
    }
}
