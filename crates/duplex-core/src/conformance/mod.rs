//! # Conformance Suite
//!
//! Checks an engine against the stage laws by observation.
//!
//! Laws cannot be proven by running code, but they can be refuted. The
//! suite builds both sides of every law from a small set of fixed stages
//! ([`fixtures`]), drives them with the same [`Probe`], and compares traces,
//! effect logs and results.
//!
//! ```
//! use duplex_core::{Reference, Suite};
//!
//! let report = Suite::default().run::<Reference>();
//! assert!(report.passed(), "{report:?}");
//! ```

pub mod checks;
pub mod fixtures;
pub mod scenario;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{Drive, Substitute};
use crate::types::DuplexError;

pub use checks::{Observation, Probe};
pub use fixtures::{EffectLog, Fixture, FixtureFn};
pub use scenario::{SCENARIO_VALUES, Terminal, run_scenario};

// =============================================================================
// REPORT
// =============================================================================

/// Result of checking one law over every case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LawReport {
    /// Law name, e.g. `compose.associativity`.
    pub law: String,
    /// Number of cases checked.
    pub cases: usize,
    /// One line per failing case.
    pub failures: Vec<String>,
}

impl LawReport {
    /// Check whether every case held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Result of a full suite run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Per-law results, in the order they were checked.
    pub laws: Vec<LawReport>,
}

impl SuiteReport {
    /// Check whether every law held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.laws.iter().all(LawReport::passed)
    }

    /// Total number of cases checked.
    #[must_use]
    pub fn cases(&self) -> usize {
        self.laws.iter().map(|law| law.cases).sum()
    }

    /// Total number of failing cases.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.laws.iter().map(|law| law.failures.len()).sum()
    }

    /// Convert into an error naming the first failing law, if any.
    pub fn into_result(self) -> Result<Self, DuplexError> {
        let first = self
            .laws
            .iter()
            .find_map(|law| law.failures.first().map(|detail| (law.law.clone(), detail.clone())));
        match first {
            Some((law, detail)) => Err(DuplexError::LawViolation { law, detail }),
            None => Ok(self),
        }
    }
}

// =============================================================================
// SUITE
// =============================================================================

/// A configured conformance run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    seeds: Vec<u32>,
    probe: Probe,
}

impl Default for Suite {
    fn default() -> Self {
        Self {
            seeds: vec![0, 1, 42],
            probe: Probe::default(),
        }
    }
}

impl Suite {
    /// Create a suite over `seeds` with the given probe.
    #[must_use]
    pub fn new(seeds: Vec<u32>, probe: Probe) -> Self {
        Self { seeds, probe }
    }

    /// The seeds every fixture is started with.
    #[must_use]
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// The script and limits both sides of every law are driven with.
    #[must_use]
    pub fn probe(&self) -> &Probe {
        &self.probe
    }

    /// Check every law on engine `E`.
    pub fn run<E: Substitute + Drive>(&self) -> SuiteReport {
        let probe = &self.probe;
        let mut report = SuiteReport::default();

        let mut record = |law: &str, outcomes: Vec<(String, Result<(), DuplexError>)>| {
            let cases = outcomes.len();
            let failures: Vec<String> = outcomes
                .into_iter()
                .filter_map(|(case, outcome)| outcome.err().map(|err| format!("{case}: {err}")))
                .collect();
            if failures.is_empty() {
                debug!(law, cases, "law held");
            } else {
                warn!(law, cases, failed = failures.len(), "law violated");
            }
            report.laws.push(LawReport {
                law: law.to_string(),
                cases,
                failures,
            });
        };

        record(
            "compose.left_identity",
            self.unary::<E>(|f, s| checks::left_identity::<E>(probe, f, s)),
        );
        record(
            "compose.right_identity",
            self.unary::<E>(|f, s| checks::right_identity::<E>(probe, f, s)),
        );
        record(
            "compose.associativity",
            self.ternary::<E>(|t, s| checks::compose_associativity::<E>(probe, t, s)),
        );
        record(
            "compose.orientation",
            self.binary::<E>(|p, s| checks::compose_orientation::<E>(probe, p, s)),
        );
        record(
            "sequence.left_identity",
            self.unary::<E>(|f, s| checks::sequence_left_identity::<E>(probe, f, s)),
        );
        record(
            "sequence.right_identity",
            self.unary::<E>(|f, s| checks::sequence_right_identity::<E>(probe, f, s)),
        );
        record(
            "sequence.associativity",
            self.ternary::<E>(|t, s| checks::sequence_associativity::<E>(probe, t, s)),
        );
        record(
            "effect.homomorphism",
            self.unary::<E>(|f, s| checks::embed_homomorphism::<E>(probe, f, s)),
        );
        record(
            "effect.commutes_with_compose",
            self.binary::<E>(|p, s| checks::effect_commutes_with_compose::<E>(probe, p, s)),
        );
        record(
            "absorption.upstream",
            self.cases::<E>(&fixtures::requesting_first::<E>(), |f, s| {
                checks::absorb_upstream::<E>(probe, f, s)
            }),
        );
        record(
            "absorption.downstream",
            self.unary::<E>(|f, s| checks::absorb_downstream::<E>(probe, f, s)),
        );
        record("fusion", self.binary::<E>(|p, s| checks::fusion::<E>(probe, p, s)));
        record(
            "distribute.respond",
            self.binary::<E>(|p, s| checks::distribute_over_respond::<E>(probe, p, s)),
        );
        record(
            "distribute.request",
            self.binary::<E>(|p, s| checks::distribute_over_request::<E>(probe, p, s)),
        );
        record(
            "substitute_requests.units",
            self.unary::<E>(|f, s| checks::request_substitution_units::<E>(probe, f, s)),
        );
        record(
            "substitute_requests.associativity",
            self.ternary::<E>(|t, s| checks::request_substitution_associativity::<E>(probe, t, s)),
        );
        record(
            "substitute_responds.units",
            self.unary::<E>(|f, s| checks::respond_substitution_units::<E>(probe, f, s)),
        );
        record(
            "substitute_responds.associativity",
            self.ternary::<E>(|t, s| checks::respond_substitution_associativity::<E>(probe, t, s)),
        );
        record(
            "compose.as_substitution",
            self.unary::<E>(|f, s| checks::compose_is_request_substitution::<E>(probe, f, s)),
        );
        record(
            "cancellation",
            self.seeds
                .iter()
                .map(|&s| (format!("seed {s}"), checks::cancellation::<E>(s, &probe.config)))
                .collect(),
        );
        record("scenario", vec![("collect three".to_string(), self.scenario::<E>())]);

        report
    }

    fn scenario<E: Drive>(&self) -> Result<(), DuplexError> {
        let values = run_scenario::<E>(&self.probe.config)?;
        if values == SCENARIO_VALUES {
            Ok(())
        } else {
            Err(DuplexError::LawViolation {
                law: "scenario".to_string(),
                detail: format!("expected {SCENARIO_VALUES:?}, collected {values:?}"),
            })
        }
    }

    fn cases<E: Drive>(
        &self,
        fixtures: &[(&'static str, FixtureFn<E>)],
        check: impl Fn(FixtureFn<E>, u32) -> Result<(), DuplexError>,
    ) -> Vec<(String, Result<(), DuplexError>)> {
        let mut outcomes = Vec::new();
        for &seed in &self.seeds {
            for &(name, f) in fixtures {
                outcomes.push((format!("{name}@{seed}"), check(f, seed)));
            }
        }
        outcomes
    }

    fn unary<E: Drive>(
        &self,
        check: impl Fn(FixtureFn<E>, u32) -> Result<(), DuplexError>,
    ) -> Vec<(String, Result<(), DuplexError>)> {
        self.cases::<E>(&fixtures::all::<E>(), check)
    }

    fn binary<E: Drive>(
        &self,
        check: impl Fn((FixtureFn<E>, FixtureFn<E>), u32) -> Result<(), DuplexError>,
    ) -> Vec<(String, Result<(), DuplexError>)> {
        let all = fixtures::all::<E>();
        let mut outcomes = Vec::new();
        for &seed in &self.seeds {
            for &(f_name, f) in &all {
                for &(g_name, g) in &all {
                    outcomes.push((format!("{f_name},{g_name}@{seed}"), check((f, g), seed)));
                }
            }
        }
        outcomes
    }

    fn ternary<E: Drive>(
        &self,
        check: impl Fn((FixtureFn<E>, FixtureFn<E>, FixtureFn<E>), u32) -> Result<(), DuplexError>,
    ) -> Vec<(String, Result<(), DuplexError>)> {
        let all = fixtures::all::<E>();
        let mut outcomes = Vec::new();
        for &seed in &self.seeds {
            for &(f_name, f) in &all {
                for &(g_name, g) in &all {
                    for &(h_name, h) in &all {
                        let case = format!("{f_name},{g_name},{h_name}@{seed}");
                        outcomes.push((case, check((f, g, h), seed)));
                    }
                }
            }
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Reference;

    #[test]
    fn reference_engine_passes_default_suite() {
        let report = Suite::default().run::<Reference>();
        for law in &report.laws {
            assert!(law.passed(), "{}: {:?}", law.law, law.failures);
        }
        assert!(report.cases() > 0);
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn failing_report_converts_to_law_violation() {
        let report = SuiteReport {
            laws: vec![LawReport {
                law: "fusion".to_string(),
                cases: 2,
                failures: vec!["echo,echo@0: mismatch".to_string()],
            }],
        };
        assert!(!report.passed());
        assert!(matches!(
            report.into_result(),
            Err(DuplexError::LawViolation { ref law, .. }) if law == "fusion"
        ));
    }
}
