//! The collect-three scenario.
//!
//! An upstream responds `1, 2, 3` and then finishes with `"done"`; a
//! downstream requests three times, collecting what it receives. The
//! downstream finishes first, so it decides the pipeline's result and the
//! upstream's `"done"` is never observed.

use serde::{Deserialize, Serialize};

use crate::combinators::{collect, each};
use crate::driver::DriverConfig;
use crate::engine::Drive;
use crate::types::{Closed, DuplexError, Outcome, Script};

use super::fixtures::EffectLog;

/// Values the scenario's upstream responds with.
pub const SCENARIO_VALUES: [u32; 3] = [1, 2, 3];

/// Terminal value of either side of the scenario pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    /// The upstream ran out of values.
    Upstream(String),
    /// The downstream collected everything it asked for.
    Downstream(Vec<u32>),
}

/// Run the scenario on engine `E` and return the collected values.
///
/// Fails with `LawViolation` if the pipeline ends any other way.
pub fn run_scenario<E: Drive>(config: &DriverConfig) -> Result<Vec<u32>, DuplexError> {
    let upstream = |()| {
        E::map::<Closed, (), (), u32, EffectLog, (), Terminal, _>(
            each::<E, u32, EffectLog, _>(SCENARIO_VALUES),
            |()| Terminal::Upstream("done".to_string()),
        )
    };
    let downstream = |()| {
        E::map::<(), u32, (), Closed, EffectLog, Vec<u32>, Terminal, _>(
            collect::<E, u32, EffectLog>(SCENARIO_VALUES.len()),
            Terminal::Downstream,
        )
    };
    let pipeline = E::compose::<Closed, (), (), u32, (), Closed, EffectLog, Terminal, (), _, _>(
        upstream, downstream,
    );

    let mut script: Script<(), ()> = Script::default();
    let trace = E::drive::<Closed, (), (), Closed, EffectLog, Terminal>(
        pipeline(()),
        &mut script,
        &mut EffectLog::new(),
        config,
    );
    match trace.outcome {
        Outcome::Finished(Terminal::Downstream(values)) => Ok(values),
        other => Err(DuplexError::LawViolation {
            law: "scenario".to_string(),
            detail: format!("expected the downstream to finish, got {other:?}"),
        }),
    }
}
