//! # duplex-core
//!
//! Bidirectional pipeline stages: the algebra and its reference engine.
//!
//! A stage can request values from the stage above it, respond with values
//! to the stage below it, run actions in an effect context, and finally
//! terminate with a result. Stages compose end to end into pipelines that
//! are stages themselves.
//!
//! ## Layout
//!
//! - `stage` / `primitives`: the reference representation and its
//!   constructors (`request`, `respond`, `pure`, `embed`, `identity`, `push`)
//! - `compositor`: pull and push composition
//! - `substitution`: rewriting the requests or responds inside a stage
//! - `engine`: the same interface as traits (`Engine`, `Substitute`,
//!   `Drive`), implemented by `Reference`
//! - `combinators`: engine-generic convenience stages
//! - `driver`: runs stages against a context or a script
//! - `conformance`: observational law checks for any engine
//!
//! ## Constraints
//!
//! - Single-threaded: a stage runs only when a driver advances it
//! - Deterministic: the interleaving of a pipeline is fixed by its stages
//! - Channel mismatches are compile errors, never run-time errors
//! - Dropping an unfinished stage runs none of its pending continuations
//!
//! ## Example
//!
//! ```
//! use duplex_core::combinators::{collect, each, map};
//! use duplex_core::{Compositor, Driver, Reference};
//!
//! let pipeline = Compositor::compose(
//!     Compositor::compose(
//!         |()| each::<Reference, u32, (), _>(vec![1, 2, 3]).map(|()| Vec::new()),
//!         |()| map::<Reference, u32, u32, (), Vec<u32>, _>(|x| x + 1),
//!     ),
//!     |()| collect::<Reference, u32, ()>(3),
//! );
//! let result = Driver::new().run(pipeline(()), &mut ()).unwrap();
//! assert_eq!(result, vec![2, 3, 4]);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod combinators;
pub mod compositor;
pub mod conformance;
pub mod driver;
pub mod engine;
pub mod primitives;
pub mod stage;
pub mod substitution;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Closed, DuplexError, Event, Outcome, Script, Trace};

// =============================================================================
// RE-EXPORTS: Stages and Composition
// =============================================================================

pub use compositor::Compositor;
pub use primitives::{DEFAULT_MAX_STEPS, embed, identity, pure, push, request, respond};
pub use stage::{Client, Consumer, Effect, Pipe, Producer, Server, Stage};
pub use substitution::{
    for_each_request, for_each_respond, substitute_requests, substitute_responds,
};

// =============================================================================
// RE-EXPORTS: Engines and Drivers
// =============================================================================

pub use driver::{Driver, DriverConfig};
pub use engine::{Drive, Engine, Reference, Substitute};

// =============================================================================
// RE-EXPORTS: Conformance
// =============================================================================

pub use conformance::{LawReport, Probe, Suite, SuiteReport};
