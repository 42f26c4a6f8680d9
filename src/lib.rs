//! # spore-evo
//!
//! Generational evolutionary search over text prompts.
//!
//! A seed prompt is expanded into a population of variants by pluggable
//! mutation strategies. Each generation is scored by a pluggable fitness
//! evaluator against a set of test cases; the best candidates become parents
//! of the next generation, and the best candidate is always carried forward.
//!
//! ## Core Concepts
//!
//! - **Injected capabilities**: mutation strategies and the evaluator are
//!   traits; a language model client is one possible implementation
//! - **Contained failures**: a failed mutation degrades to a clone and a
//!   failed evaluation scores 0.0, so a run always produces a result
//! - **Reproducible runs**: every random choice draws from the RNG passed in
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use spore_evo::prelude::*;
//! use rand::SeedableRng;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//!
//! let evolver = PromptEvolver::builder()
//!     .population_size(4)
//!     .generations(3)
//!     .strategy(AppendMutation::new(" Be concise."))
//!     .evaluator(FnEvaluator::new(|prompt: &str, _: &[TestCase]| {
//!         if prompt.contains("concise") { 1.0 } else { 0.2 }
//!     }))
//!     .build()?;
//!
//! let best = evolver.evolve("Answer the question.", &[], 3, 4, 1.0, &mut rng)?;
//! ```

pub mod algorithms;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod operators;
pub mod population;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::termination::prelude::*;
}
