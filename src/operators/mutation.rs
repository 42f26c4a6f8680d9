//! Mutation strategies
//!
//! This module provides the strategy registry and a few deterministic
//! textual strategies.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::MutationError;
use crate::operators::traits::MutationStrategy;

/// Result of applying a randomly chosen strategy
#[derive(Clone, Debug, PartialEq)]
pub enum MutationOutcome {
    /// A strategy produced new content
    Mutated {
        /// The variant content
        content: String,
        /// Name of the strategy that produced it
        strategy: String,
    },
    /// No strategy is registered
    NoStrategy,
    /// The chosen strategy failed or produced unusable output
    Failed {
        /// Name of the strategy that failed
        strategy: String,
        /// What went wrong
        error: MutationError,
    },
}

/// Ordered, mutable list of mutation strategies
#[derive(Default)]
pub struct MutationRegistry {
    strategies: Vec<Box<dyn MutationStrategy>>,
}

impl MutationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a strategy
    pub fn add<M: MutationStrategy + 'static>(&mut self, strategy: M) {
        self.strategies.push(Box::new(strategy));
    }

    /// Register an already boxed strategy
    pub fn add_boxed(&mut self, strategy: Box<dyn MutationStrategy>) {
        self.strategies.push(strategy);
    }

    /// Number of registered strategies
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Check if no strategy is registered
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Names of the registered strategies, in registration order
    pub fn names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Pick a strategy uniformly at random
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<&dyn MutationStrategy> {
        self.strategies.choose(rng).map(|s| s.as_ref())
    }

    /// Apply a uniformly chosen strategy to the content
    ///
    /// Empty or whitespace-only output counts as a failure. With a blank
    /// input even [`IdentityMutation`] fails, so every mutation of a blank
    /// seed is counted as a failure and falls back to a clone.
    pub fn apply<R: Rng>(&self, content: &str, rng: &mut R) -> MutationOutcome {
        let Some(strategy) = self.choose(rng) else {
            return MutationOutcome::NoStrategy;
        };

        let name = strategy.name().to_string();
        match strategy.mutate(content) {
            Ok(mutated) if mutated.trim().is_empty() => MutationOutcome::Failed {
                error: MutationError::EmptyOutput {
                    strategy: name.clone(),
                },
                strategy: name,
            },
            Ok(mutated) => MutationOutcome::Mutated {
                content: mutated,
                strategy: name,
            },
            Err(error) => MutationOutcome::Failed {
                strategy: name,
                error,
            },
        }
    }
}

impl std::fmt::Debug for MutationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

/// Returns the content unchanged
#[derive(Clone, Debug, Default)]
pub struct IdentityMutation;

impl IdentityMutation {
    /// Create a new identity mutation
    pub fn new() -> Self {
        Self
    }
}

impl MutationStrategy for IdentityMutation {
    fn name(&self) -> &str {
        "identity"
    }

    fn mutate(&self, content: &str) -> Result<String, MutationError> {
        Ok(content.to_string())
    }
}

/// Appends a fixed suffix to the content
#[derive(Clone, Debug)]
pub struct AppendMutation {
    /// Text appended verbatim
    pub suffix: String,
}

impl AppendMutation {
    /// Create a new append mutation
    pub fn new(suffix: impl Into<String>) -> Self {
        Self {
            suffix: suffix.into(),
        }
    }
}

impl MutationStrategy for AppendMutation {
    fn name(&self) -> &str {
        "append"
    }

    fn mutate(&self, content: &str) -> Result<String, MutationError> {
        Ok(format!("{}{}", content, self.suffix))
    }
}

/// Prepends a fixed prefix to the content
#[derive(Clone, Debug)]
pub struct PrependMutation {
    /// Text prepended verbatim
    pub prefix: String,
}

impl PrependMutation {
    /// Create a new prepend mutation
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl MutationStrategy for PrependMutation {
    fn name(&self) -> &str {
        "prepend"
    }

    fn mutate(&self, content: &str) -> Result<String, MutationError> {
        Ok(format!("{}{}", self.prefix, content))
    }
}

/// A named function wrapper for infallible mutation
pub struct FnMutation<F> {
    name: String,
    f: F,
}

impl<F> FnMutation<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    /// Create a new function-based strategy
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> MutationStrategy for FnMutation<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn mutate(&self, content: &str) -> Result<String, MutationError> {
        Ok((self.f)(content))
    }
}

/// A named function wrapper for mutation that can fail
pub struct TryFnMutation<F> {
    name: String,
    f: F,
}

impl<F> TryFnMutation<F>
where
    F: Fn(&str) -> Result<String, MutationError> + Send + Sync,
{
    /// Create a new fallible function-based strategy
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> MutationStrategy for TryFnMutation<F>
where
    F: Fn(&str) -> Result<String, MutationError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn mutate(&self, content: &str) -> Result<String, MutationError> {
        (self.f)(content)
    }
}
