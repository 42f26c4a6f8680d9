//! Operator traits
//!
//! This module defines the mutation and parent selection capabilities.

use rand::Rng;

use crate::error::MutationError;
use crate::population::candidate::Candidate;

/// Mutation strategy capability
///
/// Produces a variant of a candidate's content. The engine treats all
/// registered strategies as interchangeable and picks one at random; the
/// name is only used as a lineage tag.
pub trait MutationStrategy: Send + Sync {
    /// Identifier recorded in the child's mutation tags
    fn name(&self) -> &str;

    /// Produce a mutated variant of the content
    fn mutate(&self, content: &str) -> Result<String, MutationError>;
}

impl<T: MutationStrategy + ?Sized> MutationStrategy for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn mutate(&self, content: &str) -> Result<String, MutationError> {
        (**self).mutate(content)
    }
}

/// Parent selection operator trait
///
/// Chooses the breeding pool from an evaluated population.
pub trait ParentSelection: Send + Sync {
    /// Select up to `count` candidates from the population
    ///
    /// Returns indices into `population`. An empty population yields an
    /// empty selection.
    fn select<R: Rng>(&self, population: &[Candidate], count: usize, rng: &mut R) -> Vec<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Mock strategy for testing
    struct Shout;

    impl MutationStrategy for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn mutate(&self, content: &str) -> Result<String, MutationError> {
            Ok(content.to_uppercase())
        }
    }

    // Mock selection that returns the last `count` indices
    struct TakeLast;

    impl ParentSelection for TakeLast {
        fn select<R: Rng>(
            &self,
            population: &[Candidate],
            count: usize,
            _rng: &mut R,
        ) -> Vec<usize> {
            let start = population.len().saturating_sub(count);
            (start..population.len()).collect()
        }
    }

    #[test]
    fn test_mock_strategy() {
        let strategy = Shout;
        assert_eq!(strategy.name(), "shout");
        assert_eq!(strategy.mutate("be brief").unwrap(), "BE BRIEF");
    }

    #[test]
    fn test_boxed_strategy() {
        let boxed: Box<dyn MutationStrategy> = Box::new(Shout);
        assert_eq!(boxed.name(), "shout");
        assert_eq!(boxed.mutate("a").unwrap(), "A");
    }

    #[test]
    fn test_mock_selection() {
        let mut rng = rand::thread_rng();
        let population: Vec<Candidate> = (0..5)
            .map(|i| Candidate::seed(format!("p{}", i)).with_fitness(i as f64))
            .collect();

        let indices = TakeLast.select(&population, 2, &mut rng);
        assert_eq!(indices, vec![3, 4]);
        assert!(TakeLast.select(&[], 2, &mut rng).is_empty());
    }
}
