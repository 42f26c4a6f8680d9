//! Termination criteria
//!
//! This module provides termination criteria for the generational loop.
//! A run always stops after its generation budget; the other criteria let
//! callers stop earlier.

use crate::population::population::Population;

/// Evolution state for termination checking
#[derive(Clone, Debug)]
pub struct EvolutionState<'a> {
    /// Generations completed so far
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best fitness observed so far (None before anything was scored)
    pub best_fitness: Option<f64>,
    /// Reference to the most recently evaluated population
    pub population: &'a Population,
    /// Best-ever fitness after each completed generation
    pub fitness_history: &'a [f64],
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

impl<T: TerminationCriterion + ?Sized> TerminationCriterion for Box<T> {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        (**self).should_terminate(state)
    }

    fn reason(&self) -> &'static str {
        (**self).reason()
    }
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate once an evaluation budget is spent
///
/// Checked after each generation, so the final generation may overshoot the
/// budget by up to one population of evaluations.
#[derive(Clone, Debug)]
pub struct MaxEvaluations(pub usize);

impl MaxEvaluations {
    /// Create a new max evaluations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxEvaluations {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        state.evaluations >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum evaluations reached"
    }
}

/// Terminate when the best-ever fitness stops improving
#[derive(Clone, Debug)]
pub struct FitnessStagnation {
    /// Number of generations to look back
    pub window: usize,
    /// Minimum improvement threshold
    pub epsilon: f64,
}

impl FitnessStagnation {
    /// Create a new fitness stagnation criterion
    pub fn new(window: usize, epsilon: f64) -> Self {
        Self { window, epsilon }
    }
}

impl TerminationCriterion for FitnessStagnation {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        if self.window == 0 || state.fitness_history.len() < self.window {
            return false;
        }

        let window = &state.fitness_history[state.fitness_history.len() - self.window..];
        let improvement = (window[window.len() - 1] - window[0]).abs();

        improvement < self.epsilon
    }

    fn reason(&self) -> &'static str {
        "Fitness stagnation detected"
    }
}

/// Terminate when target fitness is reached
#[derive(Clone, Debug)]
pub struct TargetFitness {
    /// Target fitness value
    pub target: f64,
    /// Tolerance for reaching target
    pub tolerance: f64,
}

impl TargetFitness {
    /// Create a new target fitness criterion
    pub fn new(target: f64) -> Self {
        Self {
            target,
            tolerance: 0.0,
        }
    }

    /// Create with a tolerance
    pub fn with_tolerance(target: f64, tolerance: f64) -> Self {
        Self { target, tolerance }
    }
}

impl TerminationCriterion for TargetFitness {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        state
            .best_fitness
            .is_some_and(|best| best >= self.target - self.tolerance)
    }

    fn reason(&self) -> &'static str {
        "Target fitness reached"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &EvolutionState<'_>) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }
}

pub mod prelude {
    pub use super::{
        AnyOf, EvolutionState, FitnessStagnation, MaxEvaluations, MaxGenerations, TargetFitness,
        TerminationCriterion,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::population::candidate::Candidate;

    fn create_test_state<'a>(
        generation: usize,
        evaluations: usize,
        best_fitness: Option<f64>,
        population: &'a Population,
        fitness_history: &'a [f64],
    ) -> EvolutionState<'a> {
        EvolutionState {
            generation,
            evaluations,
            best_fitness,
            population,
            fitness_history,
        }
    }

    fn single() -> Population {
        Population::from_candidates(vec![Candidate::seed("x").with_fitness(0.5)])
    }

    #[test]
    fn test_max_generations() {
        let pop = single();
        let criterion = MaxGenerations::new(3);

        assert!(!criterion.should_terminate(&create_test_state(2, 0, None, &pop, &[])));
        assert!(criterion.should_terminate(&create_test_state(3, 0, None, &pop, &[])));
        assert_eq!(criterion.reason(), "Maximum generations reached");
    }

    #[test]
    fn test_max_evaluations() {
        let pop = single();
        let criterion = MaxEvaluations::new(20);

        assert!(!criterion.should_terminate(&create_test_state(0, 19, None, &pop, &[])));
        assert!(criterion.should_terminate(&create_test_state(0, 20, None, &pop, &[])));
    }

    #[test]
    fn test_fitness_stagnation() {
        let pop = single();
        let criterion = FitnessStagnation::new(3, 0.01);

        let history = [0.2, 0.4];
        assert!(!criterion.should_terminate(&create_test_state(2, 0, Some(0.4), &pop, &history)));

        let history = [0.2, 0.4, 0.6];
        assert!(!criterion.should_terminate(&create_test_state(3, 0, Some(0.6), &pop, &history)));

        let history = [0.2, 0.6, 0.6, 0.6];
        assert!(criterion.should_terminate(&create_test_state(4, 0, Some(0.6), &pop, &history)));
    }

    #[test]
    fn test_target_fitness() {
        let pop = single();
        let criterion = TargetFitness::new(1.0);

        assert!(!criterion.should_terminate(&create_test_state(0, 0, None, &pop, &[])));
        assert!(!criterion.should_terminate(&create_test_state(0, 0, Some(0.9), &pop, &[])));
        assert!(criterion.should_terminate(&create_test_state(0, 0, Some(1.0), &pop, &[])));

        let criterion = TargetFitness::with_tolerance(1.0, 0.1);
        assert!(criterion.should_terminate(&create_test_state(0, 0, Some(0.95), &pop, &[])));
    }

    #[test]
    fn test_any_of() {
        let pop = single();
        let criterion = AnyOf::new(vec![
            Box::new(MaxGenerations::new(100)),
            Box::new(TargetFitness::new(1.0)),
        ]);

        assert!(!criterion.should_terminate(&create_test_state(50, 0, Some(0.2), &pop, &[])));
        assert!(criterion.should_terminate(&create_test_state(100, 0, Some(0.2), &pop, &[])));
        assert!(criterion.should_terminate(&create_test_state(50, 0, Some(1.0), &pop, &[])));
    }
}
