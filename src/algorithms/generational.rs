//! Generational prompt evolution
//!
//! This module implements the generational loop: evaluate, track the best,
//! select parents, breed the next generation with elitism.

use std::time::Instant;

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{EvolutionResult, EvolutionStats, GenerationStats, History, TimingStats};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{FitnessEvaluator, TestCase};
use crate::operators::mutation::MutationRegistry;
use crate::operators::selection::TruncationSelection;
use crate::operators::traits::{MutationStrategy, ParentSelection};
use crate::population::candidate::Candidate;
use crate::population::population::Population;
use crate::termination::{EvolutionState, MaxGenerations, TerminationCriterion};

/// Default number of parents kept for breeding
pub const DEFAULT_NUM_PARENTS: usize = 3;

/// Configuration for the prompt evolver
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Population size
    pub population_size: usize,
    /// Probability that a child is mutated rather than cloned
    pub mutation_rate: f64,
    /// Number of parents selected each generation
    pub num_parents: usize,
    /// Number of generations to run
    pub generations: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            mutation_rate: 0.3,
            num_parents: DEFAULT_NUM_PARENTS,
            generations: 5,
        }
    }
}

impl EvolutionConfig {
    /// Check the configuration
    pub fn validate(&self) -> EvoResult<()> {
        if self.population_size == 0 {
            return Err(EvolutionError::Configuration(
                "Population size must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(EvolutionError::Configuration(format!(
                "Mutation rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.num_parents == 0 {
            return Err(EvolutionError::Configuration(
                "Number of parents must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for PromptEvolver
pub struct PromptEvolverBuilder<S = TruncationSelection> {
    config: EvolutionConfig,
    registry: MutationRegistry,
    evaluator: Option<Box<dyn FitnessEvaluator>>,
    selection: S,
    termination: Option<Box<dyn TerminationCriterion>>,
}

impl PromptEvolverBuilder<TruncationSelection> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: EvolutionConfig::default(),
            registry: MutationRegistry::new(),
            evaluator: None,
            selection: TruncationSelection::new(),
            termination: None,
        }
    }
}

impl Default for PromptEvolverBuilder<TruncationSelection> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ParentSelection> PromptEvolverBuilder<S> {
    /// Replace the whole configuration
    pub fn config(mut self, config: EvolutionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the mutation rate
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.config.mutation_rate = rate;
        self
    }

    /// Set the number of parents selected each generation
    pub fn num_parents(mut self, count: usize) -> Self {
        self.config.num_parents = count;
        self
    }

    /// Set the number of generations
    pub fn generations(mut self, generations: usize) -> Self {
        self.config.generations = generations;
        self
    }

    /// Register a mutation strategy
    pub fn strategy<M: MutationStrategy + 'static>(mut self, strategy: M) -> Self {
        self.registry.add(strategy);
        self
    }

    /// Set the fitness evaluator
    pub fn evaluator<E: FitnessEvaluator + 'static>(mut self, evaluator: E) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// Set an early termination criterion
    pub fn termination<T: TerminationCriterion + 'static>(mut self, termination: T) -> Self {
        self.termination = Some(Box::new(termination));
        self
    }

    /// Set the parent selection operator
    pub fn selection<NewS: ParentSelection>(self, selection: NewS) -> PromptEvolverBuilder<NewS> {
        PromptEvolverBuilder {
            config: self.config,
            registry: self.registry,
            evaluator: self.evaluator,
            selection,
            termination: self.termination,
        }
    }

    /// Build the PromptEvolver instance
    ///
    /// A missing evaluator is not a build error; running without one fails
    /// with [`EvolutionError::NotConfigured`].
    pub fn build(self) -> EvoResult<PromptEvolver<S>> {
        self.config.validate()?;

        Ok(PromptEvolver {
            config: self.config,
            registry: self.registry,
            evaluator: self.evaluator,
            selection: self.selection,
            termination: self.termination,
        })
    }
}

/// Generational evolutionary search over prompt text
///
/// Mutation and scoring are injected capabilities. Each run is strictly
/// sequential; all randomness comes from the caller's RNG, so a seeded RNG
/// with deterministic capabilities reproduces a run exactly.
pub struct PromptEvolver<S = TruncationSelection> {
    config: EvolutionConfig,
    registry: MutationRegistry,
    evaluator: Option<Box<dyn FitnessEvaluator>>,
    selection: S,
    termination: Option<Box<dyn TerminationCriterion>>,
}

impl PromptEvolver<TruncationSelection> {
    /// Create a builder for PromptEvolver
    pub fn builder() -> PromptEvolverBuilder<TruncationSelection> {
        PromptEvolverBuilder::new()
    }

    /// Create an evolver with the default configuration and no capabilities
    pub fn new() -> Self {
        Self {
            config: EvolutionConfig::default(),
            registry: MutationRegistry::new(),
            evaluator: None,
            selection: TruncationSelection::new(),
            termination: None,
        }
    }
}

impl Default for PromptEvolver<TruncationSelection> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ParentSelection> PromptEvolver<S> {
    /// Register a mutation strategy
    pub fn add_strategy<M: MutationStrategy + 'static>(&mut self, strategy: M) {
        self.registry.add(strategy);
    }

    /// Set the fitness evaluator
    pub fn set_evaluator<E: FitnessEvaluator + 'static>(&mut self, evaluator: E) {
        self.evaluator = Some(Box::new(evaluator));
    }

    /// Check if an evaluator is configured
    pub fn has_evaluator(&self) -> bool {
        self.evaluator.is_some()
    }

    /// The registered strategies
    pub fn registry(&self) -> &MutationRegistry {
        &self.registry
    }

    /// The run configuration
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Create generation 0 from a seed with the registered strategies
    pub fn create_initial_population<R: Rng>(
        &self,
        seed_content: &str,
        count: usize,
        rng: &mut R,
    ) -> Population {
        Population::create_initial(seed_content, count, &self.registry, rng).population
    }

    /// Evolve a seed and return the best content found
    ///
    /// Out-of-range arguments are clamped rather than rejected. The only
    /// error is [`EvolutionError::NotConfigured`] when no evaluator is set;
    /// every other failure degrades, at worst to returning the seed.
    pub fn evolve<R: Rng>(
        &self,
        seed_content: &str,
        test_cases: &[TestCase],
        generations: usize,
        population_size: usize,
        mutation_rate: f64,
        rng: &mut R,
    ) -> EvoResult<String> {
        let config = EvolutionConfig {
            population_size: clamp_population_size(population_size),
            mutation_rate: clamp_mutation_rate(mutation_rate),
            num_parents: self.config.num_parents.max(1),
            generations,
        };

        self.run_with(seed_content, test_cases, &config, rng)
            .map(|result| result.best_content)
    }

    /// Run with the configured parameters and return the full result
    pub fn run<R: Rng>(
        &self,
        seed_content: &str,
        test_cases: &[TestCase],
        rng: &mut R,
    ) -> EvoResult<EvolutionResult> {
        self.run_with(seed_content, test_cases, &self.config, rng)
    }

    fn run_with<R: Rng>(
        &self,
        seed_content: &str,
        test_cases: &[TestCase],
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> EvoResult<EvolutionResult> {
        let evaluator = self.evaluator.as_deref().ok_or_else(|| {
            EvolutionError::NotConfigured(
                "a fitness evaluator must be set before evolving".to_string(),
            )
        })?;

        if config.generations == 0 {
            info!("zero generations requested, returning the seed unchanged");
            return Ok(EvolutionResult::unevaluated(seed_content));
        }

        let start_time = Instant::now();
        let max_generations = MaxGenerations::new(config.generations);

        let mut history = History::new();
        let mut stats = EvolutionStats::new();
        let mut fitness_history: Vec<f64> = Vec::with_capacity(config.generations);
        let mut best_ever: Option<Candidate> = None;
        let mut evaluations = 0;
        let mut generation = 0;

        let initial =
            Population::create_initial(seed_content, config.population_size, &self.registry, rng);
        history.record_mutation_failures(initial.mutation_failures);
        let mut population = initial.population;

        loop {
            generation += 1;
            let gen_start = Instant::now();
            population.set_generation(generation);

            // Evaluate
            let eval_start = Instant::now();
            let report = population.evaluate(evaluator, test_cases);
            let eval_time = eval_start.elapsed();
            evaluations += report.evaluated;
            history.record_evaluation_failures(report.failures);

            // Track best; the first candidate wins ties
            let current_best = population.best().cloned();
            if let Some(best) = &current_best {
                let improved = best_ever
                    .as_ref()
                    .map_or(true, |known| best.is_better_than(known));
                if improved {
                    best_ever = Some(best.clone());
                }
            }
            history.record(population.iter());

            let best_fitness = best_ever.as_ref().and_then(|c| c.fitness);
            info!(
                "generation {}/{} | best {:.3} | best ever {:.3}",
                generation,
                config.generations,
                current_best
                    .as_ref()
                    .and_then(|c| c.fitness)
                    .unwrap_or(f64::NEG_INFINITY),
                best_fitness.unwrap_or(f64::NEG_INFINITY)
            );
            if let Some(best) = &current_best {
                debug!("  prompt: {}", preview(&best.content));
            }

            // Select parents and breed
            let breed_start = Instant::now();
            let parents = population.select_with(&self.selection, config.num_parents, rng);
            let bred = match &current_best {
                Some(best) => Population::breed_next_generation(
                    best,
                    &parents,
                    config.population_size,
                    config.mutation_rate,
                    &self.registry,
                    rng,
                ),
                None => Err(EvolutionError::EmptyPopulation),
            };
            let offspring = match bred {
                Ok(offspring) => offspring,
                Err(err) => {
                    warn!(
                        "generation {}: {}, re-seeding from the original seed",
                        generation, err
                    );
                    Population::create_initial(
                        seed_content,
                        config.population_size,
                        &self.registry,
                        rng,
                    )
                }
            };
            let breed_time = breed_start.elapsed();
            history.record_mutation_failures(offspring.mutation_failures);

            let timing = TimingStats::new()
                .with_evaluation(eval_time)
                .with_breeding(breed_time)
                .with_total(gen_start.elapsed());
            stats.record(
                GenerationStats::from_population(&population, generation, evaluations)
                    .with_failures(report.failures, offspring.mutation_failures)
                    .with_timing(timing),
            );
            if let Some(fitness) = best_fitness {
                fitness_history.push(fitness);
            }

            let state = EvolutionState {
                generation,
                evaluations,
                best_fitness,
                population: &population,
                fitness_history: &fitness_history,
            };
            let stop = if max_generations.should_terminate(&state) {
                Some(max_generations.reason())
            } else {
                self.termination
                    .as_ref()
                    .filter(|t| t.should_terminate(&state))
                    .map(|t| t.reason())
            };

            population = offspring.population;

            if let Some(reason) = stop {
                stats.set_termination_reason(reason);
                break;
            }
        }

        stats.set_runtime(start_time.elapsed());

        let best_content = best_ever
            .as_ref()
            .map(|c| c.content.clone())
            .unwrap_or_else(|| seed_content.to_string());

        Ok(EvolutionResult {
            best_fitness: best_ever.as_ref().and_then(|c| c.fitness),
            best: best_ever,
            best_content,
            generations: generation,
            evaluations,
            history,
            stats,
        })
    }
}

fn clamp_population_size(size: usize) -> usize {
    if size == 0 {
        warn!("population size 0 requested, using 1");
        1
    } else {
        size
    }
}

fn clamp_mutation_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        warn!("mutation rate is NaN, using 0.0");
        0.0
    } else if !(0.0..=1.0).contains(&rate) {
        let clamped = rate.clamp(0.0, 1.0);
        warn!("mutation rate {} out of range, using {}", rate, clamped);
        clamped
    } else {
        rate
    }
}

fn preview(content: &str) -> String {
    const PREVIEW_CHARS: usize = 80;
    if content.chars().count() > PREVIEW_CHARS {
        let head: String = content.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EvaluationError, MutationError};
    use crate::fitness::traits::{FnEvaluator, TryFnEvaluator};
    use crate::operators::mutation::{AppendMutation, IdentityMutation, TryFnMutation};
    use crate::operators::selection::TournamentSelection;
    use crate::termination::{AnyOf, MaxEvaluations, TargetFitness};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn concise_evaluator() -> impl FitnessEvaluator + 'static {
        FnEvaluator::new(|content: &str, _: &[TestCase]| {
            if content.contains("concise") {
                1.0
            } else {
                0.2
            }
        })
    }

    fn test_cases() -> Vec<TestCase> {
        vec![
            TestCase::new("hello", "friendly greeting"),
            TestCase::new("what's the weather?", "weather information"),
        ]
    }

    #[test]
    fn test_builder_defaults() {
        let evolver = PromptEvolver::builder().build().unwrap();

        assert_eq!(evolver.config(), &EvolutionConfig::default());
        assert!(!evolver.has_evaluator());
        assert!(evolver.registry().is_empty());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let err = PromptEvolver::builder().population_size(0).build().err().unwrap();
        assert!(err.to_string().contains("Population size"));

        let err = PromptEvolver::builder().mutation_rate(1.5).build().err().unwrap();
        assert!(matches!(err, EvolutionError::Configuration(_)));

        let err = PromptEvolver::builder().num_parents(0).build().err().unwrap();
        assert!(err.to_string().contains("parents"));
    }

    #[test]
    fn test_evolve_without_evaluator_is_not_configured() {
        let mut rng = StdRng::seed_from_u64(0);
        let evolver = PromptEvolver::new();

        let result = evolver.evolve("seed", &[], 3, 4, 0.5, &mut rng);
        assert!(matches!(result, Err(EvolutionError::NotConfigured(_))));

        let result = evolver.evolve("seed", &[], 0, 4, 0.5, &mut rng);
        assert!(matches!(result, Err(EvolutionError::NotConfigured(_))));
    }

    #[test]
    fn test_zero_generations_returns_seed() {
        let mut rng = StdRng::seed_from_u64(0);
        let evolver = PromptEvolver::builder()
            .strategy(AppendMutation::new(" Be concise."))
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let best = evolver
            .evolve("Answer the question.", &test_cases(), 0, 4, 1.0, &mut rng)
            .unwrap();
        assert_eq!(best, "Answer the question.");
    }

    #[test]
    fn test_concise_scenario() {
        let mut rng = StdRng::seed_from_u64(42);
        let evolver = PromptEvolver::builder()
            .population_size(4)
            .generations(3)
            .mutation_rate(1.0)
            .strategy(AppendMutation::new(" Be concise."))
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let result = evolver.run("Answer the question.", &test_cases(), &mut rng).unwrap();

        assert!(result.best_content.contains("Be concise."));
        assert_eq!(result.best_fitness, Some(1.0));
        assert_eq!(result.generations, 3);
        assert_eq!(result.stats.num_generations(), 3);
        assert_eq!(
            result.stats.termination_reason.as_deref(),
            Some("Maximum generations reached")
        );
    }

    #[test]
    fn test_elite_is_not_re_evaluated() {
        let mut rng = StdRng::seed_from_u64(3);
        let evolver = PromptEvolver::builder()
            .population_size(4)
            .generations(2)
            .mutation_rate(0.0)
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let result = evolver.run("seed", &[], &mut rng).unwrap();
        // Generation 1 scores 4 candidates, generation 2 only the 3 clones
        assert_eq!(result.evaluations, 7);
    }

    #[test]
    fn test_history_records_every_scored_candidate() {
        let mut rng = StdRng::seed_from_u64(3);
        let evolver = PromptEvolver::builder()
            .population_size(5)
            .generations(3)
            .strategy(AppendMutation::new(" Be concise."))
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let result = evolver.run("seed", &test_cases(), &mut rng).unwrap();
        let summary = result.summary();

        assert_eq!(summary.total_variants, 15);
        assert_eq!(summary.best_fitness, 1.0);
        assert!((summary.improvement - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_mutation_failures_fall_back_to_seed() {
        let mut rng = StdRng::seed_from_u64(5);
        let evolver = PromptEvolver::builder()
            .population_size(4)
            .generations(4)
            .mutation_rate(1.0)
            .strategy(TryFnMutation::new("broken", |_: &str| {
                Err(MutationError::Failed("backend down".to_string()))
            }))
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let result = evolver.run("Original.", &[], &mut rng).unwrap();

        assert_eq!(result.best_content, "Original.");
        assert_eq!(result.generations, 4);
        // 3 in generation 0, then 3 per bred generation
        assert_eq!(result.summary().mutation_failures, 3 + 4 * 3);
    }

    #[test]
    fn test_evaluation_failures_are_contained() {
        let mut rng = StdRng::seed_from_u64(5);
        let evolver = PromptEvolver::builder()
            .population_size(3)
            .generations(2)
            .strategy(IdentityMutation::new())
            .evaluator(TryFnEvaluator::new(|_: &str, _: &[TestCase]| {
                Err(EvaluationError::Failed("judge offline".to_string()))
            }))
            .build()
            .unwrap();

        let result = evolver.run("seed", &[], &mut rng).unwrap();

        assert_eq!(result.best_content, "seed");
        assert_eq!(result.best_fitness, Some(0.0));
        assert_eq!(result.summary().evaluation_failures, result.evaluations);
    }

    #[test]
    fn test_target_fitness_stops_early() {
        let mut rng = StdRng::seed_from_u64(1);
        let evolver = PromptEvolver::builder()
            .population_size(4)
            .generations(10)
            .mutation_rate(1.0)
            .strategy(AppendMutation::new(" Be concise."))
            .evaluator(concise_evaluator())
            .termination(TargetFitness::new(1.0))
            .build()
            .unwrap();

        let result = evolver.run("Answer.", &[], &mut rng).unwrap();

        assert_eq!(result.generations, 1);
        assert_eq!(
            result.stats.termination_reason.as_deref(),
            Some("Target fitness reached")
        );
    }

    // Selection that never yields a breeding pool
    struct NoParents;

    impl ParentSelection for NoParents {
        fn select<R: Rng>(&self, _: &[Candidate], _: usize, _: &mut R) -> Vec<usize> {
            Vec::new()
        }
    }

    #[test]
    fn test_empty_parent_pool_re_seeds() {
        let mut rng = StdRng::seed_from_u64(6);
        let evolver = PromptEvolver::builder()
            .population_size(4)
            .generations(3)
            .mutation_rate(1.0)
            .selection(NoParents)
            .strategy(AppendMutation::new(" Be concise."))
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let result = evolver.run("Answer.", &[], &mut rng).unwrap();

        assert_eq!(result.generations, 3);
        let sizes: Vec<usize> = result
            .stats
            .generations
            .iter()
            .map(|g| g.population_size)
            .collect();
        assert_eq!(sizes, vec![4, 4, 4]);
        assert_eq!(result.best_content, "Answer. Be concise.");
        assert_eq!(result.best_fitness, Some(1.0));
        // Every generation is rebuilt from the seed, so nothing is carried over
        assert_eq!(result.evaluations, 12);
    }

    #[test]
    fn test_evaluation_budget_stops_run() {
        let mut rng = StdRng::seed_from_u64(9);
        let evolver = PromptEvolver::builder()
            .population_size(4)
            .generations(10)
            .mutation_rate(0.0)
            .evaluator(concise_evaluator())
            .termination(AnyOf::new(vec![
                Box::new(TargetFitness::new(2.0)),
                Box::new(MaxEvaluations::new(10)),
            ]))
            .build()
            .unwrap();

        let result = evolver.run("Answer.", &[], &mut rng).unwrap();

        // 4 scored in generation 1, then 3 fresh clones per generation
        assert_eq!(result.generations, 3);
        assert_eq!(result.evaluations, 10);
        assert_eq!(
            result.stats.termination_reason.as_deref(),
            Some("One of multiple criteria met")
        );
    }

    #[test]
    fn test_custom_selection() {
        let mut rng = StdRng::seed_from_u64(8);
        let evolver = PromptEvolver::builder()
            .population_size(6)
            .generations(3)
            .selection(TournamentSelection::binary())
            .strategy(AppendMutation::new(" Be concise."))
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let result = evolver.run("Answer.", &[], &mut rng).unwrap();
        assert_eq!(result.best_fitness, Some(1.0));
    }

    #[test]
    fn test_evolve_clamps_arguments() {
        let mut rng = StdRng::seed_from_u64(2);
        let evolver = PromptEvolver::builder()
            .strategy(AppendMutation::new(" Be concise."))
            .evaluator(concise_evaluator())
            .build()
            .unwrap();

        let best = evolver.evolve("Answer.", &[], 2, 0, 7.0, &mut rng).unwrap();
        // A single-candidate population never gets a mutated sibling
        assert_eq!(best, "Answer.");

        // Generation 0 variants are always mutated, whatever the rate
        let best = evolver.evolve("Answer.", &[], 2, 3, f64::NAN, &mut rng).unwrap();
        assert_eq!(best, "Answer. Be concise.");
    }

    #[test]
    fn test_late_registration() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut evolver = PromptEvolver::new();
        evolver.add_strategy(AppendMutation::new(" Be concise."));
        evolver.set_evaluator(concise_evaluator());

        let best = evolver.evolve("Answer.", &test_cases(), 2, 3, 1.0, &mut rng).unwrap();
        assert_eq!(best, "Answer. Be concise.");
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "x".repeat(100);
        assert_eq!(preview(&long).len(), 83);
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: EvolutionConfig = serde_json::from_str(r#"{"generations": 8}"#).unwrap();
        assert_eq!(config.generations, 8);
        assert_eq!(config.population_size, 10);
        assert_eq!(config.num_parents, DEFAULT_NUM_PARENTS);
    }
}
