//! Diagnostics and statistics
//!
//! This module provides the run history and statistics collection for
//! evolutionary runs. Nothing here feeds back into the search.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::population::candidate::Candidate;
use crate::population::population::Population;

/// Append-only log of every scored candidate in a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct History {
    candidates: Vec<Candidate>,
    evaluation_failures: usize,
    mutation_failures: usize,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Append candidates; unevaluated ones are skipped
    pub fn record<'a, I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = &'a Candidate>,
    {
        self.candidates
            .extend(candidates.into_iter().filter(|c| c.is_evaluated()).cloned());
    }

    /// Count evaluations that failed and were scored 0.0
    pub fn record_evaluation_failures(&mut self, count: usize) {
        self.evaluation_failures += count;
    }

    /// Count mutations that failed and were replaced by clones
    pub fn record_mutation_failures(&mut self, count: usize) {
        self.mutation_failures += count;
    }

    /// Number of recorded candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Recorded candidates, oldest first
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Get an iterator over the recorded candidates
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// Summarize the run
    pub fn summarize(&self) -> HistorySummary {
        let fitnesses: Vec<f64> = self.candidates.iter().filter_map(|c| c.fitness).collect();

        let mut summary = HistorySummary {
            evaluation_failures: self.evaluation_failures,
            mutation_failures: self.mutation_failures,
            ..HistorySummary::default()
        };

        let Some(&first) = fitnesses.first() else {
            return summary;
        };

        let best = fitnesses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        summary.total_variants = fitnesses.len();
        summary.generations = self
            .candidates
            .iter()
            .map(|c| c.generation)
            .max()
            .map_or(0, |g| g + 1);
        summary.best_fitness = best;
        summary.mean_fitness = fitnesses.iter().sum::<f64>() / fitnesses.len() as f64;
        summary.improvement = best - first;
        summary
    }
}

/// Post-hoc summary of a run's history
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Number of scored variants recorded
    pub total_variants: usize,
    /// Highest candidate generation observed, plus one
    pub generations: usize,
    /// Best recorded fitness
    pub best_fitness: f64,
    /// Mean recorded fitness
    pub mean_fitness: f64,
    /// Best fitness minus the first recorded fitness
    pub improvement: f64,
    /// Evaluations that failed and were scored 0.0
    pub evaluation_failures: usize,
    /// Mutations that failed and fell back to clones
    pub mutation_failures: usize,
}

impl HistorySummary {
    /// Check if no candidate was ever scored
    pub fn is_empty(&self) -> bool {
        self.total_variants == 0
    }
}

/// Statistics for a single generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation number (1-based loop iteration)
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Number of candidates in this generation
    pub population_size: usize,
    /// Best fitness in this generation
    pub best_fitness: f64,
    /// Worst fitness in this generation
    pub worst_fitness: f64,
    /// Mean fitness
    pub mean_fitness: f64,
    /// Share of distinct content in the population
    pub diversity: f64,
    /// Evaluations in this generation that failed
    pub evaluation_failures: usize,
    /// Mutations for the next generation that failed
    pub mutation_failures: usize,
    /// Timing information
    pub timing: TimingStats,
}

/// Timing statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimingStats {
    /// Time spent on fitness evaluation (ms)
    pub evaluation_ms: f64,
    /// Time spent selecting parents and breeding (ms)
    pub breeding_ms: f64,
    /// Total generation time (ms)
    pub total_ms: f64,
}

impl TimingStats {
    /// Create new timing stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Set evaluation time
    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set breeding time
    pub fn with_breeding(mut self, duration: Duration) -> Self {
        self.breeding_ms = duration.as_secs_f64() * 1000.0;
        self
    }

    /// Set total time
    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = duration.as_secs_f64() * 1000.0;
        self
    }
}

impl GenerationStats {
    /// Compute statistics from an evaluated population
    pub fn from_population(population: &Population, generation: usize, evaluations: usize) -> Self {
        let (best, worst, mean) = match population.mean_fitness() {
            Some(mean) => (
                population.best().and_then(|c| c.fitness).unwrap_or(f64::NEG_INFINITY),
                population.worst().and_then(|c| c.fitness).unwrap_or(f64::INFINITY),
                mean,
            ),
            None => (f64::NEG_INFINITY, f64::INFINITY, 0.0),
        };

        Self {
            generation,
            evaluations,
            population_size: population.len(),
            best_fitness: best,
            worst_fitness: worst,
            mean_fitness: mean,
            diversity: population.diversity(),
            evaluation_failures: 0,
            mutation_failures: 0,
            timing: TimingStats::default(),
        }
    }

    /// Set failure counts
    pub fn with_failures(mut self, evaluation_failures: usize, mutation_failures: usize) -> Self {
        self.evaluation_failures = evaluation_failures;
        self.mutation_failures = mutation_failures;
        self
    }

    /// Set timing information
    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }
}

/// Statistics collector for an entire evolution run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Statistics per generation
    pub generations: Vec<GenerationStats>,
    /// Total runtime in milliseconds
    pub total_runtime_ms: f64,
    /// Reason for termination
    pub termination_reason: Option<String>,
}

impl EvolutionStats {
    /// Create a new stats collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a generation's statistics
    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    /// Get the number of generations recorded
    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Get the best fitness across all generations
    pub fn best_fitness(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Get the history of per-generation best fitness values
    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.best_fitness).collect()
    }

    /// Get the history of mean fitness values
    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.generations.iter().map(|g| g.mean_fitness).collect()
    }

    /// Set the termination reason
    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    /// Set the total runtime
    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = duration.as_secs_f64() * 1000.0;
    }

    /// Get a summary of the evolution run
    pub fn summary(&self) -> String {
        let evaluation_failures: usize =
            self.generations.iter().map(|g| g.evaluation_failures).sum();
        let mutation_failures: usize = self.generations.iter().map(|g| g.mutation_failures).sum();

        format!(
            "Evolution Summary:\n\
             - Generations: {}\n\
             - Best fitness: {:.6}\n\
             - Failures: {} evaluation, {} mutation\n\
             - Runtime: {:.2}ms\n\
             - Termination: {}",
            self.num_generations(),
            self.best_fitness().unwrap_or(f64::NEG_INFINITY),
            evaluation_failures,
            mutation_failures,
            self.total_runtime_ms,
            self.termination_reason.as_deref().unwrap_or("unknown")
        )
    }
}

/// Result of an evolution run
#[derive(Clone, Debug)]
pub struct EvolutionResult {
    /// The best candidate ever observed (None if nothing was evaluated)
    pub best: Option<Candidate>,
    /// Content of the best candidate, or the seed if nothing was evaluated
    pub best_content: String,
    /// Fitness of the best candidate
    pub best_fitness: Option<f64>,
    /// Number of generations completed
    pub generations: usize,
    /// Total fitness evaluations
    pub evaluations: usize,
    /// Every scored candidate of the run
    pub history: History,
    /// Statistics for the run
    pub stats: EvolutionStats,
}

impl EvolutionResult {
    /// Result of a run that never evaluated anything
    pub fn unevaluated(seed: impl Into<String>) -> Self {
        Self {
            best: None,
            best_content: seed.into(),
            best_fitness: None,
            generations: 0,
            evaluations: 0,
            history: History::new(),
            stats: EvolutionStats::new(),
        }
    }

    /// Summarize the run history
    pub fn summary(&self) -> HistorySummary {
        self.history.summarize()
    }
}

pub mod prelude {
    pub use super::{
        EvolutionResult, EvolutionStats, GenerationStats, History, HistorySummary, TimingStats,
    };
}
