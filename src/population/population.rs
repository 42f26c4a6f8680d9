//! Population type
//!
//! This module provides the Population container together with the
//! operations that create, score, select from and replace a generation.

use std::collections::HashSet;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{EvoResult, EvolutionError};
use crate::fitness::traits::{FitnessEvaluator, TestCase};
use crate::operators::mutation::{MutationOutcome, MutationRegistry};
use crate::operators::traits::ParentSelection;
use crate::population::candidate::{Candidate, CLONE_TAG, NONE_TAG};

/// A newly built generation plus the number of mutations that fell back to clones
#[derive(Clone, Debug)]
pub struct Offspring {
    /// The new population
    pub population: Population,
    /// Mutation invocations that failed and were replaced by clones
    pub mutation_failures: usize,
}

/// Counts from one evaluation pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Evaluator invocations made
    pub evaluated: usize,
    /// Invocations that failed and were recorded as 0.0
    pub failures: usize,
}

/// A population of candidates
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// The candidates in this population
    candidates: Vec<Candidate>,
    /// Loop iteration that produced this population
    generation: usize,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            candidates: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    /// Create a population from a vector of candidates
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            generation: 0,
        }
    }

    /// Create generation 0 from a seed
    ///
    /// The first candidate is always the unmodified seed. Every other slot
    /// applies one uniformly chosen strategy to the seed itself, never to a
    /// sibling. With no strategy registered the slot is an exact copy tagged
    /// `none`; a failed mutation degrades to a clone of the seed. A `count`
    /// of zero is treated as one.
    pub fn create_initial<R: Rng>(
        seed_content: &str,
        count: usize,
        registry: &MutationRegistry,
        rng: &mut R,
    ) -> Offspring {
        let count = count.max(1);
        let mut population = Self::with_capacity(count);
        let mut mutation_failures = 0;

        population.push(Candidate::seed(seed_content));

        while population.len() < count {
            let variant = match registry.apply(seed_content, rng) {
                MutationOutcome::Mutated { content, strategy } => {
                    Candidate::derived(content, seed_content, 0, strategy)
                }
                MutationOutcome::NoStrategy => {
                    Candidate::derived(seed_content, seed_content, 0, NONE_TAG)
                }
                MutationOutcome::Failed { strategy, error } => {
                    warn!(
                        "strategy '{}' failed on seed, using a clone: {}",
                        strategy, error
                    );
                    mutation_failures += 1;
                    Candidate::derived(seed_content, seed_content, 0, CLONE_TAG)
                }
            };
            population.push(variant);
        }

        Offspring {
            population,
            mutation_failures,
        }
    }

    /// Build the next generation
    ///
    /// The new population starts with `current_best` unchanged (elitism) and
    /// is filled to `target_size` with children of uniformly chosen parents.
    /// With probability `mutation_rate` a child is a mutation one generation
    /// deeper than its parent; otherwise, or when the mutation fails, it is
    /// an unevaluated clone at the parent's generation.
    pub fn breed_next_generation<R: Rng>(
        current_best: &Candidate,
        parents: &[Candidate],
        target_size: usize,
        mutation_rate: f64,
        registry: &MutationRegistry,
        rng: &mut R,
    ) -> EvoResult<Offspring> {
        if parents.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let mut population = Self::with_capacity(target_size.max(1));
        let mut mutation_failures = 0;

        population.push(current_best.clone());

        while population.len() < target_size {
            let parent = parents
                .choose(rng)
                .ok_or(EvolutionError::EmptyPopulation)?;

            let child = if rng.gen::<f64>() < mutation_rate {
                match registry.apply(&parent.content, rng) {
                    MutationOutcome::Mutated { content, strategy } => Candidate::derived(
                        content,
                        parent.content.as_str(),
                        parent.generation + 1,
                        strategy,
                    ),
                    MutationOutcome::NoStrategy => Candidate::derived(
                        parent.content.as_str(),
                        parent.content.as_str(),
                        parent.generation + 1,
                        NONE_TAG,
                    ),
                    MutationOutcome::Failed { strategy, error } => {
                        warn!(
                            "strategy '{}' failed, cloning parent instead: {}",
                            strategy, error
                        );
                        mutation_failures += 1;
                        Candidate::clone_of(parent)
                    }
                }
            } else {
                Candidate::clone_of(parent)
            };
            population.push(child);
        }

        debug!(
            "bred {} candidates from {} parents ({} mutation failures)",
            population.len(),
            parents.len(),
            mutation_failures
        );

        Ok(Offspring {
            population,
            mutation_failures,
        })
    }

    /// Score every unevaluated candidate, in population order
    ///
    /// Identical content is scored again each time it appears. A failed or
    /// non-finite evaluation is recorded as 0.0 and counted.
    pub fn evaluate<E: FitnessEvaluator + ?Sized>(
        &mut self,
        evaluator: &E,
        test_cases: &[TestCase],
    ) -> EvaluationReport {
        let mut report = EvaluationReport::default();

        for candidate in self.candidates.iter_mut().filter(|c| !c.is_evaluated()) {
            report.evaluated += 1;
            match evaluator.evaluate_checked(&candidate.content, test_cases) {
                Ok(score) => candidate.set_fitness(score),
                Err(err) => {
                    warn!("evaluation failed, scoring candidate as 0.0: {}", err);
                    report.failures += 1;
                    candidate.set_fitness(0.0);
                }
            }
        }

        report
    }

    /// Top-`k` candidates by descending fitness, ties in population order
    pub fn select_parents(&self, k: usize) -> Vec<Candidate> {
        let mut ranked: Vec<&Candidate> = self.candidates.iter().collect();
        ranked.sort_by(|a, b| Candidate::cmp_fitness_desc(a, b));
        ranked.into_iter().take(k).cloned().collect()
    }

    /// Select `k` parents with the given operator
    pub fn select_with<S: ParentSelection, R: Rng>(
        &self,
        selection: &S,
        k: usize,
        rng: &mut R,
    ) -> Vec<Candidate> {
        selection
            .select(&self.candidates, k, rng)
            .into_iter()
            .filter_map(|i| self.candidates.get(i).cloned())
            .collect()
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Get a candidate by index
    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }

    /// Add a candidate to the population
    pub fn push(&mut self, candidate: Candidate) {
        self.candidates.push(candidate);
    }

    /// Get an iterator over the candidates
    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    /// Get the underlying candidates
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Take the candidates out of this population
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }

    /// Evaluated candidates, in population order
    pub fn evaluated(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter().filter(|c| c.is_evaluated())
    }

    /// The fittest evaluated candidate; the earliest one wins ties
    pub fn best(&self) -> Option<&Candidate> {
        self.evaluated()
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if !c.is_better_than(b) => Some(b),
                _ => Some(c),
            })
    }

    /// The least fit evaluated candidate
    pub fn worst(&self) -> Option<&Candidate> {
        self.evaluated()
            .fold(None, |worst: Option<&Candidate>, c| match worst {
                Some(w) if !w.is_better_than(c) => Some(w),
                _ => Some(c),
            })
    }

    /// Check if all candidates have been evaluated
    pub fn all_evaluated(&self) -> bool {
        self.candidates.iter().all(|c| c.is_evaluated())
    }

    /// Count the number of evaluated candidates
    pub fn count_evaluated(&self) -> usize {
        self.evaluated().count()
    }

    /// Compute mean fitness over evaluated candidates
    pub fn mean_fitness(&self) -> Option<f64> {
        let evaluated: Vec<f64> = self.evaluated().filter_map(|c| c.fitness).collect();

        if evaluated.is_empty() {
            None
        } else {
            Some(evaluated.iter().sum::<f64>() / evaluated.len() as f64)
        }
    }

    /// Share of candidates with distinct content, in (0, 1]
    pub fn diversity(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let distinct: HashSet<&str> = self.candidates.iter().map(|c| c.content.as_str()).collect();
        distinct.len() as f64 / self.len() as f64
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Candidate;

    fn index(&self, index: usize) -> &Self::Output {
        &self.candidates[index]
    }
}

impl IntoIterator for Population {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl FromIterator<Candidate> for Population {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self::from_candidates(iter.into_iter().collect())
    }
}
