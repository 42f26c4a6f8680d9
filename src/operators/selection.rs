//! Selection operators
//!
//! This module provides the parent selection operators used to build the
//! breeding pool.

use std::cmp::Ordering;

use rand::seq::index::sample;
use rand::Rng;
use rand_distr::{Distribution, WeightedIndex};

use crate::operators::traits::ParentSelection;
use crate::population::candidate::Candidate;

/// Truncation selection
///
/// Takes the `count` fittest candidates, best first. Ties keep population
/// order, and unevaluated candidates rank below every evaluated one.
#[derive(Clone, Debug, Default)]
pub struct TruncationSelection;

impl TruncationSelection {
    /// Create a new truncation selection
    pub fn new() -> Self {
        Self
    }
}

impl ParentSelection for TruncationSelection {
    fn select<R: Rng>(&self, population: &[Candidate], count: usize, _rng: &mut R) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..population.len()).collect();
        // sort_by is stable, so equal fitness keeps the original order
        indices.sort_by(|&a, &b| Candidate::cmp_fitness_desc(&population[a], &population[b]));
        indices.truncate(count);
        indices
    }
}

/// Tournament selection operator
///
/// Runs `count` independent tournaments, each won by the fittest of a random
/// subset. Ties go to the contestant earlier in the population.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of candidates competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self::new(2)
    }
}

impl ParentSelection for TournamentSelection {
    fn select<R: Rng>(&self, population: &[Candidate], count: usize, rng: &mut R) -> Vec<usize> {
        if population.is_empty() {
            return Vec::new();
        }

        let size = self.tournament_size.min(population.len());
        (0..count)
            .map(|_| {
                let mut contestants = sample(rng, population.len(), size).into_vec();
                contestants.sort_unstable();
                contestants
                    .into_iter()
                    .reduce(|best, idx| {
                        if population[idx].is_better_than(&population[best]) {
                            idx
                        } else {
                            best
                        }
                    })
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Roulette wheel selection (fitness proportionate)
///
/// Draws `count` parents with probability proportional to fitness. Negative
/// scores are shifted so the weakest evaluated candidate still has a small
/// chance; unevaluated candidates are never drawn unless nothing is evaluated.
#[derive(Clone, Debug)]
pub struct RouletteSelection {
    /// Offset added to every weight
    offset: f64,
}

impl RouletteSelection {
    /// Create a new roulette selection
    pub fn new() -> Self {
        Self { offset: 0.0 }
    }

    /// Create with a fitness offset (to flatten selection pressure)
    pub fn with_offset(offset: f64) -> Self {
        Self { offset }
    }
}

impl Default for RouletteSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl ParentSelection for RouletteSelection {
    fn select<R: Rng>(&self, population: &[Candidate], count: usize, rng: &mut R) -> Vec<usize> {
        if population.is_empty() {
            return Vec::new();
        }

        let min_fitness = population
            .iter()
            .filter_map(|c| c.fitness)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let shift = match min_fitness {
            Some(min) if min < 0.0 => -min + self.offset + 1.0,
            _ => self.offset,
        };

        let weights: Vec<f64> = population
            .iter()
            .map(|c| c.fitness.map(|f| f + shift).unwrap_or(0.0))
            .collect();

        match WeightedIndex::new(&weights) {
            Ok(dist) => (0..count).map(|_| dist.sample(rng)).collect(),
            // All weights zero: fall back to uniform draws
            Err(_) => (0..count)
                .map(|_| rng.gen_range(0..population.len()))
                .collect(),
        }
    }
}
