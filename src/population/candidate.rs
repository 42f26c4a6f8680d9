//! Candidate type
//!
//! This module provides the Candidate record: one variant of the text being
//! optimized, together with its score and lineage.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag carried by the unmodified seed
pub const SEED_TAG: &str = "seed";
/// Tag carried by an unmutated copy of a parent
pub const CLONE_TAG: &str = "clone";
/// Tag carried by initial variants produced with no strategy registered
pub const NONE_TAG: &str = "none";

/// A candidate in the population
///
/// Content and lineage are fixed at creation. Fitness is `None` until the
/// evaluator has scored the candidate, so a measured score of exactly 0.0 is
/// never confused with "not yet evaluated".
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    /// The text payload being optimized
    pub content: String,
    /// The fitness value (None if not yet evaluated)
    pub fitness: Option<f64>,
    /// Breeding depth at which this candidate was created
    pub generation: usize,
    /// Content of the candidate this one was derived from
    pub parent_content: Option<String>,
    /// Strategy names applied to produce this candidate
    pub mutation_tags: Vec<String>,
    /// Caller-attached annotations, never read by the engine
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Candidate {
    /// Create the unmodified seed candidate
    pub fn seed(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            fitness: None,
            generation: 0,
            parent_content: None,
            mutation_tags: vec![SEED_TAG.to_string()],
            metadata: BTreeMap::new(),
        }
    }

    /// Create a candidate derived from `parent_content` by the tagged operation
    pub fn derived(
        content: impl Into<String>,
        parent_content: impl Into<String>,
        generation: usize,
        tag: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            fitness: None,
            generation,
            parent_content: Some(parent_content.into()),
            mutation_tags: vec![tag.into()],
            metadata: BTreeMap::new(),
        }
    }

    /// Create an unevaluated copy of a parent
    ///
    /// The copy keeps the parent's generation; only mutated children advance it.
    pub fn clone_of(parent: &Candidate) -> Self {
        Self::derived(
            parent.content.clone(),
            parent.content.clone(),
            parent.generation,
            CLONE_TAG,
        )
    }

    /// Create a candidate with a known fitness
    pub fn with_fitness(mut self, fitness: f64) -> Self {
        self.fitness = Some(fitness);
        self
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Check if this candidate has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Set the fitness value
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Fitness for ordering purposes; unevaluated sorts below everything
    pub fn fitness_or_min(&self) -> f64 {
        self.fitness.unwrap_or(f64::NEG_INFINITY)
    }

    /// Check if this candidate is strictly better than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (self.fitness, other.fitness) {
            (Some(f1), Some(f2)) => f1 > f2,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Compare by fitness, best first
    pub(crate) fn cmp_fitness_desc(a: &Self, b: &Self) -> Ordering {
        b.fitness_or_min()
            .partial_cmp(&a.fitness_or_min())
            .unwrap_or(Ordering::Equal)
    }
}
