//! Rewrite Strategy
//!
//! This example plugs a text generator into the search through
//! `RewriteMutation`. A real application would wrap a language model client;
//! here a canned generator stands in so the example runs offline, and it
//! fails every few calls to show how failed rewrites fall back to clones.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use spore_evo::prelude::*;

/// Offline stand-in for a language model client
struct CannedGenerator {
    calls: AtomicUsize,
    phrasings: Vec<&'static str>,
}

impl TextGenerator for CannedGenerator {
    fn generate(&self, instruction: &str) -> Result<String, GenerationError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if call % 5 == 4 {
            return Err(GenerationError::Timeout(30_000));
        }

        let base = instruction
            .rsplit_once("PROMPT:")
            .map(|(_, prompt)| prompt.trim())
            .unwrap_or(instruction);
        let phrasing = self.phrasings[call % self.phrasings.len()];
        Ok(format!("{} {}", base, phrasing))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Rewrite Strategy ===\n");

    let mut rng = StdRng::seed_from_u64(7);

    let generator = Arc::new(CannedGenerator {
        calls: AtomicUsize::new(0),
        phrasings: vec![
            "Cite the source.",
            "Use bullet points.",
            "Keep it under 50 words.",
        ],
    });

    let clarify = RewriteMutation::new(
        "clarify",
        generator.clone(),
        "Rewrite this prompt to be clearer.\nPROMPT: {content}",
    )?;
    let structure = RewriteMutation::new(
        "structure",
        generator.clone(),
        "Rewrite this prompt to request structured output.\nPROMPT: {content}",
    )?;

    let test_cases = vec![TestCase::new(
        "Summarize the quarterly report.",
        "short structured summary",
    )];

    let evaluator = FnEvaluator::new(|prompt: &str, _: &[TestCase]| {
        let wanted = ["bullet", "50 words", "source"];
        wanted.iter().filter(|w| prompt.contains(*w)).count() as f64 / wanted.len() as f64
    });

    let evolver = PromptEvolver::builder()
        .population_size(6)
        .generations(5)
        .mutation_rate(0.8)
        .strategy(clarify)
        .strategy(structure)
        .selection(TournamentSelection::binary())
        .evaluator(evaluator)
        .build()?;

    let result = evolver.run("Summarize the document.", &test_cases, &mut rng)?;

    println!("Best prompt: {}", result.best_content);
    if let Some(best) = &result.best {
        println!("Lineage tags: {:?}", best.mutation_tags);
        println!("Breeding depth: {}", best.generation);
    }

    let summary = result.summary();
    println!(
        "\nGenerator calls: {}, failed rewrites: {}",
        generator.calls.load(Ordering::Relaxed),
        summary.mutation_failures
    );
    println!("{}", result.stats.summary());

    Ok(())
}
