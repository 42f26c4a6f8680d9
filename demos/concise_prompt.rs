//! Concise Prompt Search
//!
//! This example evolves a question-answering prompt with deterministic
//! capabilities: two text transformations as mutation strategies and a
//! keyword-based evaluator. Set RUST_LOG=info to follow each generation.

use rand::rngs::StdRng;
use rand::SeedableRng;
use spore_evo::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("=== Concise Prompt Search ===\n");

    let mut rng = StdRng::seed_from_u64(42);

    let test_cases = vec![
        TestCase::new("What is the capital of France?", "Paris"),
        TestCase::new("How many legs does a spider have?", "8").with_weight(2.0),
    ];

    // Reward prompts that ask for brevity and penalize rambling ones
    let evaluator = WeightedScoreEvaluator::new(|prompt: &str, _case: &TestCase| {
        let mut score: f64 = 0.2;
        if prompt.contains("concise") {
            score += 0.6;
        }
        if prompt.contains("one word") {
            score += 0.2;
        }
        if prompt.len() > 80 {
            score -= 0.3;
        }
        Ok(score.max(0.0))
    });

    let evolver = PromptEvolver::builder()
        .population_size(8)
        .generations(6)
        .mutation_rate(0.7)
        .strategy(AppendMutation::new(" Be concise."))
        .strategy(AppendMutation::new(" Answer in one word."))
        .strategy(FnMutation::new("drop-last-sentence", |prompt: &str| {
            match prompt.trim_end_matches('.').rsplit_once('.') {
                Some((head, _)) => format!("{}.", head),
                None => prompt.to_string(),
            }
        }))
        .evaluator(evaluator)
        .termination(TargetFitness::new(1.0))
        .build()?;

    println!("Strategies: {:?}\n", evolver.registry().names());

    let result = evolver.run("Answer the question.", &test_cases, &mut rng)?;

    println!("Best prompt: {}", result.best_content);
    println!(
        "Best fitness: {:.3}",
        result.best_fitness.unwrap_or(f64::NEG_INFINITY)
    );

    let summary = result.summary();
    println!("\nHistory:");
    println!("  Variants scored: {}", summary.total_variants);
    println!("  Breeding depth:  {}", summary.generations);
    println!("  Mean fitness:    {:.3}", summary.mean_fitness);
    println!("  Improvement:     {:+.3}", summary.improvement);

    println!("\n{}", result.stats.summary());

    Ok(())
}
