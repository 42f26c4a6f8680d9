//! Fitness traits
//!
//! This module defines the fitness evaluation capability and the test cases
//! it scores candidates against.

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

/// A weighted test case handed to the fitness evaluator
///
/// The engine never inspects test cases; weighting is the evaluator's job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Stimulus text
    pub input: String,
    /// Reference or description of the desired outcome
    pub expected: String,
    /// Relative importance
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl TestCase {
    /// Create a test case with weight 1.0
    pub fn new(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
            weight: default_weight(),
        }
    }

    /// Set the relative weight
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Fitness evaluation capability
///
/// Scores a candidate's content against the run's test cases (higher = better).
/// Implementations may call out to external services; they are responsible for
/// their own timeouts and must report failure instead of hanging.
pub trait FitnessEvaluator: Send + Sync {
    /// Evaluate the content
    fn evaluate(&self, content: &str, test_cases: &[TestCase]) -> Result<f64, EvaluationError>;

    /// Evaluate and reject non-finite scores
    fn evaluate_checked(
        &self,
        content: &str,
        test_cases: &[TestCase],
    ) -> Result<f64, EvaluationError> {
        let score = self.evaluate(content, test_cases)?;
        if score.is_finite() {
            Ok(score)
        } else {
            Err(EvaluationError::NonFinite(score))
        }
    }
}

impl<T: FitnessEvaluator + ?Sized> FitnessEvaluator for Box<T> {
    fn evaluate(&self, content: &str, test_cases: &[TestCase]) -> Result<f64, EvaluationError> {
        (**self).evaluate(content, test_cases)
    }
}

/// A simple function wrapper for infallible fitness evaluation
pub struct FnEvaluator<F> {
    f: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&str, &[TestCase]) -> f64 + Send + Sync,
{
    /// Create a new function-based evaluator
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> FitnessEvaluator for FnEvaluator<F>
where
    F: Fn(&str, &[TestCase]) -> f64 + Send + Sync,
{
    fn evaluate(&self, content: &str, test_cases: &[TestCase]) -> Result<f64, EvaluationError> {
        Ok((self.f)(content, test_cases))
    }
}

/// A function wrapper for evaluators that can fail
pub struct TryFnEvaluator<F> {
    f: F,
}

impl<F> TryFnEvaluator<F>
where
    F: Fn(&str, &[TestCase]) -> Result<f64, EvaluationError> + Send + Sync,
{
    /// Create a new fallible function-based evaluator
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> FitnessEvaluator for TryFnEvaluator<F>
where
    F: Fn(&str, &[TestCase]) -> Result<f64, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, content: &str, test_cases: &[TestCase]) -> Result<f64, EvaluationError> {
        (self.f)(content, test_cases)
    }
}

/// Weighted mean of a per-case score
///
/// Calls the scorer once per test case and combines the results as
/// `sum(weight * score) / sum(weight)`. An empty case list, or one whose
/// weights sum to zero or less, scores 0.0. The first scorer error aborts
/// the evaluation.
pub struct WeightedScoreEvaluator<S> {
    scorer: S,
}

impl<S> WeightedScoreEvaluator<S>
where
    S: Fn(&str, &TestCase) -> Result<f64, EvaluationError> + Send + Sync,
{
    /// Create a weighted evaluator around a per-case scorer
    pub fn new(scorer: S) -> Self {
        Self { scorer }
    }
}

impl<S> FitnessEvaluator for WeightedScoreEvaluator<S>
where
    S: Fn(&str, &TestCase) -> Result<f64, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, content: &str, test_cases: &[TestCase]) -> Result<f64, EvaluationError> {
        let total_weight: f64 = test_cases.iter().map(|c| c.weight).sum();
        if test_cases.is_empty() || total_weight <= 0.0 {
            return Ok(0.0);
        }

        let mut weighted = 0.0;
        for case in test_cases {
            weighted += case.weight * (self.scorer)(content, case)?;
        }
        Ok(weighted / total_weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cases() -> Vec<TestCase> {
        vec![
            TestCase::new("hello", "friendly greeting"),
            TestCase::new("weather today?", "weather information").with_weight(3.0),
        ]
    }

    #[test]
    fn test_test_case_default_weight() {
        let case = TestCase::new("in", "out");
        assert_eq!(case.weight, 1.0);

        let parsed: TestCase = serde_json::from_str(r#"{"input":"a","expected":"b"}"#).unwrap();
        assert_eq!(parsed.weight, 1.0);
    }

    #[test]
    fn test_fn_evaluator() {
        let evaluator = FnEvaluator::new(|content: &str, cases: &[TestCase]| {
            content.len() as f64 + cases.len() as f64
        });
        assert_eq!(evaluator.evaluate("abc", &cases()).unwrap(), 5.0);
    }

    #[test]
    fn test_evaluate_checked_rejects_nan() {
        let evaluator = FnEvaluator::new(|_: &str, _: &[TestCase]| f64::NAN);
        assert!(evaluator.evaluate("x", &[]).is_ok());
        assert!(matches!(
            evaluator.evaluate_checked("x", &[]),
            Err(EvaluationError::NonFinite(_))
        ));
    }

    #[test]
    fn test_try_fn_evaluator_propagates_error() {
        let evaluator = TryFnEvaluator::new(|_: &str, _: &[TestCase]| {
            Err(EvaluationError::Failed("judge offline".to_string()))
        });
        assert_eq!(
            evaluator.evaluate_checked("x", &[]),
            Err(EvaluationError::Failed("judge offline".to_string()))
        );
    }

    #[test]
    fn test_weighted_score_evaluator() {
        let evaluator = WeightedScoreEvaluator::new(|_: &str, case: &TestCase| {
            Ok(if case.input == "hello" { 1.0 } else { 0.0 })
        });
        // (1 * 1.0 + 3 * 0.0) / 4
        assert_eq!(evaluator.evaluate("prompt", &cases()).unwrap(), 0.25);
    }

    #[test]
    fn test_weighted_score_evaluator_empty_cases() {
        let evaluator = WeightedScoreEvaluator::new(|_: &str, _: &TestCase| Ok(1.0));
        assert_eq!(evaluator.evaluate("prompt", &[]).unwrap(), 0.0);

        let zero = vec![TestCase::new("a", "b").with_weight(0.0)];
        assert_eq!(evaluator.evaluate("prompt", &zero).unwrap(), 0.0);
    }

    #[test]
    fn test_boxed_evaluator() {
        let boxed: Box<dyn FitnessEvaluator> =
            Box::new(FnEvaluator::new(|_: &str, _: &[TestCase]| 0.5));
        assert_eq!(boxed.evaluate_checked("x", &[]).unwrap(), 0.5);
    }
}
