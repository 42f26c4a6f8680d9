//! Error types for spore-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Error type for mutation strategy failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MutationError {
    /// The strategy raised an error while producing a variant
    #[error("Mutation failed: {0}")]
    Failed(String),

    /// The strategy produced empty or whitespace-only content
    #[error("Strategy '{strategy}' produced empty content")]
    EmptyOutput { strategy: String },
}

/// Error type for fitness evaluation failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvaluationError {
    /// The evaluator raised an error
    #[error("Evaluation failed: {0}")]
    Failed(String),

    /// The evaluator returned NaN or an infinite score
    #[error("Evaluator returned a non-finite score: {0}")]
    NonFinite(f64),
}

/// Error type for text generator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    /// The generator backend reported an error
    #[error("Generation failed: {0}")]
    Backend(String),

    /// The backend did not answer in time
    #[error("Generation timed out after {0}ms")]
    Timeout(u64),
}

impl From<GenerationError> for MutationError {
    fn from(err: GenerationError) -> Self {
        MutationError::Failed(err.to_string())
    }
}

impl From<GenerationError> for EvaluationError {
    fn from(err: GenerationError) -> Self {
        EvaluationError::Failed(err.to_string())
    }
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// A required capability was not supplied
    #[error("Not configured: {0}")]
    NotConfigured(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Selection or breeding was asked to work on zero candidates
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_error_display() {
        let err = MutationError::Failed("backend unavailable".to_string());
        assert_eq!(err.to_string(), "Mutation failed: backend unavailable");

        let err = MutationError::EmptyOutput {
            strategy: "rewrite".to_string(),
        };
        assert_eq!(err.to_string(), "Strategy 'rewrite' produced empty content");
    }

    #[test]
    fn test_evaluation_error_display() {
        let err = EvaluationError::NonFinite(f64::INFINITY);
        assert_eq!(err.to_string(), "Evaluator returned a non-finite score: inf");
    }

    #[test]
    fn test_generation_error_converts() {
        let err: MutationError = GenerationError::Timeout(500).into();
        assert_eq!(
            err,
            MutationError::Failed("Generation timed out after 500ms".to_string())
        );

        let err: EvaluationError = GenerationError::Backend("503".to_string()).into();
        assert!(matches!(err, EvaluationError::Failed(_)));
    }

    #[test]
    fn test_configuration_display() {
        let err = EvolutionError::Configuration("rate out of range".to_string());
        assert_eq!(err.to_string(), "Invalid configuration: rate out of range");
    }

    #[test]
    fn test_not_configured_display() {
        let err = EvolutionError::NotConfigured("no fitness evaluator".to_string());
        assert_eq!(err.to_string(), "Not configured: no fitness evaluator");
    }
}
