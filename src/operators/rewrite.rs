//! Generator-backed rewriting
//!
//! A [`RewriteMutation`] asks an external text generator (typically a
//! language model client) to rewrite the content. The client is handed to
//! the strategy at construction; the crate holds no global client state and
//! ships no instruction wording of its own.

use std::sync::Arc;

use crate::error::{GenerationError, MutationError};
use crate::operators::traits::MutationStrategy;

/// Placeholder replaced by the candidate content in rewrite templates
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// Text generation capability
///
/// Implementations own their transport, retries and timeouts.
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for the instruction
    fn generate(&self, instruction: &str) -> Result<String, GenerationError>;
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn generate(&self, instruction: &str) -> Result<String, GenerationError> {
        (**self).generate(instruction)
    }
}

/// Mutation that delegates rewriting to a [`TextGenerator`]
///
/// The template must contain [`CONTENT_PLACEHOLDER`]; every occurrence is
/// replaced by the candidate content before the generator is called. The
/// completion is trimmed and used as the variant.
pub struct RewriteMutation<T> {
    name: String,
    generator: T,
    template: String,
}

impl<T: TextGenerator> RewriteMutation<T> {
    /// Create a new rewrite strategy
    pub fn new(
        name: impl Into<String>,
        generator: T,
        template: impl Into<String>,
    ) -> Result<Self, MutationError> {
        let template = template.into();
        if !template.contains(CONTENT_PLACEHOLDER) {
            return Err(MutationError::Failed(format!(
                "rewrite template is missing the {} placeholder",
                CONTENT_PLACEHOLDER
            )));
        }
        Ok(Self {
            name: name.into(),
            generator,
            template,
        })
    }

    /// Render the instruction sent to the generator
    pub fn instruction(&self, content: &str) -> String {
        self.template.replace(CONTENT_PLACEHOLDER, content)
    }
}

impl<T: TextGenerator> MutationStrategy for RewriteMutation<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn mutate(&self, content: &str) -> Result<String, MutationError> {
        let completion = self.generator.generate(&self.instruction(content))?;
        Ok(completion.trim().to_string())
    }
}
