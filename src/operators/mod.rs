//! Genetic operators
//!
//! This module provides mutation strategies and parent selection operators.

pub mod mutation;
pub mod rewrite;
pub mod selection;
pub mod traits;

pub mod prelude {
    pub use super::mutation::*;
    pub use super::rewrite::*;
    pub use super::selection::*;
    pub use super::traits::*;
}
