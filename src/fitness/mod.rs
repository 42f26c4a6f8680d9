//! Fitness evaluation
//!
//! This module provides the fitness capability and test case types.

pub mod traits;

pub mod prelude {
    pub use super::traits::*;
}
