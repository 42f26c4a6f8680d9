//! Evolutionary algorithms
//!
//! This module provides the generational prompt evolver.

pub mod generational;

pub mod prelude {
    pub use super::generational::*;
}
