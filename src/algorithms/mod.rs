//! Evolutionary algorithms
//!
//! This module provides the generational budget allocation optimizer.

pub mod budget_ga;

pub mod prelude {
    pub use super::budget_ga::*;
}
