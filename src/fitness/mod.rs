//! Fitness evaluation
//!
//! This module provides the fitness abstraction and the budget cost function.

pub mod budget;
pub mod traits;

pub mod prelude {
    pub use super::budget::*;
    pub use super::traits::*;
}
