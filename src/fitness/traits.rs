//! Fitness traits
//!
//! This module defines the fitness evaluation trait.

use crate::genome::allocation::Allocation;
use crate::problem::BudgetProblem;

/// Fitness evaluation trait
///
/// Scores an allocation against a problem. Lower is better: fitness here is
/// a cost to be minimized. Implementations must be pure functions of the
/// allocation and the (read-only) problem so that a generation can be scored
/// in parallel.
pub trait Fitness: Send + Sync {
    /// Evaluate the cost of an allocation (lower = better)
    fn evaluate(&self, allocation: &Allocation, problem: &BudgetProblem) -> f64;
}
