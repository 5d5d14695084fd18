//! Budget allocation cost function
//!
//! Overspending is penalized heavily enough to dominate every other term,
//! allocations are pulled toward each category's average price, and every
//! included optional category earns a flat reward.

use serde::{Deserialize, Serialize};

use crate::fitness::traits::Fitness;
use crate::genome::allocation::Allocation;
use crate::problem::BudgetProblem;

/// Default multiplier applied to every unit spent over budget
pub const DEFAULT_PENALTY_FACTOR: f64 = 1e8;

/// Default reward for including an optional category
pub const DEFAULT_EXTRA_REWARD: f64 = 100.0;

/// Cost function for budget allocations (lower = better)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BudgetFitness {
    /// Multiplier for the amount spent over budget
    pub penalty_factor: f64,
    /// Flat reward subtracted per included extra category
    pub extra_reward: f64,
}

impl BudgetFitness {
    /// Create a cost function with the default penalty and reward
    pub fn new() -> Self {
        Self {
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            extra_reward: DEFAULT_EXTRA_REWARD,
        }
    }

    /// Set the overspend penalty factor
    pub fn with_penalty_factor(mut self, penalty_factor: f64) -> Self {
        self.penalty_factor = penalty_factor;
        self
    }

    /// Set the inclusion reward
    pub fn with_extra_reward(mut self, extra_reward: f64) -> Self {
        self.extra_reward = extra_reward;
        self
    }

    /// Compute each term of the cost separately
    ///
    /// A category without an average price contributes no deviation.
    pub fn breakdown(&self, allocation: &Allocation, problem: &BudgetProblem) -> FitnessBreakdown {
        let total_cost = allocation.total();
        let overspend = (total_cost - problem.total_budget()).max(0.0);

        let squared_deviation = |category: &str, amount: f64| {
            let avg = problem.average_price(category).unwrap_or(amount);
            (amount - avg).powi(2)
        };

        let mut deviation = 0.0;
        for (category, &amount) in allocation.user() {
            deviation += squared_deviation(category.as_str(), amount);
        }
        let mut included = 0;
        for (category, amount) in allocation.included_extras() {
            deviation += squared_deviation(category, amount);
            included += 1;
        }

        FitnessBreakdown {
            total_cost,
            overspend,
            penalty: if overspend > 0.0 {
                self.penalty_factor * overspend
            } else {
                0.0
            },
            deviation,
            reward: self.extra_reward * included as f64,
            included_extras: included,
        }
    }
}

impl Default for BudgetFitness {
    fn default() -> Self {
        Self::new()
    }
}

impl Fitness for BudgetFitness {
    fn evaluate(&self, allocation: &Allocation, problem: &BudgetProblem) -> f64 {
        self.breakdown(allocation, problem).fitness()
    }
}

/// The individual terms of a budget cost
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FitnessBreakdown {
    /// Sum of all allocations
    pub total_cost: f64,
    /// Amount spent over budget (0 when within budget)
    pub overspend: f64,
    /// Overspend penalty
    pub penalty: f64,
    /// Sum of squared deviations from average prices
    pub deviation: f64,
    /// Total inclusion reward
    pub reward: f64,
    /// Number of included extra categories
    pub included_extras: usize,
}

impl FitnessBreakdown {
    /// Combined fitness value
    pub fn fitness(&self) -> f64 {
        self.penalty + self.deviation - self.reward
    }

    /// Whether the allocation stays within budget
    pub fn within_budget(&self) -> bool {
        self.overspend <= 0.0
    }
}
