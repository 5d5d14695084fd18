//! Random initialization
//!
//! Draws every user category uniformly within its bounds and includes each
//! optional category with a fixed probability.

use rand::Rng;

use crate::genome::allocation::Allocation;
use crate::operators::repair::BudgetRepair;
use crate::operators::traits::{Initializer, RepairOperator};
use crate::problem::BudgetProblem;

/// Default probability that an extra category starts included
pub const DEFAULT_INCLUSION_PROBABILITY: f64 = 0.5;

/// Uniform random initializer
#[derive(Clone, Debug)]
pub struct UniformInitializer {
    /// Probability that an extra category starts included
    pub inclusion_probability: f64,
    repair: BudgetRepair,
}

impl UniformInitializer {
    /// Create an initializer with the default inclusion probability
    pub fn new() -> Self {
        Self {
            inclusion_probability: DEFAULT_INCLUSION_PROBABILITY,
            repair: BudgetRepair::new(),
        }
    }

    /// Set the inclusion probability for extra categories
    pub fn with_inclusion_probability(mut self, probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability),
            "Probability must be in [0, 1]"
        );
        self.inclusion_probability = probability;
        self
    }

    /// Set the repair used on fresh allocations
    pub fn with_repair(mut self, repair: BudgetRepair) -> Self {
        self.repair = repair;
        self
    }

    /// Draw an allocation without repairing it
    pub fn sample<R: Rng>(&self, problem: &BudgetProblem, rng: &mut R) -> Allocation {
        let mut allocation = Allocation::default();
        for (category, bounds) in problem.user_bounds() {
            allocation
                .user_mut()
                .insert(category.to_string(), bounds.sample(rng));
        }
        for (category, bounds) in problem.extra_bounds() {
            let amount = if rng.gen::<f64>() < self.inclusion_probability {
                bounds.sample(rng)
            } else {
                0.0
            };
            allocation.extra_mut().insert(category.to_string(), amount);
        }
        allocation
    }
}

impl Default for UniformInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Initializer for UniformInitializer {
    fn initialize<R: Rng>(&self, problem: &BudgetProblem, rng: &mut R) -> Allocation {
        let drawn = self.sample(problem, rng);
        self.repair
            .repair(&drawn, problem)
            .genome()
            .unwrap_or(drawn)
    }
}
