//! Mutation operators
//!
//! Gaussian perturbation of user categories plus inclusion toggling for
//! optional categories.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::OperatorResult;
use crate::genome::allocation::Allocation;
use crate::genome::bounds::Bounds;
use crate::operators::repair::BudgetRepair;
use crate::operators::traits::{MutationOperator, RepairOperator};
use crate::problem::BudgetProblem;

/// Default per-category mutation probability
pub const DEFAULT_MUTATION_RATE: f64 = 0.2;

/// Default noise scale, as a fraction of the category's price range
pub const DEFAULT_MUTATION_SCALE: f64 = 0.1;

/// Allocation mutation
///
/// Each category is touched with probability `mutation_rate`:
///
/// - a user category gets Gaussian noise with standard deviation
///   `mutation_scale * (max - min)`, clamped to its bounds;
/// - an excluded extra is included with a uniform draw within its bounds;
/// - an included extra is perturbed like a user category with probability
///   `perturb_probability` and excluded otherwise.
#[derive(Clone, Debug)]
pub struct AllocationMutation {
    /// Per-category mutation probability
    pub mutation_rate: f64,
    /// Noise standard deviation relative to the price range
    pub mutation_scale: f64,
    /// Chance that a mutated, included extra is perturbed rather than dropped
    pub perturb_probability: f64,
    repair: BudgetRepair,
}

impl AllocationMutation {
    /// Create a mutation with the default rate and scale
    pub fn new() -> Self {
        Self {
            mutation_rate: DEFAULT_MUTATION_RATE,
            mutation_scale: DEFAULT_MUTATION_SCALE,
            perturb_probability: 0.5,
            repair: BudgetRepair::new(),
        }
    }

    /// Set the per-category mutation probability
    pub fn with_rate(mut self, rate: f64) -> Self {
        assert!((0.0..=1.0).contains(&rate), "Probability must be in [0, 1]");
        self.mutation_rate = rate;
        self
    }

    /// Set the noise scale
    pub fn with_scale(mut self, scale: f64) -> Self {
        assert!(scale >= 0.0, "Scale must be non-negative");
        self.mutation_scale = scale;
        self
    }

    /// Set the repair applied after perturbation
    pub fn with_repair(mut self, repair: BudgetRepair) -> Self {
        self.repair = repair;
        self
    }

    /// Add clamped Gaussian noise to a value
    fn perturb_value<R: Rng>(&self, value: f64, bounds: &Bounds, rng: &mut R) -> f64 {
        match Normal::new(0.0, self.mutation_scale * bounds.range()) {
            Ok(normal) => bounds.clamp(value + normal.sample(rng)),
            Err(_) => bounds.clamp(value),
        }
    }

    /// Perturb an allocation without repairing it
    pub fn perturb<R: Rng>(
        &self,
        allocation: &Allocation,
        problem: &BudgetProblem,
        rng: &mut R,
    ) -> Allocation {
        let mut mutated = allocation.clone();

        for (category, bounds) in problem.user_bounds() {
            if rng.gen::<f64>() < self.mutation_rate {
                let current = allocation.user_amount(category).unwrap_or(bounds.min);
                let next = self.perturb_value(current, &bounds, rng);
                mutated.user_mut().insert(category.to_string(), next);
            }
        }

        for (category, bounds) in problem.extra_bounds() {
            if rng.gen::<f64>() < self.mutation_rate {
                let current = allocation.extra_amount(category).unwrap_or(0.0);
                let next = if current <= 0.0 {
                    bounds.sample(rng)
                } else if rng.gen::<f64>() < self.perturb_probability {
                    self.perturb_value(current, &bounds, rng)
                } else {
                    0.0
                };
                mutated.extra_mut().insert(category.to_string(), next);
            }
        }

        mutated
    }
}

impl Default for AllocationMutation {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationOperator for AllocationMutation {
    fn mutate<R: Rng>(
        &self,
        allocation: &Allocation,
        problem: &BudgetProblem,
        rng: &mut R,
    ) -> OperatorResult<Allocation> {
        let perturbed = self.perturb(allocation, problem, rng);
        self.repair.repair(&perturbed, problem)
    }
}
