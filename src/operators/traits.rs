//! Operator traits
//!
//! This module defines the core operator traits for the budget optimizer.
//! Every operator takes its inputs by reference and returns new allocations.

use rand::Rng;

use crate::error::OperatorResult;
use crate::genome::allocation::Allocation;
use crate::population::individual::Individual;
use crate::problem::BudgetProblem;

/// Selection operator trait
///
/// Selects individuals from an evaluated population for reproduction.
pub trait SelectionOperator: Send + Sync {
    /// Select a single individual from the population
    ///
    /// Returns the index of the selected individual.
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize;
}

/// Crossover operator trait
///
/// Combines two parent allocations into two repaired offspring.
pub trait CrossoverOperator: Send + Sync {
    /// Apply crossover to two parents and produce two offspring
    fn crossover<R: Rng>(
        &self,
        parent1: &Allocation,
        parent2: &Allocation,
        problem: &BudgetProblem,
        rng: &mut R,
    ) -> OperatorResult<(Allocation, Allocation)>;
}

/// Mutation operator trait
///
/// Produces a perturbed, repaired copy of an allocation.
pub trait MutationOperator: Send + Sync {
    /// Apply mutation and return the new allocation
    fn mutate<R: Rng>(
        &self,
        allocation: &Allocation,
        problem: &BudgetProblem,
        rng: &mut R,
    ) -> OperatorResult<Allocation>;
}

/// Repair operator trait
///
/// Projects an allocation back into bounds and onto the budget.
pub trait RepairOperator: Send + Sync {
    /// Return the repaired allocation
    fn repair(
        &self,
        allocation: &Allocation,
        problem: &BudgetProblem,
    ) -> OperatorResult<Allocation>;
}

/// Initialization trait
///
/// Creates random, already repaired allocations.
pub trait Initializer: Send + Sync {
    /// Create a fresh allocation for the problem
    fn initialize<R: Rng>(&self, problem: &BudgetProblem, rng: &mut R) -> Allocation;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    // Mock selection operator for testing
    struct MockSelection;

    impl SelectionOperator for MockSelection {
        fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize {
            rng.gen_range(0..population.len())
        }
    }

    // Mock crossover operator for testing
    struct MockCrossover;

    impl CrossoverOperator for MockCrossover {
        fn crossover<R: Rng>(
            &self,
            parent1: &Allocation,
            parent2: &Allocation,
            _problem: &BudgetProblem,
            _rng: &mut R,
        ) -> OperatorResult<(Allocation, Allocation)> {
            // Just swap parents as a simple crossover
            OperatorResult::Success((parent2.clone(), parent1.clone()))
        }
    }

    fn problem() -> BudgetProblem {
        BudgetProblem::builder(5000.0)
            .user_category("sofa")
            .bounds("sofa", 3000.0, 6000.0)
            .build()
            .unwrap()
    }

    fn population() -> Vec<Individual> {
        (0..10)
            .map(|i| {
                let a = Allocation::from_pairs(vec![("sofa", 3000.0 + i as f64)], Vec::new());
                Individual::with_fitness(a, i as f64)
            })
            .collect()
    }

    #[test]
    fn test_mock_selection() {
        let mut rng = StdRng::seed_from_u64(3);
        let population = population();

        for _ in 0..5 {
            assert!(MockSelection.select(&population, &mut rng) < population.len());
        }
    }

    #[test]
    fn test_mock_crossover() {
        let mut rng = StdRng::seed_from_u64(3);
        let parent1 = Allocation::from_pairs(vec![("sofa", 3000.0)], Vec::new());
        let parent2 = Allocation::from_pairs(vec![("sofa", 4000.0)], Vec::new());

        let result = MockCrossover.crossover(&parent1, &parent2, &problem(), &mut rng);
        assert!(!result.was_repaired());

        let (child1, child2) = result.genome().unwrap();
        assert_eq!(child1, parent2);
        assert_eq!(child2, parent1);
    }
}
