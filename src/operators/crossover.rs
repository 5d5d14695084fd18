//! Crossover operators
//!
//! This module provides uniform per-category crossover for allocations.

use rand::Rng;

use crate::error::{OperatorError, OperatorResult};
use crate::genome::allocation::Allocation;
use crate::operators::repair::BudgetRepair;
use crate::operators::traits::{CrossoverOperator, RepairOperator};
use crate::problem::BudgetProblem;

/// Uniform crossover
///
/// For each category a single coin decides which parent the first child
/// inherits from; the second child takes the other parent's value.
/// Inclusion of an extra category travels with its value.
#[derive(Clone, Debug)]
pub struct UniformCrossover {
    /// Probability that the first child inherits from the first parent
    pub inherit_probability: f64,
    repair: BudgetRepair,
}

impl UniformCrossover {
    /// Create a new uniform crossover with a fair coin per category
    pub fn new() -> Self {
        Self {
            inherit_probability: 0.5,
            repair: BudgetRepair::new(),
        }
    }

    /// Create with a custom inheritance probability
    pub fn with_probability(probability: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability),
            "Probability must be in [0, 1]"
        );
        Self {
            inherit_probability: probability,
            repair: BudgetRepair::new(),
        }
    }

    /// Set the repair applied to each child
    pub fn with_repair(mut self, repair: BudgetRepair) -> Self {
        self.repair = repair;
        self
    }

    /// Recombine two parents without repairing the children
    pub fn recombine<R: Rng>(
        &self,
        parent1: &Allocation,
        parent2: &Allocation,
        problem: &BudgetProblem,
        rng: &mut R,
    ) -> Result<(Allocation, Allocation), OperatorError> {
        let mut child1 = Allocation::default();
        let mut child2 = Allocation::default();

        for category in problem.user_categories() {
            let (a, b) = match (parent1.user_amount(category), parent2.user_amount(category)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(missing_category(category)),
            };
            let (first, second) = if rng.gen::<f64>() < self.inherit_probability {
                (a, b)
            } else {
                (b, a)
            };
            child1.user_mut().insert(category.clone(), first);
            child2.user_mut().insert(category.clone(), second);
        }

        for category in problem.extra_categories() {
            let (a, b) = match (parent1.extra_amount(category), parent2.extra_amount(category)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(missing_category(category)),
            };
            let (first, second) = if rng.gen::<f64>() < self.inherit_probability {
                (a, b)
            } else {
                (b, a)
            };
            child1.extra_mut().insert(category.clone(), first);
            child2.extra_mut().insert(category.clone(), second);
        }

        Ok((child1, child2))
    }
}

fn missing_category(category: &str) -> OperatorError {
    OperatorError::CrossoverFailed(format!("parent is missing category {}", category))
}

impl Default for UniformCrossover {
    fn default() -> Self {
        Self::new()
    }
}

impl CrossoverOperator for UniformCrossover {
    fn crossover<R: Rng>(
        &self,
        parent1: &Allocation,
        parent2: &Allocation,
        problem: &BudgetProblem,
        rng: &mut R,
    ) -> OperatorResult<(Allocation, Allocation)> {
        let (child1, child2) = match self.recombine(parent1, parent2, problem, rng) {
            Ok(children) => children,
            Err(e) => return OperatorResult::Failed(e),
        };
        let first = self.repair.repair(&child1, problem);
        let second = self.repair.repair(&child2, problem);
        match (first.genome(), second.genome()) {
            (Some(c1), Some(c2)) => OperatorResult::Success((c1, c2)),
            _ => OperatorResult::Failed(OperatorError::CrossoverFailed(
                "repair failed".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn problem() -> BudgetProblem {
        BudgetProblem::builder(7000.0)
            .user_categories(["sofa", "bed"])
            .extra_categories(["lamp", "rug"])
            .bounds("sofa", 3000.0, 6000.0)
            .bounds("bed", 1000.0, 2000.0)
            .bounds("lamp", 200.0, 1500.0)
            .bounds("rug", 100.0, 900.0)
            .build()
            .unwrap()
    }

    fn parents() -> (Allocation, Allocation) {
        (
            Allocation::from_pairs(
                vec![("sofa", 3500.0), ("bed", 1500.0)],
                vec![("lamp", 600.0), ("rug", 0.0)],
            ),
            Allocation::from_pairs(
                vec![("sofa", 4500.0), ("bed", 1200.0)],
                vec![("lamp", 0.0), ("rug", 300.0)],
            ),
        )
    }

    #[test]
    fn test_children_inherit_parent_values() {
        let mut rng = StdRng::seed_from_u64(42);
        let problem = problem();
        let (p1, p2) = parents();
        for _ in 0..50 {
            let (c1, c2) = UniformCrossover::new()
                .recombine(&p1, &p2, &problem, &mut rng)
                .unwrap();
            for (category, v1) in c1.iter() {
                let (a, b) = if c1.user().contains_key(category) {
                    (p1.user_amount(category), p2.user_amount(category))
                } else {
                    (p1.extra_amount(category), p2.extra_amount(category))
                };
                let v2 = c2
                    .user_amount(category)
                    .or_else(|| c2.extra_amount(category))
                    .unwrap();
                // complementary: each child takes one parent's value
                assert!(
                    (Some(v1) == a && Some(v2) == b) || (Some(v1) == b && Some(v2) == a)
                );
            }
        }
    }

    #[test]
    fn test_first_child_always_inherits_first_parent() {
        let mut rng = StdRng::seed_from_u64(0);
        let (p1, p2) = parents();
        let (c1, c2) = UniformCrossover::with_probability(1.0)
            .recombine(&p1, &p2, &problem(), &mut rng)
            .unwrap();
        assert_eq!(c1, p1);
        assert_eq!(c2, p2);

        let (c1, c2) = UniformCrossover::with_probability(0.0)
            .recombine(&p1, &p2, &problem(), &mut rng)
            .unwrap();
        assert_eq!(c1, p2);
        assert_eq!(c2, p1);
    }

    #[test]
    fn test_missing_category_fails() {
        let mut rng = StdRng::seed_from_u64(0);
        let (p1, _) = parents();
        let short = Allocation::from_pairs(vec![("sofa", 3500.0)], Vec::<(&str, f64)>::new());
        let result = UniformCrossover::new().crossover(&p1, &short, &problem(), &mut rng);
        assert!(matches!(
            result.into_result(),
            Err(OperatorError::CrossoverFailed(msg)) if msg.contains("bed")
        ));
    }

    #[test]
    fn test_crossover_children_are_repaired() {
        let mut rng = StdRng::seed_from_u64(5);
        let problem = problem();
        let (p1, p2) = parents();
        let (c1, c2) = UniformCrossover::new()
            .crossover(&p1, &p2, &problem, &mut rng)
            .genome()
            .unwrap();
        for child in [c1, c2] {
            assert!(problem.covers(&child));
            for (category, bounds) in problem.extra_bounds() {
                let v = child.extra_amount(category).unwrap();
                assert!(v == 0.0 || bounds.contains(v));
            }
        }
    }
}
