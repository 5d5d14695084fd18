//! Budget repair
//!
//! Projects an allocation back into its category bounds and onto the total
//! budget. Every operator that creates an allocation runs it through
//! [`BudgetRepair`] before handing it back.
//!
//! The repair never touches user categories when the problem is feasible;
//! only the spend on included extras is rescaled. Excluded extras stay at
//! zero, so the repair can never add an optional category on its own.

use crate::error::{OperatorResult, RepairInfo};
use crate::genome::allocation::Allocation;
use crate::genome::bounds::Bounds;
use crate::operators::traits::RepairOperator;
use crate::problem::BudgetProblem;

/// Default tolerance below which a budget shortfall is ignored
pub const DEFAULT_REPAIR_TOLERANCE: f64 = 1e-3;

/// Proportional budget repair
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetRepair {
    /// Shortfall (remaining budget not spent) tolerated without redistribution
    pub tolerance: f64,
}

impl BudgetRepair {
    /// Create a repair with the default tolerance
    pub fn new() -> Self {
        Self {
            tolerance: DEFAULT_REPAIR_TOLERANCE,
        }
    }

    /// Set the shortfall tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn minimum_fallback(&self, problem: &BudgetProblem) -> OperatorResult<Allocation> {
        let mut repaired = Allocation::default();
        for (category, bounds) in problem.user_bounds() {
            repaired.user_mut().insert(category.to_string(), bounds.min);
        }
        for category in problem.extra_categories() {
            repaired.extra_mut().insert(category.clone(), 0.0);
        }
        OperatorResult::Repaired(
            repaired,
            RepairInfo {
                constraint_violations: vec![format!(
                    "user minimums {} exceed budget {}",
                    problem.min_user_total(),
                    problem.total_budget()
                )],
                repair_method: "minimum-fallback",
            },
        )
    }
}

impl Default for BudgetRepair {
    fn default() -> Self {
        Self::new()
    }
}

impl RepairOperator for BudgetRepair {
    fn repair(
        &self,
        allocation: &Allocation,
        problem: &BudgetProblem,
    ) -> OperatorResult<Allocation> {
        if !problem.is_feasible() {
            return self.minimum_fallback(problem);
        }

        let amount = |category: &str| allocation.extra_amount(category).unwrap_or(0.0);
        let user_total: f64 = problem
            .user_categories()
            .iter()
            .map(|c| allocation.user_amount(c).unwrap_or(0.0))
            .sum();
        let extra_total: f64 = problem.extra_categories().iter().map(|c| amount(c)).sum();

        if extra_total <= 0.0 {
            return OperatorResult::Success(allocation.clone());
        }

        let remaining = problem.total_budget() - user_total;
        let mut repaired = allocation.clone();

        // Scale included extras to the remaining budget, then clamp.
        for (category, bounds) in problem.extra_bounds() {
            let current = amount(category);
            let next = if current > 0.0 {
                bounds.clamp(current / extra_total * remaining)
            } else {
                0.0
            };
            repaired.extra_mut().insert(category.to_string(), next);
        }

        // Clamping can leave budget unspent; hand it to included extras
        // that still have headroom, in proportion to that headroom.
        let scaled_total: f64 = problem
            .extra_categories()
            .iter()
            .map(|c| repaired.extra_amount(c).unwrap_or(0.0))
            .sum();
        let shortfall = remaining - scaled_total;
        if shortfall > self.tolerance {
            let open: Vec<(&str, Bounds, f64)> = problem
                .extra_bounds()
                .filter_map(|(category, bounds)| {
                    let current = repaired.extra_amount(category).unwrap_or(0.0);
                    (current > 0.0 && current < bounds.max).then_some((category, bounds, current))
                })
                .collect();
            let headroom: f64 = open.iter().map(|(_, b, current)| b.max - current).sum();
            if headroom > 0.0 {
                for (category, bounds, current) in open {
                    let share = shortfall * (bounds.max - current) / headroom;
                    repaired
                        .extra_mut()
                        .insert(category.to_string(), (current + share).min(bounds.max));
                }
            }
        }

        let gap = (allocation.total() - problem.total_budget()).abs();
        if gap > self.tolerance {
            OperatorResult::Repaired(
                repaired,
                RepairInfo {
                    constraint_violations: vec![format!(
                        "total {} differs from budget {}",
                        allocation.total(),
                        problem.total_budget()
                    )],
                    repair_method: "proportional-scaling",
                },
            )
        } else {
            OperatorResult::Success(repaired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(lamp: (f64, f64), rug: (f64, f64)) -> BudgetProblem {
        BudgetProblem::builder(5000.0)
            .user_category("sofa")
            .extra_categories(["lamp", "rug"])
            .bounds("sofa", 3000.0, 6000.0)
            .bounds("lamp", lamp.0, lamp.1)
            .bounds("rug", rug.0, rug.1)
            .build()
            .unwrap()
    }

    fn alloc(sofa: f64, lamp: f64, rug: f64) -> Allocation {
        Allocation::from_pairs(vec![("sofa", sofa)], vec![("lamp", lamp), ("rug", rug)])
    }

    fn repaired(problem: &BudgetProblem, a: &Allocation) -> Allocation {
        BudgetRepair::new().repair(a, problem).genome().unwrap()
    }

    #[test]
    fn test_infeasible_falls_back_to_minimums() {
        let problem = BudgetProblem::builder(5000.0)
            .user_category("sofa")
            .extra_category("lamp")
            .bounds("sofa", 6000.0, 9000.0)
            .bounds("lamp", 200.0, 1500.0)
            .build()
            .unwrap();
        let result = BudgetRepair::new().repair(&alloc(7000.0, 800.0, 0.0), &problem);
        assert!(matches!(
            &result,
            OperatorResult::Repaired(_, info) if info.repair_method == "minimum-fallback"
        ));
        let a = result.genome().unwrap();
        assert_eq!(a.user_amount("sofa"), Some(6000.0));
        assert_eq!(a.extra_amount("lamp"), Some(0.0));
        assert!(problem.covers(&a));
    }

    #[test]
    fn test_no_included_extras_is_unchanged() {
        let problem = problem((200.0, 1500.0), (100.0, 900.0));
        let a = alloc(4000.0, 0.0, 0.0);
        let result = BudgetRepair::new().repair(&a, &problem);
        assert!(!result.was_repaired());
        assert_eq!(result.genome().unwrap(), a);
    }

    #[test]
    fn test_proportional_scaling() {
        let problem = problem((200.0, 1500.0), (100.0, 900.0));
        let result = BudgetRepair::new().repair(&alloc(4000.0, 300.0, 200.0), &problem);
        assert!(result.was_repaired());
        let a = result.genome().unwrap();
        assert!((a.extra_amount("lamp").unwrap() - 600.0).abs() < 1e-9);
        assert!((a.extra_amount("rug").unwrap() - 400.0).abs() < 1e-9);
        assert!((a.total() - 5000.0).abs() < 1e-9);
        assert_eq!(a.user_amount("sofa"), Some(4000.0));
    }

    #[test]
    fn test_scaling_down_on_overspend() {
        let problem = problem((200.0, 1500.0), (100.0, 900.0));
        let a = repaired(&problem, &alloc(4000.0, 900.0, 900.0));
        assert!((a.extra_amount("lamp").unwrap() - 500.0).abs() < 1e-9);
        assert!((a.extra_amount("rug").unwrap() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_shortfall_is_redistributed() {
        let problem = problem((200.0, 500.0), (100.0, 2000.0));
        let a = repaired(&problem, &alloc(4000.0, 400.0, 100.0));
        // lamp scales to 800 and clamps at 500; rug absorbs the rest
        assert_eq!(a.extra_amount("lamp"), Some(500.0));
        assert!((a.extra_amount("rug").unwrap() - 500.0).abs() < 1e-9);
        assert!((a.total() - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn test_excluded_extras_are_never_filled() {
        let problem = problem((200.0, 300.0), (100.0, 2000.0));
        let a = repaired(&problem, &alloc(4000.0, 300.0, 0.0));
        assert_eq!(a.extra_amount("lamp"), Some(300.0));
        assert_eq!(a.extra_amount("rug"), Some(0.0));
        assert!((a.total() - 4300.0).abs() < 1e-9);
    }

    #[test]
    fn test_minimum_clamp_may_overshoot() {
        let problem = problem((200.0, 1500.0), (100.0, 900.0));
        let a = repaired(&problem, &alloc(4900.0, 500.0, 0.0));
        assert_eq!(a.extra_amount("lamp"), Some(200.0));
        assert!((a.total() - 5100.0).abs() < 1e-9);
    }

    #[test]
    fn test_repair_does_not_modify_input() {
        let problem = problem((200.0, 1500.0), (100.0, 900.0));
        let a = alloc(4000.0, 300.0, 200.0);
        let before = a.clone();
        let _ = repaired(&problem, &a);
        assert_eq!(a, before);
    }
}
