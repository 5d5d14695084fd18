//! End-to-end tests for the budget optimizer

use std::time::Duration;

use budget_evo::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn sofa_lamp(sofa: (f64, f64), budget: f64) -> BudgetProblem {
    BudgetProblem::builder(budget)
        .user_category("sofa")
        .extra_category("lamp")
        .bounds("sofa", sofa.0, sofa.1)
        .bounds("lamp", 200.0, 1500.0)
        .average_price("sofa", 4000.0)
        .average_price("lamp", 800.0)
        .build()
        .unwrap()
}

fn living_room() -> BudgetProblem {
    BudgetProblem::builder(8000.0)
        .user_categories(["sofa", "table"])
        .extra_categories(["lamp", "rug", "shelf"])
        .bounds("sofa", 2000.0, 5000.0)
        .bounds("table", 500.0, 2000.0)
        .bounds("lamp", 100.0, 900.0)
        .bounds("rug", 300.0, 1500.0)
        .bounds("shelf", 200.0, 1200.0)
        .average_price("sofa", 3500.0)
        .average_price("table", 1200.0)
        .average_price("lamp", 400.0)
        .average_price("rug", 800.0)
        .average_price("shelf", 600.0)
        .build()
        .unwrap()
}

#[test]
fn sofa_and_lamp_within_budget() {
    let problem = sofa_lamp((3000.0, 6000.0), 5000.0);
    let config = OptimizerConfig::new()
        .with_population_size(20)
        .with_generations(30)
        .with_seed(7);

    let result = optimize(problem, config).unwrap();

    assert!(!result.candidates.is_empty());
    assert!(result.candidates.len() <= 5);
    for candidate in &result.candidates {
        let sofa = candidate.allocation.user_amount("sofa").unwrap();
        let lamp = candidate.allocation.extra_amount("lamp").unwrap();
        assert!((3000.0..=6000.0).contains(&sofa), "sofa = {sofa}");
        assert!(lamp == 0.0 || (200.0..=1500.0).contains(&lamp), "lamp = {lamp}");
    }

    // averages of 4000 and 800 pull the best toward the sofa alone, so only
    // the upper side of the budget tolerance is checked
    let best = result.best().unwrap();
    assert!(best.allocation.total() <= 5050.0, "total = {}", best.allocation.total());
    assert!(result.warnings.is_empty());
}

#[test]
fn infeasible_sofa_falls_back_to_minimum() {
    let problem = sofa_lamp((6000.0, 9000.0), 5000.0);
    let config = OptimizerConfig::new()
        .with_population_size(10)
        .with_generations(5)
        .with_seed(11);

    let result = optimize(problem, config).unwrap();

    assert!(result.is_infeasible());
    for candidate in &result.candidates {
        assert_eq!(candidate.allocation.user_amount("sofa"), Some(6000.0));
        assert_eq!(candidate.allocation.extra_amount("lamp"), Some(0.0));
        assert_eq!(candidate.allocation.total(), 6000.0);
    }
    assert!(matches!(
        result.warnings[0],
        BudgetWarning::InfeasibleBudget { min_user_total, total_budget }
            if min_user_total == 6000.0 && total_budget == 5000.0
    ));
}

#[test]
fn best_ever_bounds_every_generation() {
    let config = OptimizerConfig::new()
        .with_population_size(30)
        .with_generations(25)
        .with_seed(3);
    let result = optimize(living_room(), config).unwrap();

    for generation in &result.stats.generations {
        assert!(result.best_ever.fitness <= generation.best_fitness);
    }
    assert_eq!(Some(result.best_ever.fitness), result.stats.best_fitness());
}

#[test]
fn same_seed_same_result() {
    let config = OptimizerConfig::new()
        .with_population_size(16)
        .with_generations(10)
        .with_seed(99);

    let a = optimize(living_room(), config.clone()).unwrap();
    let b = optimize(living_room(), config).unwrap();

    assert_eq!(a.candidates, b.candidates);
    assert_eq!(a.best_ever, b.best_ever);
}

#[test]
fn candidates_sorted_and_capped() {
    let config = OptimizerConfig::new()
        .with_population_size(40)
        .with_generations(5)
        .with_top_k(5)
        .with_seed(5);
    let result = optimize(living_room(), config).unwrap();

    assert_eq!(result.candidates.len(), 5);
    for pair in result.candidates.windows(2) {
        assert!(pair[0].fitness <= pair[1].fitness);
    }
}

#[test]
fn small_population_returns_fewer_candidates() {
    let config = OptimizerConfig::new()
        .with_population_size(3)
        .with_generations(4)
        .with_seed(1);
    let result = optimize(living_room(), config).unwrap();
    assert_eq!(result.candidates.len(), 3);
}

#[test]
fn evaluations_and_stats_count_initial_generation() {
    let config = OptimizerConfig::new()
        .with_population_size(12)
        .with_generations(6)
        .with_seed(21);
    let result = optimize(living_room(), config).unwrap();

    assert_eq!(result.generations, 6);
    assert_eq!(result.evaluations, 12 * 7);
    assert_eq!(result.stats.num_generations(), 7);
    assert_eq!(
        result.stats.termination_reason.as_deref(),
        Some("Maximum generations reached")
    );
}

#[test]
fn deadline_stops_long_run() {
    let problem = living_room();
    let ga = BudgetGA::builder()
        .problem(problem)
        .population_size(20)
        .generations(1_000_000)
        .time_limit(Duration::from_millis(50))
        .seed(8)
        .build()
        .unwrap();

    let result = ga.run_seeded().unwrap();

    assert!(result.generations < 1_000_000);
    assert!(result
        .warnings
        .iter()
        .any(|w| matches!(w, BudgetWarning::TimeLimitReached { .. })));
    assert_eq!(result.stats.termination_reason.as_deref(), Some("Time limit reached"));
    assert!(!result.candidates.is_empty());
}

#[test]
fn elitism_keeps_best_candidate() {
    let config = OptimizerConfig::new()
        .with_population_size(10)
        .with_generations(20)
        .with_elitism(true)
        .with_seed(17);
    let result = optimize(living_room(), config).unwrap();

    let best = result.best().unwrap();
    // the elite is repaired again on reinsertion
    assert!(best.fitness <= result.best_ever.fitness + 1.0);
}

#[test]
fn sequential_and_parallel_agree() {
    let base = OptimizerConfig::new()
        .with_population_size(16)
        .with_generations(8)
        .with_seed(4);

    let sequential = optimize(living_room(), base.clone().with_parallel_evaluation(false)).unwrap();
    let parallel = optimize(living_room(), base.with_parallel_evaluation(true)).unwrap();

    assert_eq!(sequential.candidates, parallel.candidates);
}

#[test]
fn invalid_inputs_are_rejected() {
    let err = optimize(living_room(), OptimizerConfig::new().with_population_size(0)).unwrap_err();
    assert!(matches!(err, EvolutionError::Config(_)));

    let err = BudgetProblem::builder(-5.0)
        .user_category("sofa")
        .bounds("sofa", 100.0, 200.0)
        .build()
        .unwrap_err();
    assert_eq!(err, ProblemError::InvalidBudget(-5.0));

    let err = BudgetProblem::builder(1000.0)
        .user_category("sofa")
        .bounds("sofa", 500.0, 200.0)
        .build()
        .unwrap_err();
    assert!(matches!(err, ProblemError::MalformedBounds { .. }));
}

#[test]
fn custom_operators_run() {
    let problem = living_room();
    let ga = BudgetGA::new(problem, OptimizerConfig::new().with_generations(5).with_seed(2))
        .unwrap()
        .with_selection(TournamentSelection::binary())
        .with_mutation(AllocationMutation::new().with_rate(0.5).with_scale(0.2))
        .with_fitness(BudgetFitness::new().with_extra_reward(0.0));

    let mut rng = StdRng::seed_from_u64(2);
    let result = ga.run(&mut rng).unwrap();
    assert_eq!(result.generations, 5);
}

#[test]
fn catalog_to_bundles() {
    let catalog: Catalog = vec![
        Product::new("Oslo", "sofa", 3000.0).with_color("grey"),
        Product::new("Bergen", "sofa", 4200.0).with_color("blue"),
        Product::new("Fjord", "sofa", 3600.0).with_color("grey"),
        Product::new("Arc", "lamp", 250.0),
        Product::new("Globe", "lamp", 600.0),
        Product::new("Shag", "rug", 400.0),
        Product::new("Kilim", "rug", 900.0),
    ]
    .into_iter()
    .collect();

    let problem = catalog.problem_builder(["sofa"], 5000.0).build().unwrap();
    assert_eq!(problem.extra_categories(), ["lamp".to_string(), "rug".to_string()]);

    let config = OptimizerConfig::new()
        .with_population_size(20)
        .with_generations(15)
        .with_seed(12);
    let result = optimize(problem.clone(), config).unwrap();

    let mut rng = StdRng::seed_from_u64(12);
    let mut assembler = BundleAssembler::new(&catalog, &problem).with_colors("sofa", ["grey"]);
    let bundles = assembler.assemble_all(result.allocations(), &mut rng);

    assert_eq!(bundles.len(), result.candidates.len());
    for (bundle, candidate) in bundles.iter().zip(&result.candidates) {
        for item in bundle.items() {
            assert!(item.product.price <= item.allocation);
            assert_eq!(item.product.category, item.category);
        }
        for item in &bundle.extra {
            assert!(candidate.allocation.is_included(&item.category));
        }
    }
}
