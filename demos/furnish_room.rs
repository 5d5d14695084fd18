//! Furnishing a Living Room
//!
//! This example splits a fixed budget over a small furniture catalog. The
//! sofa and table are required; lamps, rugs and shelves are optional. The
//! ranked allocations are then turned into concrete product bundles.
//!
//! The optimizer logs its progress at info level.

use budget_evo::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn catalog() -> Catalog {
    vec![
        Product::new("Oslo 3-seat", "sofa", 2900.0).with_color("grey"),
        Product::new("Bergen corner", "sofa", 4400.0).with_color("blue"),
        Product::new("Fjord loveseat", "sofa", 2400.0).with_color("grey"),
        Product::new("Oak dining", "table", 1100.0).with_color("oak"),
        Product::new("Glass round", "table", 650.0),
        Product::new("Arc floor lamp", "lamp", 320.0).with_color("black"),
        Product::new("Globe pendant", "lamp", 180.0).with_color("white"),
        Product::new("Shag 200x300", "rug", 540.0).with_color("grey"),
        Product::new("Kilim runner", "rug", 260.0),
        Product::new("Ladder shelf", "shelf", 390.0).with_color("oak"),
    ]
    .into_iter()
    .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== Living Room Budget ===\n");

    let catalog = catalog();
    let problem = catalog.problem_builder(["sofa", "table"], 5000.0).build()?;

    println!("Budget: {:.2}", problem.total_budget());
    println!("Required: {:?}", problem.user_categories());
    println!("Optional: {:?}\n", problem.extra_categories());

    let config = OptimizerConfig::new()
        .with_population_size(60)
        .with_generations(80)
        .with_elitism(true)
        .with_seed(42);

    let result = BudgetGA::new(problem.clone(), config)?.run_seeded()?;

    for warning in &result.warnings {
        println!("warning: {:?}", warning);
    }

    println!("Top allocations:");
    for (rank, candidate) in result.candidates.iter().enumerate() {
        println!(
            "  #{} fitness {:.1}, total {:.2}",
            rank + 1,
            candidate.fitness,
            candidate.allocation.total()
        );
        for (category, amount) in candidate.allocation.iter() {
            println!("      {:<6} {:>9.2}", category, amount);
        }
    }

    // Bundles share the used-product set, so later ranks prefer other products
    let mut rng = StdRng::seed_from_u64(42);
    let mut assembler = BundleAssembler::new(&catalog, &problem).with_colors("sofa", ["grey"]);
    let bundles = assembler.assemble_all(result.allocations(), &mut rng);

    println!("\nBundles:");
    for (rank, bundle) in bundles.iter().enumerate() {
        println!("  #{} ({:.2})", rank + 1, bundle.total_price());
        for item in bundle.items() {
            println!(
                "      {:<6} {:<16} {:>8.2} ({:?})",
                item.category, item.product.name, item.product.price, item.match_level
            );
        }
    }

    println!("\n{}", result.stats.summary());

    Ok(())
}
