//! # budget-evo
//!
//! Genetic-algorithm budget allocation across mandatory and optional
//! spending categories.
//!
//! A total budget is split over "user" categories, which must each receive
//! an amount inside their price range, and "extra" categories, which are
//! either left out (amount `0.0`) or receive an amount inside their range.
//! The search keeps total spend on budget, pulls every amount toward the
//! category's average price and rewards including optional categories. It
//! returns several ranked allocations rather than a single answer.
//!
//! ## Core Concepts
//!
//! - **Repair**: every operator projects its output back into bounds and
//!   onto the budget, so the population only ever holds repaired allocations
//! - **Cost minimization**: lower fitness is better throughout the crate
//! - **Reproducibility**: all randomness flows through an explicit RNG
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use budget_evo::prelude::*;
//!
//! let problem = BudgetProblem::builder(5000.0)
//!     .user_category("sofa")
//!     .extra_category("lamp")
//!     .bounds("sofa", 3000.0, 6000.0)
//!     .bounds("lamp", 200.0, 1500.0)
//!     .average_price("sofa", 4000.0)
//!     .average_price("lamp", 800.0)
//!     .build()?;
//!
//! let result = BudgetGA::builder()
//!     .problem(problem)
//!     .population_size(20)
//!     .generations(30)
//!     .seed(42)
//!     .build()?
//!     .run_seeded()?;
//!
//! for candidate in &result.candidates {
//!     println!("{:?} -> {}", candidate.allocation, candidate.fitness);
//! }
//! ```

pub mod algorithms;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod fitness;
pub mod genome;
pub mod operators;
pub mod population;
pub mod problem;
pub mod termination;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithms::prelude::*;
    pub use crate::catalog::prelude::*;
    pub use crate::config::OptimizerConfig;
    pub use crate::diagnostics::prelude::*;
    pub use crate::error::*;
    pub use crate::fitness::prelude::*;
    pub use crate::genome::prelude::*;
    pub use crate::operators::prelude::*;
    pub use crate::population::prelude::*;
    pub use crate::problem::{BudgetProblem, BudgetProblemBuilder};
    pub use crate::termination::prelude::*;
}
