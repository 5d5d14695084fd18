//! Error types for budget-evo
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Category identifier type used in error payloads
pub type Category = String;

/// Error type for problem validation
///
/// These are raised before the optimizer enters its generational loop.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProblemError {
    /// A category's minimum exceeds its maximum
    #[error("Malformed bounds for {category}: min ({min}) must be <= max ({max})")]
    MalformedBounds { category: Category, min: f64, max: f64 },

    /// A bound is negative or not finite
    #[error("Invalid price bound for {category}: {value}")]
    InvalidBound { category: Category, value: f64 },

    /// No bounds were supplied for a category and no fallback is configured
    #[error("Missing bounds for category: {0}")]
    MissingBounds(Category),

    /// A category was listed as both user and extra
    #[error("Category {0} is both a user and an extra category")]
    OverlappingCategory(Category),

    /// A category was listed twice in the same set
    #[error("Duplicate category: {0}")]
    DuplicateCategory(Category),

    /// The total budget is not a positive finite number
    #[error("Invalid total budget: {0}")]
    InvalidBudget(f64),

    /// An average price is negative or not finite
    #[error("Invalid average price for {category}: {value}")]
    InvalidAverage { category: Category, value: f64 },
}

/// Error type for operator failures
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OperatorError {
    /// Crossover operation failed
    #[error("Crossover failed: {0}")]
    CrossoverFailed(String),
}

/// Error type for loading optimizer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error while reading a configuration file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration document
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configuration value is out of range
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Top-level error type for evolution operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Problem validation error
    #[error("Problem error: {0}")]
    Problem(#[from] ProblemError),

    /// Operator error
    #[error("Operator error: {0}")]
    Operator(#[from] OperatorError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid builder configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Empty population
    #[error("Empty population")]
    EmptyPopulation,
}

/// Result type alias for evolution operations
pub type EvoResult<T> = Result<T, EvolutionError>;

/// Repair information when an operator needs to fix a constraint violation
#[derive(Debug, Clone, PartialEq)]
pub struct RepairInfo {
    /// List of constraint violations that were repaired
    pub constraint_violations: Vec<String>,
    /// Method used to repair the genome
    pub repair_method: &'static str,
}

/// Result of an operator application with optional repair information
#[derive(Debug, Clone)]
pub enum OperatorResult<G> {
    /// Operation succeeded without repairs
    Success(G),
    /// Operation succeeded but required repairs
    Repaired(G, RepairInfo),
    /// Operation failed unrecoverably
    Failed(OperatorError),
}

impl<G> OperatorResult<G> {
    /// Returns the genome if successful or repaired, None if failed
    pub fn genome(self) -> Option<G> {
        match self {
            Self::Success(g) | Self::Repaired(g, _) => Some(g),
            Self::Failed(_) => None,
        }
    }

    /// Converts into a `Result`, discarding repair information
    pub fn into_result(self) -> Result<G, OperatorError> {
        match self {
            Self::Success(g) | Self::Repaired(g, _) => Ok(g),
            Self::Failed(e) => Err(e),
        }
    }

    /// Returns true if repairs were needed
    pub fn was_repaired(&self) -> bool {
        matches!(self, Self::Repaired(_, _))
    }
}
