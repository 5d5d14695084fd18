//! Optimizer configuration
//!
//! [`OptimizerConfig`] holds every tunable of a run. It deserializes from JSON
//! with missing fields taking their defaults, so a config file only needs to
//! name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::fitness::budget::{DEFAULT_EXTRA_REWARD, DEFAULT_PENALTY_FACTOR};
use crate::operators::initialization::DEFAULT_INCLUSION_PROBABILITY;
use crate::operators::mutation::{DEFAULT_MUTATION_RATE, DEFAULT_MUTATION_SCALE};
use crate::operators::selection::DEFAULT_TOURNAMENT_SIZE;

/// Configuration for a budget optimization run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations to breed
    pub generations: usize,
    /// Tournament size for selection
    pub tournament_size: usize,
    /// Number of ranked candidates returned
    pub top_k: usize,
    /// Per-category mutation probability
    pub mutation_rate: f64,
    /// Mutation noise relative to the category's price range
    pub mutation_scale: f64,
    /// Probability that an extra category starts included
    pub inclusion_probability: f64,
    /// Multiplier for spend over budget
    pub penalty_factor: f64,
    /// Reward per included extra category
    pub extra_reward: f64,
    /// Reinsert the best-ever candidate into every new population
    pub elitism: bool,
    /// Evaluate fitness on the rayon thread pool
    pub parallel_evaluation: bool,
    /// Optional wall-clock limit in milliseconds
    pub time_limit_ms: Option<u64>,
    /// Random seed (None draws one from the OS)
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            top_k: 5,
            mutation_rate: DEFAULT_MUTATION_RATE,
            mutation_scale: DEFAULT_MUTATION_SCALE,
            inclusion_probability: DEFAULT_INCLUSION_PROBABILITY,
            penalty_factor: DEFAULT_PENALTY_FACTOR,
            extra_reward: DEFAULT_EXTRA_REWARD,
            elitism: false,
            parallel_evaluation: true,
            time_limit_ms: None,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize the configuration as pretty JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every value is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(invalid("population_size", "must be at least 1"));
        }
        if self.tournament_size == 0 {
            return Err(invalid("tournament_size", "must be at least 1"));
        }
        if self.top_k == 0 {
            return Err(invalid("top_k", "must be at least 1"));
        }
        check_probability("mutation_rate", self.mutation_rate)?;
        check_probability("inclusion_probability", self.inclusion_probability)?;
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err(invalid("mutation_scale", "must be finite and non-negative"));
        }
        if !self.penalty_factor.is_finite() || self.penalty_factor < 0.0 {
            return Err(invalid("penalty_factor", "must be finite and non-negative"));
        }
        if !self.extra_reward.is_finite() {
            return Err(invalid("extra_reward", "must be finite"));
        }
        Ok(())
    }

    /// Set population size
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set number of generations
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set tournament size
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Set number of returned candidates
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set mutation rate
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set mutation scale
    pub fn with_mutation_scale(mut self, scale: f64) -> Self {
        self.mutation_scale = scale;
        self
    }

    /// Set the initial inclusion probability of extras
    pub fn with_inclusion_probability(mut self, probability: f64) -> Self {
        self.inclusion_probability = probability;
        self
    }

    /// Set overspend penalty factor
    pub fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Set extra inclusion reward
    pub fn with_extra_reward(mut self, reward: f64) -> Self {
        self.extra_reward = reward;
        self
    }

    /// Enable or disable elitism
    pub fn with_elitism(mut self, enabled: bool) -> Self {
        self.elitism = enabled;
        self
    }

    /// Enable or disable parallel evaluation
    pub fn with_parallel_evaluation(mut self, enabled: bool) -> Self {
        self.parallel_evaluation = enabled;
        self
    }

    /// Set a wall-clock limit in milliseconds
    pub fn with_time_limit_ms(mut self, millis: u64) -> Self {
        self.time_limit_ms = Some(millis);
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, "must be in [0, 1]"))
    }
}
