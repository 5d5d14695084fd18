//! Individual wrapper type
//!
//! This module provides the Individual type that wraps an allocation with its fitness.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::genome::allocation::Allocation;

/// An individual in the population
///
/// Wraps an allocation with its computed fitness (lower = better) and the
/// generation it was created in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    /// The allocation of this individual
    pub allocation: Allocation,
    /// The fitness value (None if not yet evaluated)
    pub fitness: Option<f64>,
    /// Generation when this individual was created
    pub birth_generation: usize,
}

impl Individual {
    /// Create a new individual with an unevaluated allocation
    pub fn new(allocation: Allocation) -> Self {
        Self {
            allocation,
            fitness: None,
            birth_generation: 0,
        }
    }

    /// Create a new individual with a known fitness
    pub fn with_fitness(allocation: Allocation, fitness: f64) -> Self {
        Self {
            allocation,
            fitness: Some(fitness),
            birth_generation: 0,
        }
    }

    /// Create a new individual with birth generation
    pub fn with_generation(allocation: Allocation, generation: usize) -> Self {
        Self {
            allocation,
            fitness: None,
            birth_generation: generation,
        }
    }

    /// Check if this individual has been evaluated
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Fitness for ranking; unevaluated individuals rank last
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// Set the fitness value
    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Get a reference to the allocation
    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    /// Check if this individual is better (lower fitness) than another
    pub fn is_better_than(&self, other: &Self) -> bool {
        match (self.fitness, other.fitness) {
            (Some(f1), Some(f2)) => f1 < f2,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Compare by fitness, best first
    pub fn cmp_fitness(&self, other: &Self) -> Ordering {
        self.fitness_or_worst().total_cmp(&other.fitness_or_worst())
    }
}
