//! Termination criteria
//!
//! This module provides the stopping rules for the generational loop.

use std::time::Duration;

/// Evolution state for termination checking
#[derive(Clone, Debug)]
pub struct EvolutionState<'a> {
    /// Current generation number
    pub generation: usize,
    /// Total fitness evaluations so far
    pub evaluations: usize,
    /// Best fitness found so far (lower = better)
    pub best_fitness: f64,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
    /// History of best fitness values per generation
    pub fitness_history: &'a [f64],
}

/// Termination criterion trait
pub trait TerminationCriterion: Send + Sync {
    /// Check if evolution should terminate
    fn should_terminate(&self, state: &EvolutionState) -> bool;

    /// Get a description of why termination occurred
    fn reason(&self) -> &'static str;
}

/// Terminate after a maximum number of generations
#[derive(Clone, Debug)]
pub struct MaxGenerations(pub usize);

impl MaxGenerations {
    /// Create a new max generations criterion
    pub fn new(max: usize) -> Self {
        Self(max)
    }
}

impl TerminationCriterion for MaxGenerations {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.generation >= self.0
    }

    fn reason(&self) -> &'static str {
        "Maximum generations reached"
    }
}

/// Terminate once a wall-clock budget is spent
#[derive(Clone, Debug)]
pub struct Deadline(pub Duration);

impl Deadline {
    /// Create a deadline from a duration
    pub fn new(limit: Duration) -> Self {
        Self(limit)
    }

    /// Create a deadline from milliseconds
    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }
}

impl TerminationCriterion for Deadline {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        state.elapsed >= self.0
    }

    fn reason(&self) -> &'static str {
        "Time limit reached"
    }
}

/// Combine criteria with OR logic (any one triggers termination)
pub struct AnyOf {
    criteria: Vec<Box<dyn TerminationCriterion>>,
}

impl AnyOf {
    /// Create a new AnyOf combinator
    pub fn new(criteria: Vec<Box<dyn TerminationCriterion>>) -> Self {
        Self { criteria }
    }

    /// Reason of the first criterion that currently fires
    pub fn triggered_reason(&self, state: &EvolutionState) -> Option<&'static str> {
        self.criteria
            .iter()
            .find(|c| c.should_terminate(state))
            .map(|c| c.reason())
    }
}

impl TerminationCriterion for AnyOf {
    fn should_terminate(&self, state: &EvolutionState) -> bool {
        self.criteria.iter().any(|c| c.should_terminate(state))
    }

    fn reason(&self) -> &'static str {
        "One of multiple criteria met"
    }
}

pub mod prelude {
    pub use super::{AnyOf, Deadline, EvolutionState, MaxGenerations, TerminationCriterion};
}
