//! Run diagnostics
//!
//! Per-generation snapshots of the population's cost and spend, plus the
//! run-level history the optimizer hands back with its result. Fitness is a
//! cost, so "best" always means the lowest value.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::population::population::Population;
use crate::problem::BudgetProblem;

/// How the evaluated population spends the budget
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendStats {
    /// Mean allocation total
    pub mean_total: f64,
    /// Smallest allocation total
    pub min_total: f64,
    /// Largest allocation total
    pub max_total: f64,
    /// Individuals whose total does not exceed the budget
    pub within_budget: usize,
    /// Mean number of included optional categories
    pub mean_included_extras: f64,
}

impl SpendStats {
    fn from_population(population: &Population, problem: &BudgetProblem) -> Self {
        let totals: Vec<f64> = population.iter().map(|i| i.allocation.total()).collect();
        if totals.is_empty() {
            return Self::default();
        }
        let n = totals.len() as f64;
        let included: usize = population
            .iter()
            .map(|i| i.allocation.included_extras().count())
            .sum();

        Self {
            mean_total: totals.iter().sum::<f64>() / n,
            min_total: totals.iter().copied().fold(f64::INFINITY, f64::min),
            max_total: totals.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            within_budget: totals
                .iter()
                .filter(|&&t| t <= problem.total_budget())
                .count(),
            mean_included_extras: included as f64 / n,
        }
    }
}

/// Wall-clock time of each phase of a generation, in milliseconds
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    pub repair_ms: f64,
    pub evaluation_ms: f64,
    pub breeding_ms: f64,
    pub total_ms: f64,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repair(mut self, duration: Duration) -> Self {
        self.repair_ms = millis(duration);
        self
    }

    pub fn with_evaluation(mut self, duration: Duration) -> Self {
        self.evaluation_ms = millis(duration);
        self
    }

    pub fn with_breeding(mut self, duration: Duration) -> Self {
        self.breeding_ms = millis(duration);
        self
    }

    pub fn with_total(mut self, duration: Duration) -> Self {
        self.total_ms = millis(duration);
        self
    }
}

/// Snapshot of one evaluated generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Generation index, 0 for the initial population
    pub generation: usize,
    /// Fitness evaluations performed up to and including this generation
    pub evaluations: usize,
    /// Lowest cost in the generation
    pub best_fitness: f64,
    /// Highest cost in the generation
    pub worst_fitness: f64,
    pub mean_fitness: f64,
    /// Sample standard deviation of the cost
    pub fitness_std: f64,
    /// Mean pairwise distance between allocations
    pub diversity: f64,
    pub spend: SpendStats,
    pub timing: TimingStats,
}

impl GenerationStats {
    /// Summarize an evaluated population
    ///
    /// Unevaluated individuals are left out of the cost figures. With no
    /// evaluated individual at all the best cost is `+inf` and the worst
    /// `-inf`.
    pub fn from_population(
        population: &Population,
        problem: &BudgetProblem,
        generation: usize,
        evaluations: usize,
    ) -> Self {
        let costs: Vec<f64> = population.iter().filter_map(|i| i.fitness).collect();
        let n = costs.len();

        let (best, worst) = costs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &c| (lo.min(c), hi.max(c)));
        let mean = population.mean_fitness().unwrap_or(0.0);
        let std = if n > 1 {
            (costs.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            generation,
            evaluations,
            best_fitness: best,
            worst_fitness: worst,
            mean_fitness: mean,
            fitness_std: std,
            diversity: population.diversity(),
            spend: SpendStats::from_population(population, problem),
            timing: TimingStats::default(),
        }
    }

    /// Attach phase timings
    pub fn with_timing(mut self, timing: TimingStats) -> Self {
        self.timing = timing;
        self
    }
}

/// Everything recorded over one optimizer run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// One entry per evaluated generation, initial population included
    pub generations: Vec<GenerationStats>,
    pub total_runtime_ms: f64,
    /// Message of the termination criterion that ended the run
    pub termination_reason: Option<String>,
}

impl EvolutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: GenerationStats) {
        self.generations.push(stats);
    }

    pub fn num_generations(&self) -> usize {
        self.generations.len()
    }

    /// Lowest cost seen in any generation
    pub fn best_fitness(&self) -> Option<f64> {
        self.generations
            .iter()
            .map(|g| g.best_fitness)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Lowest cost of the last recorded generation
    pub fn final_best_fitness(&self) -> Option<f64> {
        self.generations.last().map(|g| g.best_fitness)
    }

    pub fn best_fitness_history(&self) -> Vec<f64> {
        self.history(|g| g.best_fitness)
    }

    pub fn mean_fitness_history(&self) -> Vec<f64> {
        self.history(|g| g.mean_fitness)
    }

    pub fn diversity_history(&self) -> Vec<f64> {
        self.history(|g| g.diversity)
    }

    /// Mean allocation total per generation
    pub fn mean_total_history(&self) -> Vec<f64> {
        self.history(|g| g.spend.mean_total)
    }

    fn history(&self, field: impl Fn(&GenerationStats) -> f64) -> Vec<f64> {
        self.generations.iter().map(field).collect()
    }

    pub fn set_termination_reason(&mut self, reason: &str) {
        self.termination_reason = Some(reason.to_string());
    }

    pub fn set_runtime(&mut self, duration: Duration) {
        self.total_runtime_ms = millis(duration);
    }

    /// Human-readable report of the run
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Optimization Summary:".to_string(),
            format!("  generations evaluated: {}", self.num_generations()),
            format!(
                "  best cost:             {:.4}",
                self.best_fitness().unwrap_or(f64::INFINITY)
            ),
            format!(
                "  final generation best: {:.4}",
                self.final_best_fitness().unwrap_or(f64::INFINITY)
            ),
        ];
        if let Some(last) = self.generations.last() {
            lines.push(format!(
                "  final mean spend:      {:.2} ({} within budget)",
                last.spend.mean_total, last.spend.within_budget
            ));
        }
        lines.push(format!("  runtime:               {:.2}ms", self.total_runtime_ms));
        lines.push(format!(
            "  stopped because:       {}",
            self.termination_reason.as_deref().unwrap_or("unknown")
        ));
        lines.join("\n")
    }
}

pub mod prelude {
    pub use super::{EvolutionStats, GenerationStats, SpendStats, TimingStats};
}
