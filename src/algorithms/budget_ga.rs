//! Generational genetic algorithm for budget allocation
//!
//! This module implements the generational loop: initialize, then per
//! generation repair, evaluate, track the best-ever candidate and breed the
//! next population through tournament selection, crossover and mutation.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::OptimizerConfig;
use crate::diagnostics::{EvolutionStats, GenerationStats, TimingStats};
use crate::error::{EvoResult, EvolutionError};
use crate::fitness::budget::BudgetFitness;
use crate::fitness::traits::Fitness;
use crate::genome::allocation::Allocation;
use crate::operators::crossover::UniformCrossover;
use crate::operators::initialization::UniformInitializer;
use crate::operators::mutation::AllocationMutation;
use crate::operators::repair::BudgetRepair;
use crate::operators::selection::TournamentSelection;
use crate::operators::traits::{CrossoverOperator, MutationOperator, SelectionOperator};
use crate::population::individual::Individual;
use crate::population::population::Population;
use crate::problem::BudgetProblem;
use crate::termination::{AnyOf, Deadline, EvolutionState, MaxGenerations, TerminationCriterion};

/// An allocation together with its fitness
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredAllocation {
    /// The allocation
    pub allocation: Allocation,
    /// Its fitness (lower = better)
    pub fitness: f64,
}

impl ScoredAllocation {
    fn from_individual(individual: &Individual) -> Self {
        Self {
            allocation: individual.allocation().clone(),
            fitness: individual.fitness_or_worst(),
        }
    }
}

/// Non-fatal conditions detected during a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BudgetWarning {
    /// The user minimums alone exceed the budget; every candidate is the
    /// minimum fallback and knowingly over budget
    InfeasibleBudget {
        /// Sum of the user category minimums
        min_user_total: f64,
        /// The requested budget
        total_budget: f64,
    },
    /// The wall-clock limit stopped the run early
    TimeLimitReached {
        /// Generations completed before the limit
        generations: usize,
    },
}

/// Result of an optimization run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best candidates of the final population, ascending by fitness
    pub candidates: Vec<ScoredAllocation>,
    /// Best candidate evaluated at any point of the run
    ///
    /// Without elitism it may be absent from `candidates`.
    pub best_ever: ScoredAllocation,
    /// Number of generations bred
    pub generations: usize,
    /// Total fitness evaluations
    pub evaluations: usize,
    /// Statistics for the run
    pub stats: EvolutionStats,
    /// Warnings raised during the run
    pub warnings: Vec<BudgetWarning>,
}

impl OptimizationResult {
    /// The top ranked candidate of the final population
    pub fn best(&self) -> Option<&ScoredAllocation> {
        self.candidates.first()
    }

    /// The ranked allocations without their fitness
    pub fn allocations(&self) -> impl Iterator<Item = &Allocation> {
        self.candidates.iter().map(|c| &c.allocation)
    }

    /// Whether the run hit the infeasible-budget fallback
    pub fn is_infeasible(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, BudgetWarning::InfeasibleBudget { .. }))
    }
}

/// Builder for BudgetGA
#[derive(Clone, Debug, Default)]
pub struct BudgetGABuilder {
    problem: Option<BudgetProblem>,
    config: OptimizerConfig,
}

impl BudgetGABuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the problem to optimize
    pub fn problem(mut self, problem: BudgetProblem) -> Self {
        self.problem = Some(problem);
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: OptimizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the population size
    pub fn population_size(mut self, size: usize) -> Self {
        self.config.population_size = size;
        self
    }

    /// Set the number of generations
    pub fn generations(mut self, generations: usize) -> Self {
        self.config.generations = generations;
        self
    }

    /// Set the tournament size
    pub fn tournament_size(mut self, size: usize) -> Self {
        self.config.tournament_size = size;
        self
    }

    /// Enable or disable elitism
    pub fn elitism(mut self, enabled: bool) -> Self {
        self.config.elitism = enabled;
        self
    }

    /// Enable or disable parallel evaluation
    pub fn parallel_evaluation(mut self, enabled: bool) -> Self {
        self.config.parallel_evaluation = enabled;
        self
    }

    /// Set a wall-clock limit
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.config.time_limit_ms = Some(limit.as_millis() as u64);
        self
    }

    /// Set the random seed used by [`BudgetGA::run_seeded`]
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Build the BudgetGA instance with the default operators
    pub fn build(self) -> EvoResult<BudgetGA> {
        let problem = self
            .problem
            .ok_or_else(|| EvolutionError::Configuration("Problem must be specified".to_string()))?;
        BudgetGA::new(problem, self.config)
    }
}

/// Generational GA over budget allocations
pub struct BudgetGA<
    S = TournamentSelection,
    C = UniformCrossover,
    M = AllocationMutation,
    Fit = BudgetFitness,
> {
    problem: BudgetProblem,
    config: OptimizerConfig,
    initializer: UniformInitializer,
    repair: BudgetRepair,
    selection: S,
    crossover: C,
    mutation: M,
    fitness: Fit,
}

impl BudgetGA {
    /// Create a BudgetGA with the default operators configured from `config`
    pub fn new(problem: BudgetProblem, config: OptimizerConfig) -> EvoResult<Self> {
        config.validate()?;
        Ok(Self {
            initializer: UniformInitializer::new()
                .with_inclusion_probability(config.inclusion_probability),
            repair: BudgetRepair::new(),
            selection: TournamentSelection::new(config.tournament_size),
            crossover: UniformCrossover::new(),
            mutation: AllocationMutation::new()
                .with_rate(config.mutation_rate)
                .with_scale(config.mutation_scale),
            fitness: BudgetFitness::new()
                .with_penalty_factor(config.penalty_factor)
                .with_extra_reward(config.extra_reward),
            problem,
            config,
        })
    }

    /// Create a builder for BudgetGA
    pub fn builder() -> BudgetGABuilder {
        BudgetGABuilder::new()
    }
}

impl<S, C, M, Fit> BudgetGA<S, C, M, Fit> {
    /// Replace the selection operator
    pub fn with_selection<NewS: SelectionOperator>(
        self,
        selection: NewS,
    ) -> BudgetGA<NewS, C, M, Fit> {
        BudgetGA {
            problem: self.problem,
            config: self.config,
            initializer: self.initializer,
            repair: self.repair,
            selection,
            crossover: self.crossover,
            mutation: self.mutation,
            fitness: self.fitness,
        }
    }

    /// Replace the crossover operator
    pub fn with_crossover<NewC: CrossoverOperator>(
        self,
        crossover: NewC,
    ) -> BudgetGA<S, NewC, M, Fit> {
        BudgetGA {
            problem: self.problem,
            config: self.config,
            initializer: self.initializer,
            repair: self.repair,
            selection: self.selection,
            crossover,
            mutation: self.mutation,
            fitness: self.fitness,
        }
    }

    /// Replace the mutation operator
    pub fn with_mutation<NewM: MutationOperator>(
        self,
        mutation: NewM,
    ) -> BudgetGA<S, C, NewM, Fit> {
        BudgetGA {
            problem: self.problem,
            config: self.config,
            initializer: self.initializer,
            repair: self.repair,
            selection: self.selection,
            crossover: self.crossover,
            mutation,
            fitness: self.fitness,
        }
    }

    /// Replace the fitness function
    pub fn with_fitness<NewFit: Fitness>(self, fitness: NewFit) -> BudgetGA<S, C, M, NewFit> {
        BudgetGA {
            problem: self.problem,
            config: self.config,
            initializer: self.initializer,
            repair: self.repair,
            selection: self.selection,
            crossover: self.crossover,
            mutation: self.mutation,
            fitness,
        }
    }

    /// The problem being optimized
    pub fn problem(&self) -> &BudgetProblem {
        &self.problem
    }

    /// The run configuration
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }
}

impl<S, C, M, Fit> BudgetGA<S, C, M, Fit>
where
    S: SelectionOperator,
    C: CrossoverOperator,
    M: MutationOperator,
    Fit: Fitness,
{
    fn termination(&self) -> AnyOf {
        let mut criteria: Vec<Box<dyn TerminationCriterion>> =
            vec![Box::new(MaxGenerations::new(self.config.generations))];
        if let Some(millis) = self.config.time_limit_ms {
            criteria.push(Box::new(Deadline::from_millis(millis)));
        }
        AnyOf::new(criteria)
    }

    /// Run with an RNG seeded from the configuration
    pub fn run_seeded(&self) -> EvoResult<OptimizationResult> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.run(&mut rng)
    }

    /// Run the genetic algorithm
    pub fn run<R: Rng>(&self, rng: &mut R) -> EvoResult<OptimizationResult> {
        let start_time = Instant::now();
        let problem = &self.problem;

        info!(
            population_size = self.config.population_size,
            generations = self.config.generations,
            total_budget = problem.total_budget(),
            user_categories = problem.user_categories().len(),
            extra_categories = problem.extra_categories().len(),
            "starting budget optimization"
        );

        let mut warnings = Vec::new();
        if !problem.is_feasible() {
            warn!(
                min_user_total = problem.min_user_total(),
                total_budget = problem.total_budget(),
                "user minimums exceed the budget; falling back to minimum allocations"
            );
            warnings.push(BudgetWarning::InfeasibleBudget {
                min_user_total: problem.min_user_total(),
                total_budget: problem.total_budget(),
            });
        }

        let termination = self.termination();
        let mut population =
            Population::random(self.config.population_size, &self.initializer, problem, rng);

        let mut stats = EvolutionStats::new();
        let mut evaluations = 0;
        let mut fitness_history: Vec<f64> = Vec::new();
        let mut best_ever: Option<Individual> = None;

        loop {
            let gen_start = Instant::now();
            let generation = population.generation();

            let repair_start = Instant::now();
            let repaired = population.repair_all(&self.repair, problem);
            let repair_time = repair_start.elapsed();

            let eval_start = Instant::now();
            if self.config.parallel_evaluation {
                population.evaluate_parallel(&self.fitness, problem);
            } else {
                population.evaluate(&self.fitness, problem);
            }
            let eval_time = eval_start.elapsed();
            evaluations += population.len();

            let best = population.best().ok_or(EvolutionError::EmptyPopulation)?;
            if best_ever.as_ref().map_or(true, |b| best.is_better_than(b)) {
                best_ever = Some(best.clone());
            }
            let best_ever_fitness = best_ever
                .as_ref()
                .map_or(f64::INFINITY, Individual::fitness_or_worst);

            let gen_stats =
                GenerationStats::from_population(&population, problem, generation, evaluations);
            debug!(
                generation,
                best = gen_stats.best_fitness,
                mean = gen_stats.mean_fitness,
                diversity = gen_stats.diversity,
                mean_total = gen_stats.spend.mean_total,
                repaired,
                best_ever = best_ever_fitness,
                "generation evaluated"
            );
            fitness_history.push(gen_stats.best_fitness);

            let state = EvolutionState {
                generation,
                evaluations,
                best_fitness: best_ever_fitness,
                elapsed: start_time.elapsed(),
                fitness_history: &fitness_history,
            };

            if let Some(reason) = termination.triggered_reason(&state) {
                let timing = TimingStats::new()
                    .with_repair(repair_time)
                    .with_evaluation(eval_time)
                    .with_total(gen_start.elapsed());
                stats.record(gen_stats.with_timing(timing));
                stats.set_termination_reason(reason);
                if generation < self.config.generations {
                    warn!(generation, "time limit reached before the last generation");
                    warnings.push(BudgetWarning::TimeLimitReached {
                        generations: generation,
                    });
                }
                break;
            }

            let breed_start = Instant::now();
            let next = self.breed(&population, best_ever.as_ref(), rng);
            let timing = TimingStats::new()
                .with_repair(repair_time)
                .with_evaluation(eval_time)
                .with_breeding(breed_start.elapsed())
                .with_total(gen_start.elapsed());
            stats.record(gen_stats.with_timing(timing));
            population = next;
        }

        stats.set_runtime(start_time.elapsed());

        let best_ever = best_ever.ok_or(EvolutionError::EmptyPopulation)?;
        population.sort_by_fitness();
        let top_k = self.config.top_k.min(population.len());
        let candidates: Vec<ScoredAllocation> = population
            .iter()
            .take(top_k)
            .map(ScoredAllocation::from_individual)
            .collect();

        info!(
            generations = population.generation(),
            evaluations,
            best_fitness = best_ever.fitness_or_worst(),
            runtime_ms = stats.total_runtime_ms,
            "budget optimization finished"
        );

        Ok(OptimizationResult {
            candidates,
            best_ever: ScoredAllocation::from_individual(&best_ever),
            generations: population.generation(),
            evaluations,
            stats,
            warnings,
        })
    }

    /// Breed the next population from an evaluated one
    fn breed<R: Rng>(
        &self,
        population: &Population,
        best_ever: Option<&Individual>,
        rng: &mut R,
    ) -> Population {
        let size = self.config.population_size;
        let next_generation = population.generation() + 1;
        let mut next = Population::with_capacity(size);

        if self.config.elitism {
            if let Some(best) = best_ever {
                next.push(Individual::with_generation(
                    best.allocation.clone(),
                    best.birth_generation,
                ));
            }
        }

        let parents = population.individuals();
        while next.len() < size {
            let parent1 = &parents[self.selection.select(parents, rng)].allocation;
            let parent2 = &parents[self.selection.select(parents, rng)].allocation;

            let (child1, child2) = match self
                .crossover
                .crossover(parent1, parent2, &self.problem, rng)
                .into_result()
            {
                Ok(children) => children,
                Err(err) => {
                    warn!(error = %err, "crossover failed, keeping parents");
                    (parent1.clone(), parent2.clone())
                }
            };

            let child1 = self
                .mutation
                .mutate(&child1, &self.problem, rng)
                .genome()
                .unwrap_or(child1);
            let child2 = self
                .mutation
                .mutate(&child2, &self.problem, rng)
                .genome()
                .unwrap_or(child2);

            next.push(Individual::with_generation(child1, next_generation));
            if next.len() < size {
                next.push(Individual::with_generation(child2, next_generation));
            }
        }

        next.truncate(size);
        next.set_generation(next_generation);
        next
    }
}

/// Optimize a problem with the default operators
pub fn optimize(problem: BudgetProblem, config: OptimizerConfig) -> EvoResult<OptimizationResult> {
    BudgetGA::new(problem, config)?.run_seeded()
}
