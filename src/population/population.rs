//! Population type
//!
//! This module provides the Population container type.

use rand::Rng;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::fitness::traits::Fitness;
use crate::operators::traits::{Initializer, RepairOperator};
use crate::population::individual::Individual;
use crate::problem::BudgetProblem;

/// A population of individuals
#[derive(Clone, Debug, Default)]
pub struct Population {
    /// The individuals in this population
    individuals: Vec<Individual>,
    /// Current generation number
    generation: usize,
}

impl Population {
    /// Create an empty population
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a population with the given capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            individuals: Vec::with_capacity(capacity),
            generation: 0,
        }
    }

    /// Create a population from a vector of individuals
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        Self {
            individuals,
            generation: 0,
        }
    }

    /// Create a random population with the given initializer
    pub fn random<I, R>(size: usize, initializer: &I, problem: &BudgetProblem, rng: &mut R) -> Self
    where
        I: Initializer,
        R: Rng,
    {
        let individuals = (0..size)
            .map(|_| Individual::new(initializer.initialize(problem, rng)))
            .collect();
        Self::from_individuals(individuals)
    }

    /// Get the current generation
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Set the generation number
    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Get the population size
    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    /// Check if the population is empty
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Get an individual by index
    pub fn get(&self, index: usize) -> Option<&Individual> {
        self.individuals.get(index)
    }

    /// Add an individual to the population
    pub fn push(&mut self, individual: Individual) {
        self.individuals.push(individual);
    }

    /// Shorten the population to at most `size` individuals
    pub fn truncate(&mut self, size: usize) {
        self.individuals.truncate(size);
    }

    /// Get an iterator over the individuals
    pub fn iter(&self) -> impl Iterator<Item = &Individual> {
        self.individuals.iter()
    }

    /// Get the underlying slice of individuals
    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    /// Get the best (lowest fitness) evaluated individual
    ///
    /// Ties go to the earliest individual.
    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .filter(|i| i.is_evaluated())
            .min_by(|a, b| a.cmp_fitness(b))
    }

    /// Sort the population by fitness (best first, stable)
    pub fn sort_by_fitness(&mut self) {
        self.individuals.sort_by(|a, b| a.cmp_fitness(b));
    }

    /// Replace every allocation with its repaired version
    ///
    /// Repaired individuals are new values and start unevaluated. Returns
    /// how many allocations the repair had to change.
    pub fn repair_all<Rep>(&mut self, repair: &Rep, problem: &BudgetProblem) -> usize
    where
        Rep: RepairOperator,
    {
        let mut changed = 0;
        self.individuals = self
            .individuals
            .iter()
            .map(|i| {
                let result = repair.repair(&i.allocation, problem);
                if result.was_repaired() {
                    changed += 1;
                }
                let repaired = result.genome().unwrap_or_else(|| i.allocation.clone());
                Individual::with_generation(repaired, i.birth_generation)
            })
            .collect();
        changed
    }

    /// Evaluate all individuals using the given fitness function (sequential)
    pub fn evaluate<Fit>(&mut self, fitness: &Fit, problem: &BudgetProblem)
    where
        Fit: Fitness,
    {
        for individual in &mut self.individuals {
            if !individual.is_evaluated() {
                let f = fitness.evaluate(&individual.allocation, problem);
                individual.set_fitness(f);
            }
        }
    }

    /// Compute mean fitness
    pub fn mean_fitness(&self) -> Option<f64> {
        let evaluated: Vec<f64> = self.individuals.iter().filter_map(|i| i.fitness).collect();

        if evaluated.is_empty() {
            None
        } else {
            Some(evaluated.iter().sum::<f64>() / evaluated.len() as f64)
        }
    }

    /// Compute population diversity (average pairwise distance)
    pub fn diversity(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }

        let mut total_distance = 0.0;
        let mut count = 0;

        for i in 0..self.len() {
            for j in (i + 1)..self.len() {
                total_distance += self.individuals[i]
                    .allocation
                    .distance(&self.individuals[j].allocation);
                count += 1;
            }
        }

        total_distance / count as f64
    }
}

/// Parallel evaluation support (requires `parallel` feature)
#[cfg(feature = "parallel")]
impl Population {
    /// Evaluate all individuals using the given fitness function (parallel)
    pub fn evaluate_parallel<Fit>(&mut self, fitness: &Fit, problem: &BudgetProblem)
    where
        Fit: Fitness,
    {
        self.individuals
            .par_iter_mut()
            .filter(|i| !i.is_evaluated())
            .for_each(|individual| {
                let f = fitness.evaluate(&individual.allocation, problem);
                individual.set_fitness(f);
            });
    }
}

/// Sequential fallback for parallel evaluation (when `parallel` feature is disabled)
#[cfg(not(feature = "parallel"))]
impl Population {
    /// Evaluate all individuals using the given fitness function (sequential fallback)
    pub fn evaluate_parallel<Fit>(&mut self, fitness: &Fit, problem: &BudgetProblem)
    where
        Fit: Fitness,
    {
        self.evaluate(fitness, problem);
    }
}

impl std::ops::Index<usize> for Population {
    type Output = Individual;

    fn index(&self, index: usize) -> &Self::Output {
        &self.individuals[index]
    }
}

impl IntoIterator for Population {
    type Item = Individual;
    type IntoIter = std::vec::IntoIter<Individual>;

    fn into_iter(self) -> Self::IntoIter {
        self.individuals.into_iter()
    }
}

impl FromIterator<Individual> for Population {
    fn from_iter<I: IntoIterator<Item = Individual>>(iter: I) -> Self {
        Self::from_individuals(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fitness::budget::BudgetFitness;
    use crate::genome::allocation::Allocation;
    use crate::operators::initialization::UniformInitializer;
    use crate::operators::repair::BudgetRepair;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn problem() -> BudgetProblem {
        BudgetProblem::builder(5000.0)
            .user_category("sofa")
            .extra_category("lamp")
            .bounds("sofa", 3000.0, 6000.0)
            .bounds("lamp", 200.0, 1500.0)
            .average_price("sofa", 4000.0)
            .average_price("lamp", 800.0)
            .build()
            .unwrap()
    }

    fn alloc(sofa: f64, lamp: f64) -> Allocation {
        Allocation::from_pairs(vec![("sofa", sofa)], vec![("lamp", lamp)])
    }

    fn create_test_population() -> Population {
        vec![
            Individual::with_fitness(alloc(3000.0, 0.0), 30.0),
            Individual::with_fitness(alloc(3100.0, 0.0), 10.0),
            Individual::with_fitness(alloc(3200.0, 0.0), 50.0),
            Individual::with_fitness(alloc(3300.0, 0.0), 20.0),
            Individual::with_fitness(alloc(3400.0, 0.0), 40.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_population_random() {
        let mut rng = StdRng::seed_from_u64(1);
        let problem = problem();
        let pop = Population::random(12, &UniformInitializer::new(), &problem, &mut rng);
        assert_eq!(pop.len(), 12);
        assert!(pop.iter().all(|i| problem.covers(&i.allocation)));
        assert!(pop.iter().all(|i| !i.is_evaluated()));
    }

    #[test]
    fn test_best() {
        let mut pop = create_test_population();
        assert_eq!(pop.best().and_then(|i| i.fitness), Some(10.0));
        pop.push(Individual::new(alloc(3500.0, 0.0)));
        assert_eq!(pop.best().and_then(|i| i.fitness), Some(10.0));
        assert!(Population::new().best().is_none());
    }

    #[test]
    fn test_sort_by_fitness_ascending() {
        let mut pop = create_test_population();
        pop.sort_by_fitness();
        let fitnesses: Vec<f64> = pop.iter().filter_map(|i| i.fitness).collect();
        assert_eq!(fitnesses, vec![10.0, 20.0, 30.0, 40.0, 50.0]);
    }

    #[test]
    fn test_unevaluated_sorts_last() {
        let mut pop = create_test_population();
        pop.push(Individual::new(alloc(3500.0, 0.0)));
        pop.sort_by_fitness();
        assert!(pop[0].is_evaluated());
        assert!(!pop[5].is_evaluated());
    }

    #[test]
    fn test_evaluate_sequential_and_parallel_agree() {
        let mut rng = StdRng::seed_from_u64(9);
        let problem = problem();
        let fitness = BudgetFitness::new();
        let mut a = Population::random(20, &UniformInitializer::new(), &problem, &mut rng);
        let mut b = a.clone();
        a.evaluate(&fitness, &problem);
        b.evaluate_parallel(&fitness, &problem);
        assert!(a.iter().all(|i| i.is_evaluated()));
        let fa: Vec<_> = a.iter().map(|i| i.fitness).collect();
        let fb: Vec<_> = b.iter().map(|i| i.fitness).collect();
        assert_eq!(fa, fb);
    }

    #[test]
    fn test_repair_all_resets_fitness() {
        let problem = problem();
        let mut pop = create_test_population();
        // every total is short of the 5000 budget
        assert_eq!(pop.repair_all(&BudgetRepair::new(), &problem), 5);
        assert_eq!(pop.len(), 5);
        assert!(pop.iter().all(|i| !i.is_evaluated()));
        assert_eq!(pop.repair_all(&BudgetRepair::new(), &problem), 0);
    }

    #[test]
    fn test_mean_and_diversity() {
        let pop = create_test_population();
        assert_eq!(pop.mean_fitness(), Some(30.0));
        // sofa values 3000..3400 step 100: mean pairwise distance = 200
        assert!((pop.diversity() - 200.0).abs() < 1e-9);
        assert_eq!(Population::new().diversity(), 0.0);
    }

    #[test]
    fn test_truncate() {
        let mut pop = create_test_population();
        pop.truncate(2);
        assert_eq!(pop.len(), 2);
    }
}
