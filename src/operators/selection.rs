//! Selection operators
//!
//! This module provides tournament selection for cost-minimizing search.

use rand::seq::index;
use rand::Rng;

use crate::operators::traits::SelectionOperator;
use crate::population::individual::Individual;

/// Default number of competitors per tournament
pub const DEFAULT_TOURNAMENT_SIZE: usize = 3;

/// Tournament selection operator
///
/// Draws distinct individuals at random and returns the one with the lowest
/// fitness. When the population is smaller than the tournament, everyone
/// competes. Ties go to the first competitor drawn.
#[derive(Clone, Debug)]
pub struct TournamentSelection {
    /// Tournament size (number of individuals competing)
    pub tournament_size: usize,
}

impl TournamentSelection {
    /// Create a new tournament selection with the given size
    pub fn new(tournament_size: usize) -> Self {
        assert!(tournament_size >= 1, "Tournament size must be at least 1");
        Self { tournament_size }
    }

    /// Create binary tournament selection (size = 2)
    pub fn binary() -> Self {
        Self::new(2)
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        Self::new(DEFAULT_TOURNAMENT_SIZE)
    }
}

impl SelectionOperator for TournamentSelection {
    fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize {
        assert!(!population.is_empty(), "Population cannot be empty");

        let tournament_size = self.tournament_size.min(population.len());

        index::sample(rng, population.len(), tournament_size)
            .into_iter()
            .min_by(|&a, &b| {
                population[a]
                    .fitness_or_worst()
                    .total_cmp(&population[b].fitness_or_worst())
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::allocation::Allocation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn create_population(size: usize) -> Vec<Individual> {
        (0..size)
            .map(|i| {
                let a = Allocation::from_pairs(vec![("sofa", 3000.0 + i as f64)], Vec::new());
                Individual::with_fitness(a, i as f64)
            })
            .collect()
    }

    #[test]
    fn test_tournament_selection_selects_valid_index() {
        let mut rng = StdRng::seed_from_u64(42);
        let population = create_population(10);
        let selection = TournamentSelection::new(3);

        for _ in 0..100 {
            let idx = selection.select(&population, &mut rng);
            assert!(idx < population.len());
        }
    }

    #[test]
    fn test_tournament_prefers_lower_fitness() {
        let mut rng = StdRng::seed_from_u64(42);
        let population = create_population(10);
        let selection = TournamentSelection::new(3);

        let trials = 1000;
        let total: usize = (0..trials)
            .map(|_| selection.select(&population, &mut rng))
            .sum();
        // uniform picks would average 4.5
        assert!((total as f64 / trials as f64) < 3.5);
    }

    #[test]
    fn test_tournament_over_whole_population_picks_best() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut population = create_population(2);
        population.reverse();
        let selection = TournamentSelection::new(5);

        for _ in 0..20 {
            assert_eq!(selection.select(&population, &mut rng), 1);
        }
    }

    #[test]
    fn test_unevaluated_never_wins_against_evaluated() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut population = create_population(2);
        population[0] = Individual::new(population[0].allocation.clone());
        let selection = TournamentSelection::new(2);
        assert_eq!(selection.select(&population, &mut rng), 1);
    }

    #[test]
    #[should_panic(expected = "Tournament size must be at least 1")]
    fn test_tournament_size_zero() {
        TournamentSelection::new(0);
    }

    #[test]
    #[should_panic(expected = "Population cannot be empty")]
    fn test_empty_population() {
        let mut rng = StdRng::seed_from_u64(0);
        TournamentSelection::new(3).select(&[], &mut rng);
    }
}
