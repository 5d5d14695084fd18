//! Budget allocation problem
//!
//! A [`BudgetProblem`] bundles the read-only inputs of an optimization run:
//! the mandatory and optional category sets, their price bounds, the average
//! price table and the total budget. All input validation happens here, so
//! nothing inside the generational loop can fail on malformed input.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::ProblemError;
use crate::genome::allocation::Allocation;
use crate::genome::bounds::{AveragePrices, Bounds, BoundsTable};

/// Validated inputs for one optimization run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetProblem {
    user_categories: Vec<String>,
    extra_categories: Vec<String>,
    bounds: BoundsTable,
    average_prices: AveragePrices,
    total_budget: f64,
}

impl BudgetProblem {
    /// Create and validate a problem from complete tables
    ///
    /// Bounds are raw `(min, max)` pairs and go through the same validation
    /// as [`BudgetProblemBuilder::bounds`].
    pub fn new<U, E, S, B, K>(
        user_categories: U,
        extra_categories: E,
        bounds: B,
        average_prices: AveragePrices,
        total_budget: f64,
    ) -> Result<Self, ProblemError>
    where
        U: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
        B: IntoIterator<Item = (K, (f64, f64))>,
        K: Into<String>,
    {
        let mut builder = Self::builder(total_budget)
            .user_categories(user_categories)
            .extra_categories(extra_categories);
        for (category, (min, max)) in bounds {
            builder = builder.bounds(category, min, max);
        }
        for (category, avg) in average_prices {
            builder = builder.average_price(category, avg);
        }
        builder.build()
    }

    /// Start building a problem for the given total budget
    pub fn builder(total_budget: f64) -> BudgetProblemBuilder {
        BudgetProblemBuilder::new(total_budget)
    }

    /// Mandatory categories, in input order
    pub fn user_categories(&self) -> &[String] {
        &self.user_categories
    }

    /// Optional categories, in input order
    pub fn extra_categories(&self) -> &[String] {
        &self.extra_categories
    }

    /// The bounds table
    pub fn bounds(&self) -> &BoundsTable {
        &self.bounds
    }

    /// Bounds of a single category
    pub fn bounds_of(&self, category: &str) -> Option<&Bounds> {
        self.bounds.get(category)
    }

    /// The average price table
    pub fn average_prices(&self) -> &AveragePrices {
        &self.average_prices
    }

    /// Average price of a category, if known
    pub fn average_price(&self, category: &str) -> Option<f64> {
        self.average_prices.get(category).copied()
    }

    /// Target total spend
    pub fn total_budget(&self) -> f64 {
        self.total_budget
    }

    /// User categories paired with their bounds
    pub fn user_bounds(&self) -> impl Iterator<Item = (&str, Bounds)> {
        self.user_categories
            .iter()
            .filter_map(|c| self.bounds.get(c).map(|b| (c.as_str(), *b)))
    }

    /// Extra categories paired with their bounds
    pub fn extra_bounds(&self) -> impl Iterator<Item = (&str, Bounds)> {
        self.extra_categories
            .iter()
            .filter_map(|c| self.bounds.get(c).map(|b| (c.as_str(), *b)))
    }

    /// Sum of the minimum price of every user category
    pub fn min_user_total(&self) -> f64 {
        self.bounds.min_total(&self.user_categories)
    }

    /// Whether the user minimums fit inside the budget
    pub fn is_feasible(&self) -> bool {
        self.min_user_total() <= self.total_budget
    }

    /// Whether an allocation has exactly this problem's categories
    pub fn covers(&self, allocation: &Allocation) -> bool {
        allocation.user().len() == self.user_categories.len()
            && allocation.extra().len() == self.extra_categories.len()
            && self
                .user_categories
                .iter()
                .all(|c| allocation.user().contains_key(c))
            && self
                .extra_categories
                .iter()
                .all(|c| allocation.extra().contains_key(c))
    }
}

/// Builder for [`BudgetProblem`]
#[derive(Clone, Debug)]
pub struct BudgetProblemBuilder {
    total_budget: f64,
    user_categories: Vec<String>,
    extra_categories: Vec<String>,
    bounds: BTreeMap<String, (f64, f64)>,
    average_prices: AveragePrices,
    fallback_bounds: Option<(f64, f64)>,
    fallback_average: Option<f64>,
}

impl BudgetProblemBuilder {
    /// Create a builder for the given total budget
    pub fn new(total_budget: f64) -> Self {
        Self {
            total_budget,
            user_categories: Vec::new(),
            extra_categories: Vec::new(),
            bounds: BTreeMap::new(),
            average_prices: AveragePrices::new(),
            fallback_bounds: None,
            fallback_average: None,
        }
    }

    /// Add a mandatory category
    pub fn user_category(mut self, category: impl Into<String>) -> Self {
        self.user_categories.push(category.into());
        self
    }

    /// Add several mandatory categories
    pub fn user_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_categories
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// Add an optional category
    pub fn extra_category(mut self, category: impl Into<String>) -> Self {
        self.extra_categories.push(category.into());
        self
    }

    /// Add several optional categories
    pub fn extra_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_categories
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// Set the price bounds of a category
    pub fn bounds(mut self, category: impl Into<String>, min: f64, max: f64) -> Self {
        self.bounds.insert(category.into(), (min, max));
        self
    }

    /// Set the average price of a category
    pub fn average_price(mut self, category: impl Into<String>, price: f64) -> Self {
        self.average_prices.insert(category.into(), price);
        self
    }

    /// Bounds used for categories that have none
    pub fn fallback_bounds(mut self, min: f64, max: f64) -> Self {
        self.fallback_bounds = Some((min, max));
        self
    }

    /// Average price used for categories that have none
    pub fn fallback_average(mut self, price: f64) -> Self {
        self.fallback_average = Some(price);
        self
    }

    /// Validate the inputs and build the problem
    pub fn build(self) -> Result<BudgetProblem, ProblemError> {
        if !self.total_budget.is_finite() || self.total_budget <= 0.0 {
            return Err(ProblemError::InvalidBudget(self.total_budget));
        }

        let mut seen = BTreeSet::new();
        for category in &self.user_categories {
            if !seen.insert(category.as_str()) {
                return Err(ProblemError::DuplicateCategory(category.clone()));
            }
        }
        let user_set = seen;
        let mut extra_set = BTreeSet::new();
        for category in &self.extra_categories {
            if user_set.contains(category.as_str()) {
                return Err(ProblemError::OverlappingCategory(category.clone()));
            }
            if !extra_set.insert(category.as_str()) {
                return Err(ProblemError::DuplicateCategory(category.clone()));
            }
        }

        let mut bounds = BoundsTable::new();
        for (category, &(min, max)) in &self.bounds {
            bounds.insert(category.clone(), Bounds::checked(category, min, max)?);
        }
        for category in self.user_categories.iter().chain(&self.extra_categories) {
            if bounds.contains_category(category) {
                continue;
            }
            match self.fallback_bounds {
                Some((min, max)) => {
                    bounds.insert(category.clone(), Bounds::checked(category, min, max)?)
                }
                None => return Err(ProblemError::MissingBounds(category.clone())),
            }
        }

        let mut average_prices = self.average_prices;
        if let Some(fallback) = self.fallback_average {
            for category in self.user_categories.iter().chain(&self.extra_categories) {
                average_prices.entry(category.clone()).or_insert(fallback);
            }
        }
        for (category, &value) in &average_prices {
            if !value.is_finite() || value < 0.0 {
                return Err(ProblemError::InvalidAverage {
                    category: category.clone(),
                    value,
                });
            }
        }

        Ok(BudgetProblem {
            user_categories: self.user_categories,
            extra_categories: self.extra_categories,
            bounds,
            average_prices,
            total_budget: self.total_budget,
        })
    }
}
