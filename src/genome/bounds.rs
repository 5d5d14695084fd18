//! Price bounds for spending categories
//!
//! This module provides bounds types for constraining category allocations.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ProblemError;

/// Price bounds for a single category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl Bounds {
    /// Create new bounds
    ///
    /// # Panics
    /// Panics if min > max
    pub fn new(min: f64, max: f64) -> Self {
        assert!(
            min <= max,
            "Invalid bounds: min ({}) must be <= max ({})",
            min,
            max
        );
        Self { min, max }
    }

    /// Create bounds for a named category, validating them as prices
    pub fn checked(category: &str, min: f64, max: f64) -> Result<Self, ProblemError> {
        for value in [min, max] {
            if !value.is_finite() || value < 0.0 {
                return Err(ProblemError::InvalidBound {
                    category: category.to_string(),
                    value,
                });
            }
        }
        if min > max {
            return Err(ProblemError::MalformedBounds {
                category: category.to_string(),
                min,
                max,
            });
        }
        Ok(Self { min, max })
    }

    /// Get the range (max - min)
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Check if a value is within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clamp a value to be within bounds
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Draw a value uniformly from `[min, max]`
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }
}

/// Per-category bounds lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundsTable {
    bounds: BTreeMap<String, Bounds>,
}

impl BoundsTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the bounds of a category
    pub fn insert(&mut self, category: impl Into<String>, bounds: Bounds) {
        self.bounds.insert(category.into(), bounds);
    }

    /// Get bounds for a category
    pub fn get(&self, category: &str) -> Option<&Bounds> {
        self.bounds.get(category)
    }

    /// Whether the table has bounds for a category
    pub fn contains_category(&self, category: &str) -> bool {
        self.bounds.contains_key(category)
    }

    /// Number of categories in the table
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Iterate over `(category, bounds)` in category order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bounds)> {
        self.bounds.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Sum of minimums over the given categories (missing categories count as 0)
    pub fn min_total<'a, I>(&self, categories: I) -> f64
    where
        I: IntoIterator<Item = &'a String>,
    {
        categories
            .into_iter()
            .filter_map(|c| self.bounds.get(c))
            .map(|b| b.min)
            .sum()
    }
}

impl<S: Into<String>> FromIterator<(S, Bounds)> for BoundsTable {
    fn from_iter<I: IntoIterator<Item = (S, Bounds)>>(iter: I) -> Self {
        Self {
            bounds: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Category to representative average price
pub type AveragePrices = BTreeMap<String, f64>;
