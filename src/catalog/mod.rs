//! Product catalog
//!
//! An in-memory product list that supplies the optimizer's price tables:
//! per-category average prices and observed (min, max) bounds. Loading the
//! catalog from disk is left to the caller.

pub mod bundle;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::genome::bounds::{AveragePrices, Bounds, BoundsTable};
use crate::problem::{BudgetProblem, BudgetProblemBuilder};

/// Bounds used for categories without any priced product
pub const DEFAULT_FALLBACK_BOUNDS: (f64, f64) = (100.0, 10_000.0);

/// Average price used for categories without any priced product
pub const DEFAULT_FALLBACK_AVERAGE: f64 = 1000.0;

/// A purchasable product
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product name, unique within a catalog
    pub name: String,
    /// Category identifier
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Color label, if known
    #[serde(default)]
    pub color: Option<String>,
    /// Product page
    #[serde(default)]
    pub url: Option<String>,
}

impl Product {
    /// Create a product without color or url
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
            color: None,
            url: None,
        }
    }

    /// Set the color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the product url
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Whether the price can take part in statistics
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price >= 0.0
    }
}

/// Price statistics of one category
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// Number of priced products
    pub count: usize,
    /// Lowest price
    pub min: f64,
    /// Highest price
    pub max: f64,
    /// Mean price
    pub average: f64,
}

impl CategoryStats {
    /// Observed price range as bounds
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.min, self.max)
    }
}

/// In-memory product catalog
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product; products with a negative or non-finite price are dropped
    pub fn push(&mut self, product: Product) -> bool {
        if !product.has_valid_price() {
            debug!(
                name = %product.name,
                price = product.price,
                "ignoring product without a usable price"
            );
            return false;
        }
        self.products.push(product);
        true
    }

    /// All products, in insertion order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products of one category
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> + 'a {
        self.products.iter().filter(move |p| p.category == category)
    }

    /// Categories in order of first appearance
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for product in &self.products {
            if !seen.contains(&product.category.as_str()) {
                seen.push(product.category.as_str());
            }
        }
        seen
    }

    /// Price statistics of a category
    pub fn category_stats(&self, category: &str) -> Option<CategoryStats> {
        let prices: Vec<f64> = self.in_category(category).map(|p| p.price).collect();
        if prices.is_empty() {
            return None;
        }
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(CategoryStats {
            count: prices.len(),
            min,
            max,
            average: prices.iter().sum::<f64>() / prices.len() as f64,
        })
    }

    /// Statistics of every category
    pub fn stats(&self) -> BTreeMap<String, CategoryStats> {
        self.categories()
            .into_iter()
            .filter_map(|c| self.category_stats(c).map(|s| (c.to_string(), s)))
            .collect()
    }

    /// Average price per category
    pub fn average_prices(&self) -> AveragePrices {
        self.stats()
            .into_iter()
            .map(|(category, s)| (category, s.average))
            .collect()
    }

    /// Observed price bounds per category
    pub fn bounds(&self) -> BoundsTable {
        self.stats()
            .into_iter()
            .map(|(category, s)| (category, s.bounds()))
            .collect()
    }

    /// Start a problem for the chosen categories
    ///
    /// Every catalog category the user did not choose becomes an optional
    /// category. Bounds and averages come from the catalog, with the default
    /// fallbacks for categories the catalog has no prices for.
    pub fn problem_builder<I, S>(
        &self,
        user_categories: I,
        total_budget: f64,
    ) -> BudgetProblemBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let users: Vec<String> = user_categories.into_iter().map(Into::into).collect();
        let extras: Vec<String> = self
            .categories()
            .into_iter()
            .filter(|c| !users.iter().any(|u| u == c))
            .map(str::to_string)
            .collect();

        let mut builder = BudgetProblem::builder(total_budget)
            .user_categories(users)
            .extra_categories(extras)
            .fallback_bounds(DEFAULT_FALLBACK_BOUNDS.0, DEFAULT_FALLBACK_BOUNDS.1)
            .fallback_average(DEFAULT_FALLBACK_AVERAGE);
        for (category, stats) in self.stats() {
            builder = builder
                .bounds(category.clone(), stats.min, stats.max)
                .average_price(category, stats.average);
        }
        builder
    }
}

impl FromIterator<Product> for Catalog {
    fn from_iter<I: IntoIterator<Item = Product>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for product in iter {
            catalog.push(product);
        }
        catalog
    }
}

pub mod prelude {
    pub use super::bundle::*;
    pub use super::{Catalog, CategoryStats, Product};
}
