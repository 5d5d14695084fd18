//! Bundle assembly
//!
//! Turns ranked allocations into concrete product bundles. For every
//! category with a positive allocation one product priced between the
//! category's minimum bound and the allocation is drawn at random. Products
//! already placed in an earlier bundle are avoided, and the filters are
//! relaxed step by step when nothing matches.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, Product};
use crate::genome::allocation::Allocation;
use crate::problem::BudgetProblem;

/// Filters that were still active when a product was picked
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchLevel {
    /// Preferred color and not used by any earlier pick
    Exact,
    /// Preferred color, possibly already used
    Reused,
    /// Any color, possibly already used
    AnyColor,
}

/// A picked product and the allocation it was picked for
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BundleItem {
    /// Category the product fills
    pub category: String,
    /// The chosen product
    pub product: Product,
    /// Allocation the product had to fit in
    pub allocation: f64,
    /// How far the filters had to be relaxed
    pub match_level: MatchLevel,
}

/// Products for one allocation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bundle {
    /// Picks for mandatory categories
    pub user: Vec<BundleItem>,
    /// Picks for optional categories
    pub extra: Vec<BundleItem>,
}

impl Bundle {
    /// Every pick, mandatory categories first
    pub fn items(&self) -> impl Iterator<Item = &BundleItem> {
        self.user.iter().chain(self.extra.iter())
    }

    /// Number of picked products
    pub fn len(&self) -> usize {
        self.user.len() + self.extra.len()
    }

    /// Whether no product was picked
    pub fn is_empty(&self) -> bool {
        self.user.is_empty() && self.extra.is_empty()
    }

    /// Sum of the picked products' prices
    pub fn total_price(&self) -> f64 {
        self.items().map(|item| item.product.price).sum()
    }
}

/// Assembles bundles while remembering which products were already used
#[derive(Clone, Debug)]
pub struct BundleAssembler<'a> {
    catalog: &'a Catalog,
    problem: &'a BudgetProblem,
    color_preferences: BTreeMap<String, Vec<String>>,
    used: BTreeSet<String>,
}

impl<'a> BundleAssembler<'a> {
    /// Create an assembler for a catalog and the problem it solved
    pub fn new(catalog: &'a Catalog, problem: &'a BudgetProblem) -> Self {
        Self {
            catalog,
            problem,
            color_preferences: BTreeMap::new(),
            used: BTreeSet::new(),
        }
    }

    /// Restrict a mandatory category to the given colors
    pub fn with_colors<I, S>(mut self, category: impl Into<String>, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.color_preferences
            .insert(category.into(), colors.into_iter().map(Into::into).collect());
        self
    }

    /// Names of products placed so far
    pub fn used_products(&self) -> &BTreeSet<String> {
        &self.used
    }

    /// Build a bundle for one allocation
    pub fn assemble<R: Rng>(&mut self, allocation: &Allocation, rng: &mut R) -> Bundle {
        let problem = self.problem;
        let mut bundle = Bundle::default();

        for category in problem.user_categories() {
            let amount = allocation.user_amount(category).unwrap_or(0.0);
            let colors = self.color_preferences.get(category).cloned();
            if let Some(item) = self.pick(category, amount, colors.as_deref(), rng) {
                bundle.user.push(item);
            }
        }
        for category in problem.extra_categories() {
            let amount = allocation.extra_amount(category).unwrap_or(0.0);
            if let Some(item) = self.pick(category, amount, None, rng) {
                bundle.extra.push(item);
            }
        }

        bundle
    }

    /// Build bundles for ranked allocations, sharing the used-product set
    pub fn assemble_all<'b, I, R>(&mut self, allocations: I, rng: &mut R) -> Vec<Bundle>
    where
        I: IntoIterator<Item = &'b Allocation>,
        R: Rng,
    {
        allocations
            .into_iter()
            .map(|allocation| self.assemble(allocation, rng))
            .collect()
    }

    fn pick<R: Rng>(
        &mut self,
        category: &str,
        amount: f64,
        colors: Option<&[String]>,
        rng: &mut R,
    ) -> Option<BundleItem> {
        if amount <= 0.0 {
            return None;
        }
        let min_price = self.problem.bounds_of(category).map_or(0.0, |b| b.min);
        let window: Vec<&Product> = self
            .catalog
            .in_category(category)
            .filter(|p| p.price >= min_price && p.price <= amount)
            .collect();

        let color_ok = |p: &Product| match colors {
            Some(colors) => p.color.as_ref().map_or(false, |c| colors.contains(c)),
            None => true,
        };

        let levels = [MatchLevel::Exact, MatchLevel::Reused, MatchLevel::AnyColor];
        for level in levels {
            let candidates: Vec<&Product> = window
                .iter()
                .copied()
                .filter(|p| match level {
                    MatchLevel::Exact => color_ok(*p) && !self.used.contains(&p.name),
                    MatchLevel::Reused => color_ok(*p),
                    MatchLevel::AnyColor => true,
                })
                .collect();
            if let Some(product) = candidates.choose(rng) {
                let product = (*product).clone();
                debug!(category, product = %product.name, ?level, "picked product");
                self.used.insert(product.name.clone());
                return Some(BundleItem {
                    category: category.to_string(),
                    product,
                    allocation: amount,
                    match_level: level,
                });
            }
        }

        debug!(category, amount, "no product fits the allocation");
        None
    }
}
