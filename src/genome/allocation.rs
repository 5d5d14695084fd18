//! Budget allocation genome
//!
//! An [`Allocation`] is one candidate split of the total budget: a spend per
//! mandatory ("user") category and a spend per optional ("extra") category,
//! where an extra spend of `0.0` means the category is excluded.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A candidate budget allocation
///
/// Allocations are values: the public API only reads them, and every
/// operator in this crate builds a fresh allocation instead of editing one
/// that may still be shared by the population.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    user: BTreeMap<String, f64>,
    extra: BTreeMap<String, f64>,
}

impl Allocation {
    /// Create an allocation from its two category mappings
    pub fn new(user: BTreeMap<String, f64>, extra: BTreeMap<String, f64>) -> Self {
        Self { user, extra }
    }

    /// Create an allocation from `(category, amount)` pairs
    pub fn from_pairs<U, E, S>(user: U, extra: E) -> Self
    where
        U: IntoIterator<Item = (S, f64)>,
        E: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            user: user.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            extra: extra.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Mandatory category allocations
    pub fn user(&self) -> &BTreeMap<String, f64> {
        &self.user
    }

    /// Optional category allocations (0 = excluded)
    pub fn extra(&self) -> &BTreeMap<String, f64> {
        &self.extra
    }

    /// Allocation of a user category
    pub fn user_amount(&self, category: &str) -> Option<f64> {
        self.user.get(category).copied()
    }

    /// Allocation of an extra category
    pub fn extra_amount(&self, category: &str) -> Option<f64> {
        self.extra.get(category).copied()
    }

    /// Whether an extra category is included (non-zero allocation)
    pub fn is_included(&self, category: &str) -> bool {
        self.extra_amount(category).map_or(false, |v| v > 0.0)
    }

    /// Included extra categories with their allocations
    pub fn included_extras(&self) -> impl Iterator<Item = (&str, f64)> {
        self.extra
            .iter()
            .filter(|(_, &v)| v > 0.0)
            .map(|(k, &v)| (k.as_str(), v))
    }

    /// Sum of user allocations
    pub fn user_total(&self) -> f64 {
        self.user.values().sum()
    }

    /// Sum of extra allocations
    pub fn extra_total(&self) -> f64 {
        self.extra.values().sum()
    }

    /// Total spend of this allocation
    pub fn total(&self) -> f64 {
        self.user_total() + self.extra_total()
    }

    /// Iterate over every `(category, amount)`, user categories first
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.user
            .iter()
            .chain(self.extra.iter())
            .map(|(k, &v)| (k.as_str(), v))
    }

    /// Return a copy with a user category set to `amount`
    pub fn with_user(&self, category: impl Into<String>, amount: f64) -> Self {
        let mut next = self.clone();
        next.user.insert(category.into(), amount);
        next
    }

    /// Return a copy with an extra category set to `amount`
    pub fn with_extra(&self, category: impl Into<String>, amount: f64) -> Self {
        let mut next = self.clone();
        next.extra.insert(category.into(), amount);
        next
    }

    /// Euclidean distance over the union of categories (missing = 0)
    pub fn distance(&self, other: &Self) -> f64 {
        fn sq(a: &BTreeMap<String, f64>, b: &BTreeMap<String, f64>) -> f64 {
            let mut total = 0.0;
            for (k, &va) in a {
                let vb = b.get(k).copied().unwrap_or(0.0);
                total += (va - vb).powi(2);
            }
            for (k, &vb) in b {
                if !a.contains_key(k) {
                    total += vb * vb;
                }
            }
            total
        }
        (sq(&self.user, &other.user) + sq(&self.extra, &other.extra)).sqrt()
    }

    pub(crate) fn user_mut(&mut self) -> &mut BTreeMap<String, f64> {
        &mut self.user
    }

    pub(crate) fn extra_mut(&mut self) -> &mut BTreeMap<String, f64> {
        &mut self.extra
    }
}
