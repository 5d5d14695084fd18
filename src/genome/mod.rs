//! Genome types
//!
//! This module provides the allocation genome and the per-category bounds it is
//! constrained by.

pub mod allocation;
pub mod bounds;

pub mod prelude {
    pub use super::allocation::*;
    pub use super::bounds::*;
}
