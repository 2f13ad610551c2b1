use std::sync::Arc;

use crate::selector::Selector;
use crate::splitter::Splitter;

/// The immutable configuration threaded through every tree operation.
///
/// A context is assembled by the [builder](crate::RTree::builder) and
/// shared by reference between all tree values derived from one
/// another; it is never mutated.
#[derive(Clone, Debug)]
pub struct Context {
    dimensions: usize,
    min_children: usize,
    max_children: usize,
    loading_factor: f64,
    selector: Arc<dyn Selector>,
    splitter: Arc<dyn Splitter>,
}

impl Context {
    /// Validates and assembles a configuration.
    ///
    /// # Panics
    /// Panics unless `dimensions >= 2`, `2 <= min_children`,
    /// `min_children < max_children`,
    /// `min_children <= (max_children + 1) / 2` (every population must
    /// admit a partition into nodes within the capacity bounds), and
    /// `0 < loading_factor <= 1`.
    pub(crate) fn new(
        dimensions: usize,
        min_children: usize,
        max_children: usize,
        loading_factor: f64,
        selector: Arc<dyn Selector>,
        splitter: Arc<dyn Splitter>,
    ) -> Self {
        assert!(dimensions >= 2, "dimensions must be at least 2, got {}", dimensions);
        assert!(
            min_children >= 2,
            "min_children must be at least 2, got {}",
            min_children
        );
        assert!(
            max_children > min_children,
            "max_children ({}) must exceed min_children ({})",
            max_children,
            min_children
        );
        let max_min_children = (max_children + 1) / 2;
        assert!(
            min_children <= max_min_children,
            "min_children ({}) too large, must be at most {}",
            min_children,
            max_min_children
        );
        assert!(
            loading_factor > 0.0 && loading_factor <= 1.0,
            "loading_factor must be in (0, 1], got {}",
            loading_factor
        );
        Context {
            dimensions,
            min_children,
            max_children,
            loading_factor,
            selector,
            splitter,
        }
    }

    /// Returns the dimensionality every entry must match.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns the minimum number of children of a non-root node.
    pub fn min_children(&self) -> usize {
        self.min_children
    }

    /// Returns the maximum number of children of any node.
    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Returns the bulk-loading fill factor.
    pub fn loading_factor(&self) -> f64 {
        self.loading_factor
    }

    /// Returns the path-choice heuristic.
    pub fn selector(&self) -> &dyn Selector {
        &*self.selector
    }

    /// Returns the node-splitting heuristic.
    pub fn splitter(&self) -> &dyn Splitter {
        &*self.splitter
    }

    /// Target number of entries per leaf during bulk loading, clamped
    /// so loaded leaves stay within the capacity bounds.
    pub(crate) fn leaf_capacity(&self) -> usize {
        let target = (self.max_children as f64 * self.loading_factor).round() as usize;
        target.clamp(self.min_children, self.max_children)
    }

    /// Number of items the splitter wants reinserted on a fresh
    /// overflow; zero disables forced reinsertion.
    pub(crate) fn reinsert_count(&self) -> usize {
        self.splitter.reinsert_count(self.max_children)
    }
}
