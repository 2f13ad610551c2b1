//! A persistent (copy-on-write) r-tree over k-dimensional points and
//! rectangles, with pluggable Guttman and R* heuristics and
//! Sort-Tile-Recursive bulk loading.
//!
//! Every mutation returns a new [RTree] value; the previous value
//! remains valid and shares all untouched subtrees with the new one.
//! See the [RTree] documentation for an overview and examples.

mod context;
mod entry;
mod geometry;
mod node;
mod point;
mod rect;
mod rtree;
mod selector;
mod splitter;
mod visitor;

mod algorithm;

#[cfg(test)]
mod test_utilities;

pub use crate::algorithm::iterators::{
    EntriesIterator, IntersectionIterator, SearchIterator, WithinIterator,
};
pub use crate::algorithm::selection_functions::{
    Everything, IntersectsRect, SearchPredicate, WithinDistance,
};
pub use crate::context::Context;
pub use crate::entry::Entry;
pub use crate::geometry::Geometry;
pub use crate::node::{Leaf, Node, NonLeaf};
pub use crate::point::Point;
pub use crate::rect::Rectangle;
pub use crate::rtree::{Builder, RTree};
pub use crate::selector::{MinimalVolumeIncrease, RStarSelector, Selector};
pub use crate::splitter::{QuadraticSplitter, RStarSplitter, Splitter};
pub use crate::visitor::Visitor;
