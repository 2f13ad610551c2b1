use smallvec::SmallVec;

use crate::rect::{self, Rectangle};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Coordinate storage. Trees of up to four dimensions keep their
/// coordinates inline.
pub(crate) type Coordinates = SmallVec<[f64; 4]>;

/// A point in k-dimensional Euclidean space.
///
/// A point is the degenerate rectangle whose lower and upper corners
/// coincide; its [mbr](Point::mbr) has zero volume.
///
/// # Example
/// ```
/// use persistent_rtree::Point;
///
/// let p = Point::new(&[29.0, 4.0]);
/// assert_eq!(p.dimensions(), 2);
/// assert_eq!(p.mbr().mins(), &[29.0, 4.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    coordinates: Coordinates,
}

impl Point {
    /// Creates a point from its coordinates.
    ///
    /// # Panics
    /// Panics if no coordinates are given.
    pub fn new(coordinates: &[f64]) -> Self {
        assert!(!coordinates.is_empty(), "a point needs at least one coordinate");
        Point {
            coordinates: SmallVec::from_slice(coordinates),
        }
    }

    /// Returns the number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.coordinates.len()
    }

    /// Returns the coordinate vector.
    pub fn coordinates(&self) -> &[f64] {
        &self.coordinates
    }

    /// Returns the lower bound in every dimension, which for a point is
    /// the coordinate vector itself.
    pub fn mins(&self) -> &[f64] {
        &self.coordinates
    }

    /// Returns the upper bound in every dimension, which for a point is
    /// the coordinate vector itself.
    pub fn maxes(&self) -> &[f64] {
        &self.coordinates
    }

    /// Returns the coordinate along `axis`.
    pub fn min(&self, axis: usize) -> f64 {
        self.coordinates[axis]
    }

    /// Returns the coordinate along `axis`.
    pub fn max(&self, axis: usize) -> f64 {
        self.coordinates[axis]
    }

    /// Returns the minimum bounding rectangle: the degenerate rectangle
    /// at this point.
    pub fn mbr(&self) -> Rectangle {
        Rectangle::from_corners(self.coordinates.clone(), self.coordinates.clone())
    }

    /// Returns true if this point lies within `rect` (touching borders
    /// included).
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn intersects(&self, rect: &Rectangle) -> bool {
        rect::intersect_slices(self.mins(), self.maxes(), rect.mins(), rect.maxes())
    }

    /// Returns the Euclidean distance from this point to `rect`, zero
    /// if the point lies within it.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn distance(&self, rect: &Rectangle) -> f64 {
        rect::distance_slices(self.mins(), self.maxes(), rect.mins(), rect.maxes())
    }

    /// A point has no extent.
    pub fn volume(&self) -> f64 {
        0.0
    }

    /// Returns the smallest rectangle containing this point and `rect`.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn add(&self, rect: &Rectangle) -> Rectangle {
        self.mbr().add(rect)
    }
}
