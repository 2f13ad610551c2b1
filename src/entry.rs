use crate::geometry::Geometry;
use crate::point::Point;
use crate::rect::Rectangle;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A value paired with the geometry it is indexed under.
///
/// The value is opaque to the tree; its equality is consulted only by
/// [delete](crate::RTree::delete), which matches on value and exact
/// geometry coordinates.
///
/// # Example
/// ```
/// use persistent_rtree::Entry;
///
/// let entry = Entry::point("museum", &[29.0, 4.0]);
/// assert_eq!(*entry.value(), "museum");
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry<T> {
    value: T,
    geometry: Geometry,
}

impl<T> Entry<T> {
    /// Creates an entry from a value and any geometry.
    pub fn new(value: T, geometry: impl Into<Geometry>) -> Self {
        Entry {
            value,
            geometry: geometry.into(),
        }
    }

    /// Creates an entry located at a point.
    ///
    /// # Panics
    /// Panics if no coordinates are given.
    pub fn point(value: T, coordinates: &[f64]) -> Self {
        Entry::new(value, Point::new(coordinates))
    }

    /// Creates an entry covering a rectangle.
    ///
    /// # Panics
    /// Panics if the corners are invalid (see [Rectangle::new]).
    pub fn rect(value: T, mins: &[f64], maxes: &[f64]) -> Self {
        Entry::new(value, Rectangle::new(mins, maxes))
    }

    /// Returns the value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Returns the geometry.
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Returns the geometry's number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.geometry.dimensions()
    }

    /// Returns the geometry's minimum bounding rectangle.
    pub fn mbr(&self) -> Rectangle {
        self.geometry.mbr()
    }
}
