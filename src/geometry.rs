use crate::point::Point;
use crate::rect::{self, Rectangle};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The geometry of an entry: a point or an axis-aligned rectangle.
///
/// Geometries compare equal when their bounds are equal coordinate for
/// coordinate; a point equals the degenerate rectangle at the same
/// position. Equality is exact on the floating point values, not
/// approximate.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Geometry {
    Point(Point),
    Rectangle(Rectangle),
}

impl Geometry {
    /// Returns the number of dimensions.
    pub fn dimensions(&self) -> usize {
        match self {
            Geometry::Point(p) => p.dimensions(),
            Geometry::Rectangle(r) => r.dimensions(),
        }
    }

    /// Returns the lower bound in every dimension.
    pub fn mins(&self) -> &[f64] {
        match self {
            Geometry::Point(p) => p.mins(),
            Geometry::Rectangle(r) => r.mins(),
        }
    }

    /// Returns the upper bound in every dimension.
    pub fn maxes(&self) -> &[f64] {
        match self {
            Geometry::Point(p) => p.maxes(),
            Geometry::Rectangle(r) => r.maxes(),
        }
    }

    /// Returns the minimum bounding rectangle.
    pub fn mbr(&self) -> Rectangle {
        match self {
            Geometry::Point(p) => p.mbr(),
            Geometry::Rectangle(r) => r.clone(),
        }
    }

    /// Returns true if this geometry intersects `rect`.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn intersects(&self, rect: &Rectangle) -> bool {
        rect::intersect_slices(self.mins(), self.maxes(), rect.mins(), rect.maxes())
    }

    /// Returns the Euclidean distance from this geometry to `rect`,
    /// zero when they intersect.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn distance(&self, rect: &Rectangle) -> f64 {
        rect::distance_slices(self.mins(), self.maxes(), rect.mins(), rect.maxes())
    }

    /// Returns the volume of the bounds; zero for points.
    pub fn volume(&self) -> f64 {
        match self {
            Geometry::Point(p) => p.volume(),
            Geometry::Rectangle(r) => r.volume(),
        }
    }
}

impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.mins() == other.mins() && self.maxes() == other.maxes()
    }
}

impl From<Point> for Geometry {
    fn from(point: Point) -> Self {
        Geometry::Point(point)
    }
}

impl From<Rectangle> for Geometry {
    fn from(rect: Rectangle) -> Self {
        Geometry::Rectangle(rect)
    }
}
