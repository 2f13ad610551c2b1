use smallvec::SmallVec;

use crate::point::Coordinates;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A k-dimensional axis-aligned rectangle, defined by its lower and
/// upper corners.
///
/// Rectangles double as minimum bounding rectangles (MBRs) of tree
/// nodes. All binary operations require both operands to have the same
/// number of dimensions; mixing dimensions is a caller bug and panics.
///
/// # Example
/// ```
/// use persistent_rtree::Rectangle;
///
/// let a = Rectangle::new(&[0.0, 0.0], &[2.0, 1.0]);
/// let b = Rectangle::new(&[1.0, 0.5], &[3.0, 2.0]);
/// assert!(a.intersects(&b));
/// assert_eq!(a.add(&b).maxes(), &[3.0, 2.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rectangle {
    mins: Coordinates,
    maxes: Coordinates,
}

impl Rectangle {
    /// Creates a rectangle from its lower and upper corners.
    ///
    /// # Panics
    /// Panics if the corners are empty, have different dimension
    /// counts, or if any lower coordinate exceeds its upper coordinate.
    pub fn new(mins: &[f64], maxes: &[f64]) -> Self {
        Self::from_corners(SmallVec::from_slice(mins), SmallVec::from_slice(maxes))
    }

    pub(crate) fn from_corners(mins: Coordinates, maxes: Coordinates) -> Self {
        assert!(!mins.is_empty(), "a rectangle needs at least one dimension");
        assert_eq!(
            mins.len(),
            maxes.len(),
            "corner dimension counts differ: {} vs {}",
            mins.len(),
            maxes.len()
        );
        for (lo, hi) in mins.iter().zip(maxes.iter()) {
            assert!(lo <= hi, "lower corner {:?} exceeds upper corner {:?}", mins, maxes);
        }
        Rectangle { mins, maxes }
    }

    /// Returns the number of dimensions.
    pub fn dimensions(&self) -> usize {
        self.mins.len()
    }

    /// Returns the lower corner.
    pub fn mins(&self) -> &[f64] {
        &self.mins
    }

    /// Returns the upper corner.
    pub fn maxes(&self) -> &[f64] {
        &self.maxes
    }

    /// Returns the lower bound along `axis`.
    pub fn min(&self, axis: usize) -> f64 {
        self.mins[axis]
    }

    /// Returns the upper bound along `axis`.
    pub fn max(&self, axis: usize) -> f64 {
        self.maxes[axis]
    }

    /// A rectangle is its own minimum bounding rectangle.
    pub fn mbr(&self) -> Rectangle {
        self.clone()
    }

    /// Returns true if the two rectangles share at least one point.
    /// Touching borders count as intersecting.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        intersect_slices(self.mins(), self.maxes(), other.mins(), other.maxes())
    }

    /// Returns the Euclidean distance between the closest points of the
    /// two rectangles, zero if they intersect.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn distance(&self, other: &Rectangle) -> f64 {
        distance_slices(self.mins(), self.maxes(), other.mins(), other.maxes())
    }

    /// Returns the volume, the product of the side lengths. Zero for
    /// degenerate rectangles. Only meaningful for relative comparison.
    pub fn volume(&self) -> f64 {
        self.mins
            .iter()
            .zip(self.maxes.iter())
            .map(|(lo, hi)| hi - lo)
            .product()
    }

    /// Returns the smallest rectangle containing both operands.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn add(&self, other: &Rectangle) -> Rectangle {
        assert_dimensions(self.dimensions(), other.dimensions());
        let mins = self
            .mins
            .iter()
            .zip(other.mins.iter())
            .map(|(a, b)| a.min(*b))
            .collect();
        let maxes = self
            .maxes
            .iter()
            .zip(other.maxes.iter())
            .map(|(a, b)| a.max(*b))
            .collect();
        Rectangle { mins, maxes }
    }

    /// Returns true if `other` lies entirely within this rectangle.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn contains(&self, other: &Rectangle) -> bool {
        assert_dimensions(self.dimensions(), other.dimensions());
        self.mins
            .iter()
            .zip(other.mins.iter())
            .all(|(a, b)| a <= b)
            && self
                .maxes
                .iter()
                .zip(other.maxes.iter())
                .all(|(a, b)| a >= b)
    }

    /// Returns a value proportional to the surface: the sum of the side
    /// lengths.
    pub fn perimeter(&self) -> f64 {
        self.mins
            .iter()
            .zip(self.maxes.iter())
            .map(|(lo, hi)| hi - lo)
            .sum()
    }

    /// Returns the volume of the intersection of the two rectangles,
    /// zero if they are disjoint.
    ///
    /// # Panics
    /// Panics if the dimension counts differ.
    pub fn intersection_volume(&self, other: &Rectangle) -> f64 {
        assert_dimensions(self.dimensions(), other.dimensions());
        let mut volume = 1.0;
        for i in 0..self.dimensions() {
            let side = self.maxes[i].min(other.maxes[i]) - self.mins[i].max(other.mins[i]);
            if side <= 0.0 {
                return 0.0;
            }
            volume *= side;
        }
        volume
    }

    /// Returns the midpoint along `axis`.
    pub(crate) fn center_along(&self, axis: usize) -> f64 {
        (self.mins[axis] + self.maxes[axis]) / 2.0
    }

    /// Returns the squared Euclidean distance between the centers of
    /// the two rectangles.
    pub(crate) fn center_distance_2(&self, other: &Rectangle) -> f64 {
        assert_dimensions(self.dimensions(), other.dimensions());
        (0..self.dimensions())
            .map(|i| {
                let delta = self.center_along(i) - other.center_along(i);
                delta * delta
            })
            .sum()
    }
}

fn assert_dimensions(a: usize, b: usize) {
    assert_eq!(a, b, "dimension counts differ: {} vs {}", a, b);
}

pub(crate) fn intersect_slices(
    a_mins: &[f64],
    a_maxes: &[f64],
    b_mins: &[f64],
    b_maxes: &[f64],
) -> bool {
    assert_dimensions(a_mins.len(), b_mins.len());
    a_mins
        .iter()
        .zip(b_maxes.iter())
        .all(|(lo, hi)| lo <= hi)
        && a_maxes
            .iter()
            .zip(b_mins.iter())
            .all(|(hi, lo)| hi >= lo)
}

pub(crate) fn distance_slices(
    a_mins: &[f64],
    a_maxes: &[f64],
    b_mins: &[f64],
    b_maxes: &[f64],
) -> f64 {
    assert_dimensions(a_mins.len(), b_mins.len());
    let mut sum = 0.0;
    for i in 0..a_mins.len() {
        let gap = (b_mins[i] - a_maxes[i]).max(a_mins[i] - b_maxes[i]).max(0.0);
        sum += gap * gap;
    }
    sum.sqrt()
}

#[cfg(test)]
mod test {
    use super::Rectangle;
    use approx::assert_abs_diff_eq;

    #[test]
    fn intersection_includes_touching_borders() {
        let a = Rectangle::new(&[0.0, 0.0], &[1.0, 1.0]);
        let b = Rectangle::new(&[1.0, 0.0], &[2.0, 1.0]);
        let c = Rectangle::new(&[1.5, 0.0], &[2.0, 1.0]);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn distance_is_zero_when_intersecting() {
        let a = Rectangle::new(&[0.0, 0.0], &[2.0, 2.0]);
        let b = Rectangle::new(&[1.0, 1.0], &[3.0, 3.0]);
        assert_eq!(a.distance(&b), 0.0);
    }

    #[test]
    fn distance_is_euclidean_over_axial_gaps() {
        let a = Rectangle::new(&[0.0, 0.0], &[1.0, 1.0]);
        let b = Rectangle::new(&[4.0, 5.0], &[6.0, 7.0]);
        // gaps of 3 and 4
        assert_abs_diff_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn union_and_volume() {
        let a = Rectangle::new(&[0.0, 0.0], &[1.0, 2.0]);
        let b = Rectangle::new(&[3.0, -1.0], &[4.0, 0.5]);
        let u = a.add(&b);
        assert_eq!(u.mins(), &[0.0, -1.0]);
        assert_eq!(u.maxes(), &[4.0, 2.0]);
        assert_abs_diff_eq!(u.volume(), 12.0);
        assert_abs_diff_eq!(a.volume(), 2.0);
    }

    #[test]
    fn containment() {
        let outer = Rectangle::new(&[0.0, 0.0], &[10.0, 10.0]);
        let inner = Rectangle::new(&[2.0, 2.0], &[3.0, 3.0]);
        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn perimeter_sums_side_lengths() {
        let r = Rectangle::new(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(r.perimeter(), 6.0);
    }

    #[test]
    fn intersection_volume_of_disjoint_is_zero() {
        let a = Rectangle::new(&[0.0, 0.0], &[1.0, 1.0]);
        let b = Rectangle::new(&[2.0, 2.0], &[3.0, 3.0]);
        let c = Rectangle::new(&[0.5, 0.5], &[1.5, 1.5]);
        assert_eq!(a.intersection_volume(&b), 0.0);
        assert_abs_diff_eq!(a.intersection_volume(&c), 0.25);
    }

    #[test]
    fn center_distance() {
        let a = Rectangle::new(&[0.0, 0.0], &[2.0, 2.0]);
        let b = Rectangle::new(&[3.0, 1.0], &[5.0, 3.0]);
        assert_abs_diff_eq!(a.center_distance_2(&b), 10.0);
    }

    #[test]
    #[should_panic]
    fn mismatched_dimensions_are_fatal() {
        let a = Rectangle::new(&[0.0, 0.0], &[1.0, 1.0]);
        let b = Rectangle::new(&[0.0, 0.0, 0.0], &[1.0, 1.0, 1.0]);
        a.intersects(&b);
    }

    #[test]
    #[should_panic]
    fn inverted_corners_are_rejected() {
        Rectangle::new(&[1.0, 0.0], &[0.0, 1.0]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        let r = Rectangle::new(&[0.0, -1.5], &[2.0, 4.0]);
        let json = serde_json::to_string(&r).unwrap();
        let back: Rectangle = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
