use std::fmt::Debug;

use crate::rect::Rectangle;

/// Chooses which child of an inner node an incoming bounding rectangle
/// descends into during insertion.
///
/// Selectors see only the children's MBRs; `leaf_children` tells them
/// whether those children are leaves, which the R* heuristic treats
/// differently from inner levels.
pub trait Selector: Debug + Send + Sync {
    /// Returns the index of the child to descend into.
    fn select(&self, children: &[&Rectangle], target: &Rectangle, leaf_children: bool) -> usize;
}

/// Guttman's rule: descend into the child whose volume grows the least
/// when enlarged to include the target, breaking ties by the smaller
/// current volume, then by position.
#[derive(Clone, Copy, Debug, Default)]
pub struct MinimalVolumeIncrease;

impl Selector for MinimalVolumeIncrease {
    fn select(&self, children: &[&Rectangle], target: &Rectangle, _leaf_children: bool) -> usize {
        minimal_volume_increase(children, target)
    }
}

/// The R* rule: at the level above the leaves, descend into the child
/// whose enlargement adds the least overlap with its siblings (overlap
/// dominates query cost there), breaking ties by volume enlargement and
/// then by current volume. Higher up, volume enlargement dominates and
/// the Guttman rule applies.
#[derive(Clone, Copy, Debug, Default)]
pub struct RStarSelector;

impl Selector for RStarSelector {
    fn select(&self, children: &[&Rectangle], target: &Rectangle, leaf_children: bool) -> usize {
        if !leaf_children {
            return minimal_volume_increase(children, target);
        }
        let mut best = (f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut best_index = 0;
        for (index, child) in children.iter().enumerate() {
            let enlarged = child.add(target);
            let mut overlap_increase = 0.0;
            for (other_index, other) in children.iter().enumerate() {
                if other_index != index {
                    overlap_increase +=
                        enlarged.intersection_volume(other) - child.intersection_volume(other);
                }
            }
            let volume = child.volume();
            let candidate = (overlap_increase, enlarged.volume() - volume, volume);
            if candidate < best {
                best = candidate;
                best_index = index;
            }
        }
        best_index
    }
}

fn minimal_volume_increase(children: &[&Rectangle], target: &Rectangle) -> usize {
    let mut best = (f64::INFINITY, f64::INFINITY);
    let mut best_index = 0;
    for (index, child) in children.iter().enumerate() {
        let volume = child.volume();
        let candidate = (child.add(target).volume() - volume, volume);
        if candidate < best {
            best = candidate;
            best_index = index;
        }
    }
    best_index
}
