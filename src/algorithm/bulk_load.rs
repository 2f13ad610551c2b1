//! Sort-Tile-Recursive bulk loading.
//!
//! Entries are sorted by their axis-0 midpoint, cut into vertical
//! slices, sorted within each slice by the axis-1 midpoint and packed
//! into leaves; the produced nodes are tiled the same way, level by
//! level, until a single root remains. Axes beyond the first two are
//! never sort keys.

use std::sync::Arc;

use crate::context::Context;
use crate::entry::Entry;
use crate::node::{Leaf, Node, NonLeaf};

/// Builds a tree over `entries` bottom-up. Returns `None` for an empty
/// input.
pub(crate) fn load<T>(context: &Context, entries: Vec<Entry<T>>) -> Option<Arc<Node<T>>> {
    if entries.is_empty() {
        return None;
    }

    let mut level: Vec<Arc<Node<T>>> = tile(
        entries,
        context.leaf_capacity(),
        context.min_children(),
        |entry, axis| {
            let geometry = entry.geometry();
            (geometry.mins()[axis] + geometry.maxes()[axis]) / 2.0
        },
    )
    .into_iter()
    .map(|group| Arc::new(Node::Leaf(Leaf::new(group))))
    .collect();

    while level.len() > 1 {
        level = tile(
            level,
            context.max_children(),
            context.min_children(),
            |node, axis| node.mbr().center_along(axis),
        )
        .into_iter()
        .map(|group| Arc::new(Node::NonLeaf(NonLeaf::new(group))))
        .collect();
    }
    level.pop()
}

/// One STR round: sorts `items` by axis-0 midpoint, cuts them into
/// `⌈√nodeCount⌉` consecutive slices, sorts each slice by axis-1
/// midpoint and cuts it into groups of roughly `capacity` items.
/// Slice and group boundaries are evened out only as far as needed to
/// keep every group at `min_children` or above.
fn tile<I, F>(mut items: Vec<I>, capacity: usize, min_children: usize, center: F) -> Vec<Vec<I>>
where
    F: Fn(&I, usize) -> f64,
{
    let count = items.len();
    if count <= capacity {
        return vec![items];
    }

    let node_count = div_up(count, capacity);
    let slice_count = (node_count as f64).sqrt().ceil() as usize;
    let slice_size = slice_count * capacity;

    items.sort_by(|a, b| center(a, 0).partial_cmp(&center(b, 0)).unwrap());

    let mut groups = Vec::with_capacity(node_count);
    let mut items = items.into_iter();
    for slice_len in group_sizes(count, slice_size, min_children) {
        let mut slice: Vec<I> = items.by_ref().take(slice_len).collect();
        slice.sort_by(|a, b| center(a, 1).partial_cmp(&center(b, 1)).unwrap());
        let sizes = group_sizes(slice.len(), capacity, min_children);
        let mut slice = slice.into_iter();
        for size in sizes {
            groups.push(slice.by_ref().take(size).collect());
        }
    }
    groups
}

/// Cuts `count` items into runs of at most `capacity`, handing items
/// from earlier runs to later ones just enough that none falls below
/// `min_children`.
fn group_sizes(count: usize, capacity: usize, min_children: usize) -> Vec<usize> {
    let mut groups = div_up(count, capacity);
    while groups > 1 && count / groups < min_children {
        groups -= 1;
    }
    let base = count / groups;
    let extra = count % groups;
    (0..groups)
        .map(|group| if group < extra { base + 1 } else { base })
        .collect()
}

fn div_up(a: usize, b: usize) -> usize {
    (a + b - 1) / b
}
