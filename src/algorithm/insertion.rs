//! Copy-on-write insertion: selector-guided descent, split
//! propagation, and R* forced reinsertion.

use std::sync::Arc;

use crate::context::Context;
use crate::entry::Entry;
use crate::node::{Leaf, Node, NonLeaf};
use crate::rect::Rectangle;

/// An item travelling back to the top of the tree during forced
/// reinsertion: a bare entry headed for the leaf level, or a whole
/// subtree that re-enters at its original height so all leaves stay at
/// equal depth.
enum Orphan<T> {
    Entry(Entry<T>),
    Subtree(Arc<Node<T>>),
}

impl<T> Orphan<T> {
    fn bounds(&self) -> Rectangle {
        match self {
            Orphan::Entry(entry) => entry.mbr(),
            Orphan::Subtree(node) => node.mbr().clone(),
        }
    }

    /// Height of the node this item becomes a child of.
    fn target_height(&self) -> usize {
        match self {
            Orphan::Entry(_) => 1,
            Orphan::Subtree(node) => node.height() + 1,
        }
    }
}

enum Outcome<T> {
    One(Arc<Node<T>>),
    Two(Arc<Node<T>>, Arc<Node<T>>),
    Reinsert(Arc<Node<T>>, Vec<Orphan<T>>),
}

/// Inserts `entry`, returning the new root. The previous root is left
/// untouched; every node off the descent path is shared with it.
pub(crate) fn insert<T: Clone>(
    root: Option<Arc<Node<T>>>,
    entry: Entry<T>,
    context: &Context,
) -> Arc<Node<T>> {
    let mut root = match root {
        None => return Arc::new(Node::Leaf(Leaf::new(vec![entry]))),
        Some(root) => root,
    };

    // one bit per level, set once that level has reinserted during
    // this insertion; local to the call, never shared
    let mut reinserted_levels = 0u64;
    let mut pending = vec![Orphan::Entry(entry)];
    while let Some(orphan) = pending.pop() {
        let height = root.height();
        debug_assert!(orphan.target_height() <= height);
        root = match descend(&root, orphan, height, true, context, &mut reinserted_levels) {
            Outcome::One(node) => node,
            Outcome::Two(first, second) => {
                Arc::new(Node::NonLeaf(NonLeaf::new(vec![first, second])))
            }
            Outcome::Reinsert(node, orphans) => {
                pending.extend(orphans);
                node
            }
        };
    }
    root
}

fn descend<T: Clone>(
    node: &Arc<Node<T>>,
    orphan: Orphan<T>,
    height: usize,
    at_root: bool,
    context: &Context,
    reinserted_levels: &mut u64,
) -> Outcome<T> {
    if height == orphan.target_height() {
        return attach(node, orphan, height, at_root, context, reinserted_levels);
    }

    let non_leaf = match node.as_ref() {
        Node::NonLeaf(non_leaf) => non_leaf,
        Node::Leaf(_) => unreachable!("descent ended above the target level"),
    };

    let bounds = orphan.bounds();
    let child_mbrs: Vec<&Rectangle> =
        non_leaf.children().iter().map(|child| child.mbr()).collect();
    let chosen = context
        .selector()
        .select(&child_mbrs, &bounds, height == 2);

    let mut children = non_leaf.children().to_vec();
    match descend(
        &children[chosen],
        orphan,
        height - 1,
        false,
        context,
        reinserted_levels,
    ) {
        Outcome::One(child) => {
            children[chosen] = child;
            Outcome::One(Arc::new(Node::NonLeaf(NonLeaf::new(children))))
        }
        Outcome::Two(first, second) => {
            children[chosen] = first;
            children.push(second);
            if children.len() <= context.max_children() {
                Outcome::One(Arc::new(Node::NonLeaf(NonLeaf::new(children))))
            } else {
                resolve_overflow(children, height, at_root, context, reinserted_levels)
            }
        }
        Outcome::Reinsert(child, orphans) => {
            children[chosen] = child;
            Outcome::Reinsert(Arc::new(Node::NonLeaf(NonLeaf::new(children))), orphans)
        }
    }
}

fn attach<T: Clone>(
    node: &Arc<Node<T>>,
    orphan: Orphan<T>,
    height: usize,
    at_root: bool,
    context: &Context,
    reinserted_levels: &mut u64,
) -> Outcome<T> {
    match (node.as_ref(), orphan) {
        (Node::Leaf(leaf), Orphan::Entry(entry)) => {
            let mut entries = leaf.entries().to_vec();
            entries.push(entry);
            if entries.len() <= context.max_children() {
                Outcome::One(Arc::new(Node::Leaf(Leaf::new(entries))))
            } else {
                resolve_overflow(entries, height, at_root, context, reinserted_levels)
            }
        }
        (Node::NonLeaf(non_leaf), Orphan::Subtree(subtree)) => {
            let mut children = non_leaf.children().to_vec();
            children.push(subtree);
            if children.len() <= context.max_children() {
                Outcome::One(Arc::new(Node::NonLeaf(NonLeaf::new(children))))
            } else {
                resolve_overflow(children, height, at_root, context, reinserted_levels)
            }
        }
        _ => unreachable!("orphan arrived at a node of the wrong kind"),
    }
}

/// An overflowed run of a node's contents: leaf entries or child
/// nodes. The splitter and the reinsertion policy only see bounds.
trait OverflowItem<T>: Sized {
    fn bounds(&self) -> Rectangle;
    fn assemble(items: Vec<Self>) -> Node<T>;
    fn into_orphan(self) -> Orphan<T>;
}

impl<T> OverflowItem<T> for Entry<T> {
    fn bounds(&self) -> Rectangle {
        self.mbr()
    }

    fn assemble(items: Vec<Self>) -> Node<T> {
        Node::Leaf(Leaf::new(items))
    }

    fn into_orphan(self) -> Orphan<T> {
        Orphan::Entry(self)
    }
}

impl<T> OverflowItem<T> for Arc<Node<T>> {
    fn bounds(&self) -> Rectangle {
        self.mbr().clone()
    }

    fn assemble(items: Vec<Self>) -> Node<T> {
        Node::NonLeaf(NonLeaf::new(items))
    }

    fn into_orphan(self) -> Orphan<T> {
        Orphan::Subtree(self)
    }
}

fn resolve_overflow<T, I: OverflowItem<T>>(
    items: Vec<I>,
    height: usize,
    at_root: bool,
    context: &Context,
    reinserted_levels: &mut u64,
) -> Outcome<T> {
    let level_bit = 1u64 << (height - 1).min(63);
    let reinsert_count = context.reinsert_count();
    if !at_root && reinsert_count > 0 && *reinserted_levels & level_bit == 0 {
        *reinserted_levels |= level_bit;
        reinsert_farthest(items, reinsert_count)
    } else {
        split(items, context)
    }
}

/// Removes the items whose centers lie farthest from the overflowed
/// node's center and sends them back to the top of the tree.
fn reinsert_farthest<T, I: OverflowItem<T>>(items: Vec<I>, count: usize) -> Outcome<T> {
    let bounds: Vec<Rectangle> = items.iter().map(I::bounds).collect();
    let mut whole = bounds[0].clone();
    for mbr in &bounds[1..] {
        whole = whole.add(mbr);
    }

    let mut ranked: Vec<(f64, I)> = bounds
        .iter()
        .map(|mbr| mbr.center_distance_2(&whole))
        .zip(items)
        .collect();
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    let orphans = ranked
        .split_off(ranked.len() - count)
        .into_iter()
        .map(|(_, item)| item.into_orphan())
        .collect();
    let kept = ranked.into_iter().map(|(_, item)| item).collect();
    Outcome::Reinsert(Arc::new(I::assemble(kept)), orphans)
}

fn split<T, I: OverflowItem<T>>(items: Vec<I>, context: &Context) -> Outcome<T> {
    let bounds: Vec<Rectangle> = items.iter().map(I::bounds).collect();
    let (first, second) =
        context
            .splitter()
            .split(&bounds, context.min_children(), context.max_children());
    debug_assert!(first.len() >= context.min_children());
    debug_assert!(second.len() >= context.min_children());

    let mut slots: Vec<Option<I>> = items.into_iter().map(Some).collect();
    let first_items = take_indices(&mut slots, &first);
    let second_items = take_indices(&mut slots, &second);
    debug_assert!(slots.iter().all(Option::is_none), "splitter dropped an item");
    Outcome::Two(
        Arc::new(I::assemble(first_items)),
        Arc::new(I::assemble(second_items)),
    )
}

fn take_indices<I>(slots: &mut [Option<I>], indices: &[usize]) -> Vec<I> {
    indices
        .iter()
        .map(|&index| {
            slots[index]
                .take()
                .expect("splitter produced a duplicate index")
        })
        .collect()
}
