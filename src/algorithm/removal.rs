//! Copy-on-write deletion with condense-tree orphan handling.

use std::sync::Arc;

use crate::algorithm::insertion;
use crate::context::Context;
use crate::entry::Entry;
use crate::node::{Leaf, Node, NonLeaf};
use crate::rect::Rectangle;

pub(crate) struct Removal<T> {
    pub(crate) root: Option<Arc<Node<T>>>,
    pub(crate) removed: usize,
}

/// Removes entries equal to `entry` (value and exact geometry). With
/// `all` false the traversal stops after the first match. Returns
/// `None` when nothing matched; the caller then keeps the original
/// tree value.
pub(crate) fn remove<T: Clone + PartialEq>(
    root: &Arc<Node<T>>,
    entry: &Entry<T>,
    all: bool,
    context: &Context,
) -> Option<Removal<T>> {
    let target = entry.mbr();
    if !root.mbr().contains(&target) {
        return None;
    }

    let mut done = false;
    let (root, orphans, removed) =
        match remove_from(root, entry, &target, all, &mut done, true, context) {
            Outcome::Untouched => return None,
            Outcome::Rebuilt(node, orphans, removed) => (Some(collapse(node)), orphans, removed),
            Outcome::Dissolved(orphans, removed) => (None, orphans, removed),
        };

    // condense-tree: surviving entries of dissolved nodes re-enter at
    // the leaf level
    let mut root = root;
    for orphan in orphans {
        root = Some(insertion::insert(root, orphan, context));
    }
    Some(Removal { root, removed })
}

enum Outcome<T> {
    /// No match in this subtree; the caller keeps its handle.
    Untouched,
    /// The node survived; carries orphans from dissolved descendants
    /// and the number of entries removed.
    Rebuilt(Arc<Node<T>>, Vec<Entry<T>>, usize),
    /// The node fell below the minimum (or emptied) and dissolves; its
    /// surviving entries ride along as orphans.
    Dissolved(Vec<Entry<T>>, usize),
}

fn remove_from<T: Clone + PartialEq>(
    node: &Arc<Node<T>>,
    entry: &Entry<T>,
    target: &Rectangle,
    all: bool,
    done: &mut bool,
    at_root: bool,
    context: &Context,
) -> Outcome<T> {
    match node.as_ref() {
        Node::Leaf(leaf) => {
            let mut kept = Vec::with_capacity(leaf.count());
            let mut removed = 0;
            for candidate in leaf.entries() {
                if !*done && candidate == entry {
                    removed += 1;
                    if !all {
                        *done = true;
                    }
                } else {
                    kept.push(candidate.clone());
                }
            }
            if removed == 0 {
                Outcome::Untouched
            } else if kept.is_empty() {
                Outcome::Dissolved(Vec::new(), removed)
            } else if kept.len() < context.min_children() && !at_root {
                Outcome::Dissolved(kept, removed)
            } else {
                Outcome::Rebuilt(Arc::new(Node::Leaf(Leaf::new(kept))), Vec::new(), removed)
            }
        }
        Node::NonLeaf(non_leaf) => {
            let mut children = Vec::with_capacity(non_leaf.count());
            let mut orphans = Vec::new();
            let mut removed = 0;
            let mut changed = false;
            for child in non_leaf.children() {
                if *done || !child.mbr().contains(target) {
                    children.push(child.clone());
                    continue;
                }
                match remove_from(child, entry, target, all, done, false, context) {
                    Outcome::Untouched => children.push(child.clone()),
                    Outcome::Rebuilt(rebuilt, child_orphans, count) => {
                        children.push(rebuilt);
                        orphans.extend(child_orphans);
                        removed += count;
                        changed = true;
                    }
                    Outcome::Dissolved(child_orphans, count) => {
                        orphans.extend(child_orphans);
                        removed += count;
                        changed = true;
                    }
                }
            }
            if !changed {
                Outcome::Untouched
            } else if children.is_empty() {
                Outcome::Dissolved(orphans, removed)
            } else if children.len() < context.min_children() && !at_root {
                for child in &children {
                    child.collect_entries(&mut orphans);
                }
                Outcome::Dissolved(orphans, removed)
            } else {
                Outcome::Rebuilt(
                    Arc::new(Node::NonLeaf(NonLeaf::new(children))),
                    orphans,
                    removed,
                )
            }
        }
    }
}

/// A non-leaf root with a single child hands the root role to that
/// child.
fn collapse<T>(mut node: Arc<Node<T>>) -> Arc<Node<T>> {
    loop {
        let next = match node.as_ref() {
            Node::NonLeaf(non_leaf) if non_leaf.count() == 1 => non_leaf.children()[0].clone(),
            _ => return node,
        };
        node = next;
    }
}
