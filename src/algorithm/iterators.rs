use std::slice;

use crate::algorithm::selection_functions::{Everything, IntersectsRect, SearchPredicate, WithinDistance};
use crate::entry::Entry;
use crate::node::Node;

/// Iterator over every entry; returned by
/// [entries](crate::RTree::entries).
pub type EntriesIterator<'a, T> = SearchIterator<'a, T, Everything>;
/// Iterator over entries intersecting a rectangle; returned by
/// [search](crate::RTree::search).
pub type IntersectionIterator<'a, T> = SearchIterator<'a, T, IntersectsRect>;
/// Iterator over entries within a distance of a rectangle; returned by
/// [search_within](crate::RTree::search_within).
pub type WithinIterator<'a, T> = SearchIterator<'a, T, WithinDistance>;

/// A lazy, single-pass traversal yielding entries accepted by a
/// [SearchPredicate].
///
/// Subtrees whose MBR the predicate rejects are pruned wholesale. The
/// walk is depth-first and finite; dropping the iterator simply ends
/// it. Enumeration order is an implementation detail — callers must
/// not rely on it.
pub struct SearchIterator<'a, T, P>
where
    P: SearchPredicate,
{
    predicate: P,
    stack: Vec<Frame<'a, T>>,
}

enum Frame<'a, T> {
    Node(&'a Node<T>),
    Entries(slice::Iter<'a, Entry<T>>),
}

impl<'a, T, P> SearchIterator<'a, T, P>
where
    P: SearchPredicate,
{
    pub(crate) fn new(root: Option<&'a Node<T>>, predicate: P) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = root {
            if predicate.should_search(root.mbr()) {
                stack.push(Frame::Node(root));
            }
        }
        SearchIterator { predicate, stack }
    }
}

impl<'a, T, P> Iterator for SearchIterator<'a, T, P>
where
    P: SearchPredicate,
{
    type Item = &'a Entry<T>;

    fn next(&mut self) -> Option<&'a Entry<T>> {
        loop {
            match self.stack.last_mut() {
                None => return None,
                Some(Frame::Entries(entries)) => {
                    for entry in entries {
                        if self.predicate.matches(entry.geometry()) {
                            return Some(entry);
                        }
                    }
                    self.stack.pop();
                }
                Some(Frame::Node(_)) => {
                    let node = match self.stack.pop() {
                        Some(Frame::Node(node)) => node,
                        _ => unreachable!(),
                    };
                    match node {
                        Node::Leaf(leaf) => {
                            self.stack.push(Frame::Entries(leaf.entries().iter()));
                        }
                        Node::NonLeaf(non_leaf) => {
                            for child in non_leaf.children().iter().rev() {
                                if self.predicate.should_search(child.mbr()) {
                                    self.stack.push(Frame::Node(child.as_ref()));
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::SearchIterator;
    use crate::algorithm::bulk_load;
    use crate::algorithm::selection_functions::{Everything, IntersectsRect, WithinDistance};
    use crate::rect::Rectangle;
    use crate::test_utilities::{
        create_random_point_entries, create_random_rect_entries, guttman_context, SEED_1, SEED_2,
    };

    #[test]
    fn empty_tree_yields_nothing() {
        let iter: SearchIterator<usize, _> = SearchIterator::new(None, Everything);
        assert_eq!(iter.count(), 0);
    }

    #[test]
    fn search_agrees_with_a_linear_scan() {
        let context = guttman_context(2, 2, 4);
        let entries = create_random_rect_entries(400, SEED_1);
        let root = bulk_load::load(&context, entries.clone()).unwrap();

        for query in create_random_rect_entries(20, SEED_2) {
            let rect = query.mbr();
            let expected: Vec<_> = entries
                .iter()
                .filter(|entry| entry.geometry().intersects(&rect))
                .collect();
            let found: Vec<_> =
                SearchIterator::new(Some(root.as_ref()), IntersectsRect::new(rect.clone()))
                    .collect();
            assert_eq!(found.len(), expected.len());
            for entry in expected {
                assert!(found.contains(&entry));
            }
        }
    }

    #[test]
    fn within_distance_agrees_with_a_linear_scan() {
        let context = guttman_context(2, 2, 4);
        let entries = create_random_point_entries(300, 2, SEED_1);
        let root = bulk_load::load(&context, entries.clone()).unwrap();

        let origin = Rectangle::new(&[25.0, 25.0], &[25.0, 25.0]);
        let expected = entries
            .iter()
            .filter(|entry| entry.geometry().distance(&origin) < 20.0)
            .count();
        let found = SearchIterator::new(
            Some(root.as_ref()),
            WithinDistance::new(origin, 20.0),
        )
        .count();
        assert_eq!(found, expected);
    }

    #[test]
    fn everything_enumerates_each_entry_once() {
        let context = guttman_context(2, 2, 4);
        let entries = create_random_point_entries(250, 2, SEED_1);
        let root = bulk_load::load(&context, entries.clone()).unwrap();
        let mut seen: Vec<usize> = SearchIterator::new(Some(root.as_ref()), Everything)
            .map(|entry| *entry.value())
            .collect();
        seen.sort_unstable();
        let expected: Vec<usize> = (0..250).collect();
        assert_eq!(seen, expected);
    }
}
