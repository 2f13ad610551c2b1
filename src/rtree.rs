use std::sync::Arc;

use crate::algorithm::bulk_load;
use crate::algorithm::insertion;
use crate::algorithm::iterators::*;
use crate::algorithm::nearest_neighbor;
use crate::algorithm::removal;
use crate::algorithm::selection_functions::{
    Everything, IntersectsRect, SearchPredicate, WithinDistance,
};
use crate::context::Context;
use crate::entry::Entry;
use crate::node::Node;
use crate::rect::Rectangle;
use crate::selector::{MinimalVolumeIncrease, RStarSelector, Selector};
use crate::splitter::{QuadraticSplitter, RStarSplitter, Splitter};
use crate::visitor::{self, Visitor};

/// A persistent multi-dimensional r-tree.
///
/// # R-trees
/// An r-tree indexes points and axis-aligned rectangles in
/// k-dimensional Euclidean space (k ≥ 2) under a hierarchy of minimum
/// bounding rectangles, answering intersection, within-distance and
/// nearest-neighbour queries in roughly logarithmic time where a
/// linear scan would be `O(n)`.
///
/// # Persistence
/// Tree values are immutable. [add](RTree::add) and
/// [delete](RTree::delete) return a *new* tree sharing every untouched
/// subtree with the old one, which stays fully usable:
///
/// ```
/// use persistent_rtree::{Entry, RTree};
///
/// let empty: RTree<&str> = RTree::new();
/// let one = empty.add(Entry::point("a", &[29.0, 4.0]));
/// assert_eq!(empty.size(), 0);
/// assert_eq!(one.size(), 1);
/// ```
///
/// Because sharing is by reference count, cloning a tree value is
/// `O(1)` and any number of threads may read the same value
/// concurrently.
///
/// # Heuristics
/// Insertion descends along a pluggable [Selector] and resolves
/// overflow through a pluggable [Splitter](crate::Splitter). The
/// default is Guttman's classic pair (minimal volume increase,
/// quadratic split); [star](Builder::star) switches to the R*-tree
/// pair with forced reinsertion. [Builder::load] bulk-loads with
/// Sort-Tile-Recursive packing, which yields better structure than
/// repeated insertion.
///
/// # Example
/// ```
/// use persistent_rtree::{Entry, Rectangle, RTree};
///
/// let tree = RTree::<u32>::builder().star().build::<u32>()
///     .add(Entry::point(1, &[29.0, 4.0]))
///     .add(Entry::point(2, &[28.0, 19.0]))
///     .add(Entry::point(3, &[62.0, 45.0]));
///
/// let query = Rectangle::new(&[0.0, 0.0], &[40.0, 50.0]);
/// assert_eq!(tree.search(&query).count(), 2);
/// ```
pub struct RTree<T> {
    root: Option<Arc<Node<T>>>,
    size: usize,
    context: Arc<Context>,
}

impl<T> Clone for RTree<T> {
    fn clone(&self) -> Self {
        RTree {
            root: self.root.clone(),
            size: self.size,
            context: self.context.clone(),
        }
    }
}

impl<T> Default for RTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RTree<T> {
    /// Creates an empty two-dimensional tree with the default Guttman
    /// configuration. Use the [builder](RTree::builder) for anything
    /// else.
    pub fn new() -> Self {
        Builder::new().build()
    }

    /// Returns a builder for configuring dimensionality, node
    /// capacities and heuristics.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Returns the number of entries.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the minimum bounding rectangle over all entries, or
    /// `None` for an empty tree.
    pub fn mbr(&self) -> Option<Rectangle> {
        self.root.as_ref().map(|root| root.mbr().clone())
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single
    /// leaf.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.height())
    }

    /// Returns the configuration this tree was built with.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Adds one entry, returning the new tree. The receiver is
    /// unchanged.
    ///
    /// # Panics
    /// Panics if the entry's dimensionality differs from the tree's.
    pub fn add(&self, entry: Entry<T>) -> RTree<T>
    where
        T: Clone,
    {
        self.assert_dimensions(&entry);
        let root = insertion::insert(self.root.clone(), entry, &self.context);
        RTree {
            root: Some(root),
            size: self.size + 1,
            context: self.context.clone(),
        }
    }

    /// Adds every entry of `entries`, returning the new tree.
    ///
    /// # Panics
    /// Panics if any entry's dimensionality differs from the tree's.
    pub fn add_all(&self, entries: impl IntoIterator<Item = Entry<T>>) -> RTree<T>
    where
        T: Clone,
    {
        let mut tree = self.clone();
        for entry in entries {
            tree = tree.add(entry);
        }
        tree
    }

    /// Deletes entries equal to `entry` — same value, same geometry
    /// coordinates — returning the new tree. With `all` false at most
    /// one entry is removed. When nothing matches the returned tree is
    /// the receiver, unchanged.
    ///
    /// Geometry equality is exact on the floating point coordinates;
    /// callers holding recomputed coordinates must account for
    /// rounding themselves.
    pub fn delete(&self, entry: &Entry<T>, all: bool) -> RTree<T>
    where
        T: Clone + PartialEq,
    {
        let root = match &self.root {
            None => return self.clone(),
            Some(root) => root,
        };
        match removal::remove(root, entry, all, &self.context) {
            None => self.clone(),
            Some(removal) => RTree {
                root: removal.root,
                size: self.size - removal.removed,
                context: self.context.clone(),
            },
        }
    }

    /// Deletes every entry of `entries` in turn (see
    /// [delete](RTree::delete)), returning the new tree.
    pub fn delete_all<'e>(
        &self,
        entries: impl IntoIterator<Item = &'e Entry<T>>,
        all: bool,
    ) -> RTree<T>
    where
        T: Clone + PartialEq + 'e,
    {
        let mut tree = self.clone();
        for entry in entries {
            tree = tree.delete(entry, all);
        }
        tree
    }

    /// Returns a lazy iterator over the entries whose geometry
    /// intersects `rect`.
    pub fn search(&self, rect: &Rectangle) -> IntersectionIterator<'_, T> {
        self.search_with(IntersectsRect::new(rect.clone()))
    }

    /// Returns a lazy iterator over the entries whose geometry lies
    /// strictly closer than `max_distance` to `rect`.
    pub fn search_within(&self, rect: &Rectangle, max_distance: f64) -> WithinIterator<'_, T> {
        self.search_with(WithinDistance::new(rect.clone(), max_distance))
    }

    /// Returns a lazy iterator over the entries accepted by an
    /// arbitrary [SearchPredicate]. The predicate must be MBR-monotone
    /// or results will be missed; see the trait documentation.
    pub fn search_with<P: SearchPredicate>(&self, predicate: P) -> SearchIterator<'_, T, P> {
        SearchIterator::new(self.root.as_deref(), predicate)
    }

    /// Returns up to `k` entries strictly closer than `max_distance`
    /// to `rect`, ascending by distance, ties in traversal order.
    /// Pass `f64::INFINITY` for an unbounded radius.
    pub fn nearest(&self, rect: &Rectangle, max_distance: f64, k: usize) -> Vec<&Entry<T>> {
        nearest_neighbor::nearest(self.root.as_deref(), rect, max_distance, k)
    }

    /// Returns a lazy iterator over all entries.
    pub fn entries(&self) -> EntriesIterator<'_, T> {
        self.search_with(Everything)
    }

    /// Walks the tree depth-first, pre-order, children left to right.
    pub fn visit<V: Visitor<T> + ?Sized>(&self, visitor: &mut V) {
        if let Some(root) = &self.root {
            visitor::visit(root, visitor);
        }
    }

    fn assert_dimensions(&self, entry: &Entry<T>) {
        assert_eq!(
            entry.dimensions(),
            self.context.dimensions(),
            "entry has {} dimensions but the tree is {}-dimensional",
            entry.dimensions(),
            self.context.dimensions()
        );
    }

    /// Asserts the structural invariants; compiled for tests and the
    /// `debug` feature only.
    #[cfg(any(test, feature = "debug"))]
    pub fn sanity_check(&self) {
        if let Some(root) = &self.root {
            root.sanity_check(self.context.min_children(), self.context.max_children());
        }
        assert_eq!(self.size, self.entries().count());
    }
}

impl<'a, T> IntoIterator for &'a RTree<T> {
    type Item = &'a Entry<T>;
    type IntoIter = EntriesIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for RTree<T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter
            .debug_struct("RTree")
            .field("size", &self.size)
            .field("entries", &DebugEntries { tree: self })
            .finish()
    }
}

struct DebugEntries<'a, T> {
    tree: &'a RTree<T>,
}

impl<'a, T: std::fmt::Debug> std::fmt::Debug for DebugEntries<'a, T> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.debug_set().entries(self.tree.entries()).finish()
    }
}

/// Configures and creates trees; obtained from
/// [RTree::builder](RTree::builder).
///
/// Guttman heuristics (quadratic split, minimal volume increase) are
/// the default; [star](Builder::star) selects the R* pair. Explicitly
/// provided heuristics win over either mode.
///
/// # Example
/// ```
/// use persistent_rtree::{Entry, RTree};
///
/// let tree = RTree::<i32>::builder()
///     .dimensions(3)
///     .max_children(8)
///     .star()
///     .load((0..100).map(|i| {
///         let c = i as f64;
///         Entry::point(i, &[c, c * 0.5, c * 0.25])
///     }).collect());
/// assert_eq!(tree.size(), 100);
/// ```
pub struct Builder {
    dimensions: usize,
    min_children: Option<usize>,
    max_children: usize,
    loading_factor: f64,
    selector: Option<Arc<dyn Selector>>,
    splitter: Option<Arc<dyn Splitter>>,
    star: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    fn new() -> Self {
        Builder {
            dimensions: 2,
            min_children: None,
            max_children: 4,
            loading_factor: 0.7,
            selector: None,
            splitter: None,
            star: false,
        }
    }

    /// Sets the dimensionality every entry must match. At least 2;
    /// defaults to 2.
    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Sets the minimum number of children of a non-root node.
    /// Defaults to `round(0.4 × max_children)`.
    pub fn min_children(mut self, min_children: usize) -> Self {
        self.min_children = Some(min_children);
        self
    }

    /// Sets the maximum number of children of any node. Defaults
    /// to 4.
    pub fn max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }

    /// Sets the fraction of `max_children` targeted per leaf during
    /// [load](Builder::load). In `(0, 1]`; defaults to 0.7.
    pub fn loading_factor(mut self, loading_factor: f64) -> Self {
        self.loading_factor = loading_factor;
        self
    }

    /// Uses the R*-tree heuristics: R* selector, R* splitter and
    /// forced reinsertion.
    pub fn star(mut self) -> Self {
        self.star = true;
        self
    }

    /// Uses a specific path-choice heuristic.
    pub fn selector(mut self, selector: Arc<dyn Selector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Uses a specific node-splitting heuristic.
    pub fn splitter(mut self, splitter: Arc<dyn Splitter>) -> Self {
        self.splitter = Some(splitter);
        self
    }

    /// Creates an empty tree.
    ///
    /// # Panics
    /// Panics on an invalid configuration; see [Context].
    pub fn build<T>(self) -> RTree<T> {
        let context = Arc::new(self.into_context());
        RTree {
            root: None,
            size: 0,
            context,
        }
    }

    /// Bulk-loads a tree over `entries` with the Sort-Tile-Recursive
    /// algorithm. Considerably faster than repeated
    /// [add](RTree::add) and produces a better-packed tree.
    ///
    /// # Panics
    /// Panics on an invalid configuration or if any entry's
    /// dimensionality differs from the configured one.
    pub fn load<T>(self, entries: Vec<Entry<T>>) -> RTree<T> {
        let context = Arc::new(self.into_context());
        for entry in &entries {
            assert_eq!(
                entry.dimensions(),
                context.dimensions(),
                "entry has {} dimensions but the tree is {}-dimensional",
                entry.dimensions(),
                context.dimensions()
            );
        }
        let size = entries.len();
        let root = bulk_load::load(&context, entries);
        RTree {
            root,
            size,
            context,
        }
    }

    fn into_context(self) -> Context {
        let min_children = self
            .min_children
            .unwrap_or_else(|| (0.4 * self.max_children as f64).round() as usize);
        let selector = self.selector.unwrap_or_else(|| {
            if self.star {
                Arc::new(RStarSelector)
            } else {
                Arc::new(MinimalVolumeIncrease)
            }
        });
        let splitter = self.splitter.unwrap_or_else(|| {
            if self.star {
                Arc::new(RStarSplitter)
            } else {
                Arc::new(QuadraticSplitter)
            }
        });
        Context::new(
            self.dimensions,
            min_children,
            self.max_children,
            self.loading_factor,
            selector,
            splitter,
        )
    }
}

#[cfg(test)]
mod test {
    use super::RTree;
    use crate::entry::Entry;
    use crate::node::{Leaf, NonLeaf};
    use crate::point::Point;
    use crate::rect::Rectangle;
    use crate::test_utilities::{create_random_point_entries, SEED_1, SEED_2};
    use crate::visitor::Visitor;

    #[test]
    fn a_single_point() {
        let tree = RTree::new().add(Entry::point(7, &[29.0, 4.0]));
        assert_eq!(tree.size(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.depth(), 1);
        let entries: Vec<_> = tree.entries().collect();
        assert_eq!(entries, vec![&Entry::point(7, &[29.0, 4.0])]);
        assert_eq!(
            tree.mbr(),
            Some(Rectangle::new(&[29.0, 4.0], &[29.0, 4.0]))
        );
    }

    #[test]
    fn empty_tree_has_no_mbr_and_no_entries() {
        let tree: RTree<u8> = RTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.mbr(), None);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.entries().count(), 0);
        let query = Rectangle::new(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(tree.search(&query).count(), 0);
        assert!(tree.nearest(&query, f64::INFINITY, 3).is_empty());
    }

    #[test]
    fn five_star_points() {
        let coords = [
            [29.0, 4.0],
            [28.0, 19.0],
            [34.0, 85.0],
            [10.0, 63.0],
            [62.0, 45.0],
        ];
        let tree = RTree::<usize>::builder()
            .max_children(4)
            .min_children(2)
            .star()
            .build::<usize>()
            .add_all(coords.iter().enumerate().map(|(i, c)| Entry::point(i, c)));
        tree.sanity_check();
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.depth(), 2);

        let query = Rectangle::new(&[0.0, 0.0], &[40.0, 50.0]);
        let mut found: Vec<usize> = tree.search(&query).map(|e| *e.value()).collect();
        found.sort_unstable();
        assert_eq!(found, vec![0, 1]);

        let near = tree.nearest(&Point::new(&[30.0, 20.0]).mbr(), f64::INFINITY, 2);
        let values: Vec<usize> = near.iter().map(|e| *e.value()).collect();
        assert_eq!(values, vec![1, 0]);
    }

    #[test]
    fn three_dimensional_box_search() {
        let tree = RTree::<usize>::builder().dimensions(3).build::<usize>().add_all(
            [[0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]
                .iter()
                .enumerate()
                .map(|(i, c)| Entry::point(i, c)),
        );
        let query = Rectangle::new(&[0.5, 0.5, 0.5], &[1.5, 1.5, 1.5]);
        let found: Vec<usize> = tree.search(&query).map(|e| *e.value()).collect();
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn older_values_survive_mutation() {
        let before = RTree::<usize>::builder()
            .build::<usize>()
            .add_all((0..50).map(|i| Entry::point(i, &[i as f64, (i * 3 % 17) as f64])));
        let snapshot: Vec<Entry<usize>> = before.entries().cloned().collect();

        let mut after = before.add(Entry::point(99, &[3.5, 3.5]));
        for entry in snapshot.iter().take(25) {
            after = after.delete(entry, false);
        }
        assert_eq!(after.size(), 26);

        // the original value still sees its own entries
        assert_eq!(before.size(), 50);
        let replay: Vec<Entry<usize>> = before.entries().cloned().collect();
        assert_eq!(snapshot.len(), replay.len());
        for entry in &snapshot {
            assert!(replay.contains(entry));
        }
        before.sanity_check();
        after.sanity_check();
    }

    #[test]
    fn insert_delete_round_trip_restores_the_contents() {
        let base = RTree::<usize>::builder()
            .build::<usize>()
            .add_all((0..30).map(|i| Entry::point(i, &[(i % 7) as f64, (i % 11) as f64])));
        let snapshot: Vec<Entry<usize>> = base.entries().cloned().collect();

        let extra = Entry::point(1000, &[3.0, 3.0]);
        let grown = base.add(extra.clone());
        let shrunk = grown.delete(&extra, true);
        assert_eq!(shrunk.size(), base.size());
        let replay: Vec<Entry<usize>> = shrunk.entries().cloned().collect();
        for entry in &snapshot {
            assert!(replay.contains(entry));
        }
        assert!(!replay.contains(&extra));
    }

    #[test]
    fn deleting_an_absent_entry_returns_the_same_value() {
        let tree = RTree::<usize>::builder()
            .build::<usize>()
            .add_all((0..10).map(|i| Entry::point(i, &[i as f64, i as f64])));
        let unchanged = tree.delete(&Entry::point(77, &[0.5, 0.5]), true);
        assert_eq!(unchanged.size(), tree.size());
    }

    #[test]
    fn thousands_in_and_half_back_out() {
        let entries = create_random_point_entries(5000, 2, SEED_1);
        let mut tree = RTree::<usize>::builder().max_children(8).build::<usize>();
        for entry in &entries {
            tree = tree.add(entry.clone());
        }
        assert_eq!(tree.size(), 5000);
        tree.sanity_check();

        // delete every other entry
        let doomed: Vec<_> = entries
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 0)
            .map(|(_, e)| e)
            .take(2500)
            .collect();
        let tree = tree.delete_all(doomed.iter().copied(), false);
        assert_eq!(tree.size(), 2500);
        tree.sanity_check();
    }

    #[test]
    fn bulk_loaded_search_agrees_with_a_linear_scan() {
        let entries = create_random_point_entries(1000, 2, SEED_1);
        let tree = RTree::<usize>::builder()
            .max_children(10)
            .min_children(4)
            .loading_factor(0.7)
            .load(entries.clone());
        assert_eq!(tree.size(), 1000);
        tree.sanity_check();

        for query in create_random_point_entries(10, 2, SEED_2) {
            let center = query.geometry().mins();
            let rect = Rectangle::new(
                &[center[0] - 10.0, center[1] - 10.0],
                &[center[0] + 10.0, center[1] + 10.0],
            );
            let expected = entries
                .iter()
                .filter(|entry| entry.geometry().intersects(&rect))
                .count();
            assert_eq!(tree.search(&rect).count(), expected);
        }
    }

    #[test]
    fn visitor_walks_every_node() {
        struct Counter {
            leaves: usize,
            inner: usize,
            entries: usize,
        }
        impl Visitor<usize> for Counter {
            fn on_leaf(&mut self, leaf: &Leaf<usize>) {
                self.leaves += 1;
                self.entries += leaf.count();
            }
            fn on_non_leaf(&mut self, _non_leaf: &NonLeaf<usize>) {
                self.inner += 1;
            }
        }

        let tree = RTree::<usize>::builder().load(create_random_point_entries(200, 2, SEED_1));
        let mut counter = Counter {
            leaves: 0,
            inner: 0,
            entries: 0,
        };
        tree.visit(&mut counter);
        assert_eq!(counter.entries, 200);
        assert!(counter.leaves > 1);
        assert!(counter.inner >= 1);
    }

    #[test]
    fn closures_drive_custom_searches() {
        let tree = RTree::<usize>::builder()
            .build::<usize>()
            .add_all((0..20).map(|i| Entry::point(i, &[i as f64, 0.0])));
        let left_half = tree
            .search_with(|mbr: &Rectangle| mbr.min(0) < 10.0)
            .count();
        assert_eq!(left_half, 10);
    }

    #[test]
    #[should_panic]
    fn mismatched_entry_dimensions_are_fatal() {
        RTree::<usize>::new().add(Entry::point(0, &[1.0, 2.0, 3.0]));
    }

    #[test]
    #[should_panic]
    fn invalid_configuration_fails_fast() {
        RTree::<usize>::builder().max_children(2).build::<usize>();
    }

    #[test]
    fn debug_output_lists_entries() {
        let tree = RTree::new().add(Entry::point(1, &[1.0, 2.0]));
        let rendered = format!("{:?}", tree);
        assert!(rendered.contains("size: 1"));
    }

    #[test]
    fn iteration_over_references() {
        let tree = RTree::<usize>::builder()
            .build::<usize>()
            .add_all((0..5).map(|i| Entry::point(i, &[i as f64, i as f64])));
        let mut values: Vec<usize> = (&tree).into_iter().map(|e| *e.value()).collect();
        values.sort_unstable();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }
}
