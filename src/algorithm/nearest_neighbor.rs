//! k-nearest-neighbour driver.
//!
//! Runs the within-distance search and keeps the k closest entries in
//! a bounded priority queue. A best-first traversal would visit fewer
//! nodes; this design trades that for simplicity on top of the
//! existing search.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::mem::replace;

use heapless::binary_heap as static_heap;

use crate::algorithm::iterators::SearchIterator;
use crate::algorithm::selection_functions::WithinDistance;
use crate::entry::Entry;
use crate::node::Node;
use crate::rect::Rectangle;

/// Returns up to `k` entries strictly closer than `max_distance` to
/// `rect`, ascending by distance, ties in arrival order.
pub(crate) fn nearest<'a, T>(
    root: Option<&'a Node<T>>,
    rect: &Rectangle,
    max_distance: f64,
    k: usize,
) -> Vec<&'a Entry<T>> {
    if k == 0 {
        return Vec::new();
    }

    let within = WithinDistance::new(rect.clone(), max_distance);
    let mut queue: SmallHeap<Candidate<T>> = SmallHeap::new();
    for (order, entry) in SearchIterator::new(root, within).enumerate() {
        let candidate = Candidate {
            distance: entry.geometry().distance(rect),
            order,
            entry,
        };
        if queue.len() < k {
            queue.push(candidate);
        } else if queue.peek().map_or(false, |worst| candidate < *worst) {
            queue.pop();
            queue.push(candidate);
        }
    }

    // popping the max-heap drains worst first
    let mut result = Vec::with_capacity(queue.len());
    while let Some(candidate) = queue.pop() {
        result.push(candidate.entry);
    }
    result.reverse();
    result
}

struct Candidate<'a, T> {
    distance: f64,
    order: usize,
    entry: &'a Entry<T>,
}

impl<'a, T> PartialEq for Candidate<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance && self.order == other.order
    }
}

impl<'a, T> Eq for Candidate<'a, T> {}

impl<'a, T> PartialOrd for Candidate<'a, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, T> Ord for Candidate<'a, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .partial_cmp(&other.distance)
            .unwrap()
            .then_with(|| self.order.cmp(&other.order))
    }
}

/// A max-heap that lives on the stack while small and spills into a
/// std [BinaryHeap] when it outgrows its fixed capacity.
enum SmallHeap<T: Ord> {
    Stack(static_heap::BinaryHeap<T, static_heap::Max, 32>),
    Heap(BinaryHeap<T>),
}

impl<T: Ord> SmallHeap<T> {
    fn new() -> Self {
        SmallHeap::Stack(static_heap::BinaryHeap::new())
    }

    fn len(&self) -> usize {
        match self {
            SmallHeap::Stack(heap) => heap.len(),
            SmallHeap::Heap(heap) => heap.len(),
        }
    }

    fn peek(&self) -> Option<&T> {
        match self {
            SmallHeap::Stack(heap) => heap.peek(),
            SmallHeap::Heap(heap) => heap.peek(),
        }
    }

    fn pop(&mut self) -> Option<T> {
        match self {
            SmallHeap::Stack(heap) => heap.pop(),
            SmallHeap::Heap(heap) => heap.pop(),
        }
    }

    fn push(&mut self, item: T) {
        match self {
            SmallHeap::Stack(heap) => {
                if let Err(item) = heap.push(item) {
                    self.spill().push(item);
                }
            }
            SmallHeap::Heap(heap) => heap.push(item),
        }
    }

    #[cold]
    fn spill(&mut self) -> &mut BinaryHeap<T> {
        let capacity = self.len() + 1;
        let old = replace(self, SmallHeap::Heap(BinaryHeap::with_capacity(capacity)));
        let heap = match self {
            SmallHeap::Heap(heap) => heap,
            SmallHeap::Stack(_) => unreachable!(),
        };
        if let SmallHeap::Stack(old) = old {
            heap.extend(old.into_vec());
        }
        heap
    }
}
