use crate::node::{Leaf, Node, NonLeaf};

/// Read-only depth-first traversal callbacks.
///
/// [RTree::visit](crate::RTree::visit) walks the tree in pre-order,
/// children left to right, calling [on_non_leaf](Visitor::on_non_leaf)
/// before descending. Useful for diagnostics and for host-side
/// aggregation over node MBRs.
pub trait Visitor<T> {
    /// Called for every leaf.
    fn on_leaf(&mut self, leaf: &Leaf<T>);

    /// Called for every inner node, before its children.
    fn on_non_leaf(&mut self, non_leaf: &NonLeaf<T>);
}

pub(crate) fn visit<T, V: Visitor<T> + ?Sized>(node: &Node<T>, visitor: &mut V) {
    match node {
        Node::Leaf(leaf) => visitor.on_leaf(leaf),
        Node::NonLeaf(non_leaf) => {
            visitor.on_non_leaf(non_leaf);
            for child in non_leaf.children() {
                visit(child, visitor);
            }
        }
    }
}
