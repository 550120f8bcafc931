//! Processing order for the labeler.
//!
//! # Overview
//! The labeler works on two sibling internal nodes at a time, so it needs a
//! sequence of pairs in which every node's children are already labeled when
//! the pair comes up. We get it from a pre-order walk over internal nodes
//! pushed onto a stack: popping reverses the order, so the deepest nodes come
//! out first and every node comes out after all of its descendants.
//!
//! ```text
//!             P
//!           /   \
//!          Q     W          pre-order:  P Q X Y W
//!         / \   / \         pop order:  W Y X Q P
//!        X   Y  .  .
//!       / \ / \             pairs:      (Y, X)  (W, Q)  (P, sentinel)
//! ```
//!
//! A popped node whose sibling is internal and still on the stack is parked
//! until the sibling pops; the parked node becomes the pair's query.

use crate::error::Result;
use crate::tree::{NodeId, Tree};

/// What a query node is labeled against.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Partner {
    /// The query's internal sibling, labeled in the same pass.
    Sibling(NodeId),
    /// The query's sibling is a leaf; its observed label is the evidence.
    Leaf(NodeId),
    /// The query is the root and is paired with itself.
    Sentinel,
}

/// One unit of labeler work.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LabelingPair {
    pub query: NodeId,
    pub partner: Partner,
}

/// Ordered labeler work list for one tree.
#[derive(Clone, Debug, Default)]
pub struct Traversal {
    pairs: Vec<LabelingPair>,
}

impl Traversal {
    /// Builds the pair sequence for `tree`.
    ///
    /// Errors if an internal node reachable from the root does not have
    /// exactly two children.
    pub fn build(tree: &Tree) -> Result<Self> {
        let stack = internal_preorder(tree)?;

        let mut parked = vec![false; tree.len()];
        let mut pairs = Vec::with_capacity(stack.len());

        for &node in stack.iter().rev() {
            let Some(sibling) = tree.sibling(node)? else {
                pairs.push(LabelingPair {
                    query: node,
                    partner: Partner::Sentinel,
                });
                continue;
            };

            if tree[sibling].is_leaf() {
                pairs.push(LabelingPair {
                    query: node,
                    partner: Partner::Leaf(sibling),
                });
            } else if parked[sibling] {
                parked[sibling] = false;
                pairs.push(LabelingPair {
                    query: sibling,
                    partner: Partner::Sibling(node),
                });
            } else {
                parked[node] = true;
            }
        }

        Ok(Traversal { pairs })
    }

    pub fn pairs(&self) -> &[LabelingPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<'a> IntoIterator for &'a Traversal {
    type Item = &'a LabelingPair;
    type IntoIter = std::slice::Iter<'a, LabelingPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// Internal nodes in pre-order, first child before second.
fn internal_preorder(tree: &Tree) -> Result<Vec<NodeId>> {
    let mut order = Vec::with_capacity(tree.num_internal());
    let mut work = vec![tree.root()];

    while let Some(id) = work.pop() {
        if tree.get(id)?.is_leaf() {
            continue;
        }
        let (first, second) = tree.children_pair(id)?;
        order.push(id);
        // second goes in first so that the first child is visited first
        work.push(second);
        work.push(first);
    }

    Ok(order)
}
