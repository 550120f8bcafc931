//! Parsimony cost of a labeled tree.
//!
//! The cost of an edge is the Hamming distance between the decoded labels of
//! its two endpoints, counted in symbols. The parsimony score is the sum over
//! all parent-child edges.
//!
//! # Example
//! ```text
//!          ACT
//!         /   \
//!      ACT     AGT        edges: ACT-ACT 0, ACT-AGT 1
//!      / \     /  \              ACT-ACT 0 (x2)
//!    ACT ACT AGA  AGT            AGT-AGA 1, AGT-AGT 0
//!                         score: 2
//! ```

use crate::decode::DecodedTree;
use crate::error::{ParsimonyError, Result};
use crate::tree::{NodeId, Tree};

/// Cost of one parent-child edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EdgeCost {
    pub parent: NodeId,
    pub child: NodeId,
    pub distance: usize,
}

/// Number of positions at which two symbol strings differ.
///
/// Extra symbols in the longer string are not counted.
#[inline]
pub fn hamming(a: &str, b: &str) -> usize {
    a.chars().zip(b.chars()).filter(|(x, y)| x != y).count()
}

/// Per-edge costs, top-down from the root (parents before children).
pub fn edge_costs(tree: &Tree, decoded: &DecodedTree) -> Result<Vec<EdgeCost>> {
    let mut edges = Vec::with_capacity(tree.len().saturating_sub(1));
    let mut work = vec![tree.root()];

    while let Some(parent) = work.pop() {
        let parent_label = label_of(decoded, parent)?;
        let children = tree.get(parent)?.children();
        for &child in children {
            let distance = hamming(parent_label, label_of(decoded, child)?);
            edges.push(EdgeCost {
                parent,
                child,
                distance,
            });
        }
        // reversed so the first child is visited first
        work.extend(children.iter().rev());
    }

    Ok(edges)
}

/// Total parsimony score of a labeled and decoded tree.
pub fn parsimony_cost(tree: &Tree, decoded: &DecodedTree) -> Result<usize> {
    Ok(edge_costs(tree, decoded)?.iter().map(|e| e.distance).sum())
}

fn label_of(decoded: &DecodedTree, id: NodeId) -> Result<&str> {
    decoded.get(id).ok_or(ParsimonyError::UnknownNode(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::labeler::label_tree;
    use crate::tree::TreeBuilder;
    use itertools::Itertools;

    fn labeled(leaves: &[&str], length: usize) -> (Tree, DecodedTree) {
        // caterpillar: (((l0,l1),l2),l3)...
        let dna = Alphabet::dna();
        let mut b = TreeBuilder::new(length).unwrap();
        let ids: Vec<_> = leaves
            .iter()
            .map(|s| b.add_leaf(*s, dna.encode(s, length).unwrap()).unwrap())
            .collect();
        let mut top = ids[0];
        for &id in &ids[1..] {
            top = b.add_internal(None, vec![top, id]).unwrap();
        }
        let mut tree = b.build(top).unwrap();
        label_tree(&mut tree).unwrap();
        let decoded = DecodedTree::from_tree(&tree, &dna).unwrap();
        (tree, decoded)
    }

    #[test]
    fn test_hamming() {
        assert_eq!(hamming("ACT", "ACT"), 0);
        assert_eq!(hamming("ACT", "AGT"), 1);
        assert_eq!(hamming("TCA", "ACT"), 2);
    }

    #[test]
    fn test_identical_leaves_cost_nothing() {
        let (tree, decoded) = labeled(&["GGCA"; 5], 4);
        assert_eq!(parsimony_cost(&tree, &decoded).unwrap(), 0);
        assert!(decoded.labels().iter().all(|l| l == "GGCA"));
    }

    #[test]
    fn test_cost_is_sum_of_edges() {
        let (tree, decoded) = labeled(&["ACGT", "TGCA", "AAAA", "CCGT", "ACGA"], 4);
        let edges = edge_costs(&tree, &decoded).unwrap();

        assert_eq!(edges.len(), tree.len() - 1);
        assert!(edges.iter().map(|e| e.child).all_unique());
        for e in &edges {
            let expected = hamming(decoded.get(e.parent).unwrap(), decoded.get(e.child).unwrap());
            assert_eq!(e.distance, expected);
            assert_eq!(tree[e.child].parent(), Some(e.parent));
        }
        let total: usize = edges.iter().map(|e| e.distance).sum();
        assert_eq!(parsimony_cost(&tree, &decoded).unwrap(), total);
    }

    #[test]
    fn test_cost_bounded_by_any_leaf_pair() {
        // every pair of leaves is connected by a path, so the score is at least
        // their Hamming distance
        let leaves = ["ACGT", "TGCA", "AAAA", "CCGT"];
        let (tree, decoded) = labeled(&leaves, 4);
        let cost = parsimony_cost(&tree, &decoded).unwrap();
        for pair in leaves.iter().combinations(2) {
            assert!(cost >= hamming(pair[0], pair[1]));
        }
    }

    #[test]
    fn test_parents_before_children() {
        let (tree, decoded) = labeled(&["AC", "AG", "TT"], 2);
        let edges = edge_costs(&tree, &decoded).unwrap();
        assert_eq!(edges[0].parent, tree.root());
        let (first, _) = tree.children_pair(tree.root()).unwrap();
        assert_eq!(edges[0].child, first);
    }
}
