//! Fitch small-parsimony labeling of internal nodes.
//!
//! # Algorithm
//! Pairs from [`Traversal`] are processed in order. For each pair, slots are
//! filled left to right in two alternating phases:
//!
//! 1. **Consensus**: from a node's current length, copy every slot where its
//!    two children agree (their 2-bit groups XOR to zero). Stop at the first
//!    disagreement; the length reached is reported.
//! 2. **No-consensus**: the node that stopped earlier (`min`) gets one slot by
//!    majority vote over its children's codes at that slot plus evidence from
//!    the other node (`max`): `max`'s children when `max` is stuck at the same
//!    slot, `max`'s own code otherwise. Ties go to the earliest candidate, so
//!    `min`'s first child wins a full tie.
//!
//! A resolved slot can start a new run of agreement, so the pair goes back to
//! phase 1 until both nodes are full.
//!
//! The root has no sibling. It takes its consensus prefix and then copies the
//! rest from its first child.
//!
//! # Example
//! ```text
//!          root
//!         /    \
//!       x        y          x: ACT ACT agree everywhere      → ACT
//!      / \      / \         y: A, G agree; slot 2 A vs T
//!    ACT ACT  AGA AGT          votes {A, T, x=T}              → AGT
//!                          root: A agrees; C vs G → copy x   → ACT
//! ```

use crate::alphabet::ALPHABET_SIZE;
use crate::error::{ParsimonyError, Result};
use crate::traversal::{LabelingPair, Partner, Traversal};
use crate::tree::{NodeId, Tree};
use std::cmp::Reverse;
use tracing::debug;

/// How the slots of the internal labels were decided.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LabelingStats {
    /// Slots copied because both children agreed.
    pub consensus: usize,
    /// Slots decided by majority vote.
    pub voted: usize,
    /// Root slots copied from its first child.
    pub defaulted: usize,
    /// Pairs processed.
    pub pairs: usize,
}

/// Fills internal-node labels of one tree in place.
///
/// The labeler can be driven pair by pair with [`Labeler::label_pair`] to look
/// at intermediate states, or all at once with [`Labeler::run`].
pub struct Labeler<'t> {
    tree: &'t mut Tree,
    stats: LabelingStats,
}

impl<'t> Labeler<'t> {
    pub fn new(tree: &'t mut Tree) -> Self {
        Labeler {
            tree,
            stats: LabelingStats::default(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    pub fn stats(&self) -> LabelingStats {
        self.stats
    }

    /// Processes every pair of `traversal` in order.
    pub fn run(mut self, traversal: &Traversal) -> Result<LabelingStats> {
        for pair in traversal {
            self.label_pair(pair)?;
        }
        Ok(self.stats)
    }

    /// Fills the labels of one pair completely.
    pub fn label_pair(&mut self, pair: &LabelingPair) -> Result<()> {
        match pair.partner {
            Partner::Sentinel => self.label_alone(pair.query)?,
            Partner::Sibling(other) | Partner::Leaf(other) => {
                self.label_against(pair.query, other)?
            }
        }
        self.stats.pairs += 1;
        debug!(query = pair.query, partner = ?pair.partner, "labeled pair");
        Ok(())
    }

    fn label_against(&mut self, query: NodeId, sibling: NodeId) -> Result<()> {
        let full = self.tree.label_length();
        loop {
            let query_len = self.reach(query)?;
            let sibling_len = self.reach(sibling)?;

            let (min, max, pos) = if query_len < sibling_len {
                (query, sibling, query_len)
            } else {
                (sibling, query, sibling_len)
            };
            if pos >= full {
                return Ok(());
            }

            let code = self.vote(min, max, pos)?;
            self.tree.push_code(min, code)?;
            self.stats.voted += 1;
        }
    }

    fn label_alone(&mut self, root: NodeId) -> Result<()> {
        let full = self.tree.label_length();
        let pos = self.reach(root)?;
        if pos < full {
            let (first, _) = self.tree.children_pair(root)?;
            self.tree.extend_label(root, first, pos)?;
            self.stats.defaulted += full - pos;
        }
        Ok(())
    }

    /// Length of `id`'s label after extending it over every agreeing slot.
    ///
    /// Leaves are already full and are returned as is.
    fn reach(&mut self, id: NodeId) -> Result<usize> {
        let full = self.tree.label_length();
        if self.tree.get(id)?.is_leaf() {
            return Ok(self.tree[id].label().len());
        }

        let (first, second) = self.tree.children_pair(id)?;
        loop {
            let slot = self.tree[id].label().len();
            if slot >= full {
                return Ok(slot);
            }
            let a = self.child_code(id, first, slot)?;
            let b = self.child_code(id, second, slot)?;
            if a ^ b != 0 {
                return Ok(slot);
            }
            self.tree.push_code(id, a)?;
            self.stats.consensus += 1;
        }
    }

    /// Majority code at `pos` for `min`, using `max` as sibling evidence.
    fn vote(&self, min: NodeId, max: NodeId, pos: usize) -> Result<u8> {
        let (first, second) = self.tree.children_pair(min)?;
        let mut candidates = Vec::with_capacity(ALPHABET_SIZE);
        candidates.push(self.child_code(min, first, pos)?);
        candidates.push(self.child_code(min, second, pos)?);

        let max_node = &self.tree[max];
        if max_node.label().len() == self.tree[min].label().len() {
            let (max_first, max_second) = self.tree.children_pair(max)?;
            candidates.push(self.child_code(max, max_first, pos)?);
            candidates.push(self.child_code(max, max_second, pos)?);
        } else {
            candidates.push(
                max_node
                    .label()
                    .get(pos)
                    .ok_or(ParsimonyError::UnresolvedChild { node: min, slot: pos })?,
            );
        }

        let mut counts = [0usize; ALPHABET_SIZE];
        for &code in &candidates {
            counts[usize::from(code)] += 1;
        }
        // min_by_key keeps the first of equal keys
        candidates
            .into_iter()
            .min_by_key(|&code| Reverse(counts[usize::from(code)]))
            .ok_or(ParsimonyError::UnresolvedChild { node: min, slot: pos })
    }

    fn child_code(&self, parent: NodeId, child: NodeId, slot: usize) -> Result<u8> {
        self.tree
            .get(child)?
            .label()
            .get(slot)
            .ok_or(ParsimonyError::UnresolvedChild { node: parent, slot })
    }
}

/// Labels every internal node of `tree`.
pub fn label_tree(tree: &mut Tree) -> Result<LabelingStats> {
    let traversal = Traversal::build(tree)?;
    let stats = Labeler::new(tree).run(&traversal)?;
    debug!(
        pairs = stats.pairs,
        consensus = stats.consensus,
        voted = stats.voted,
        defaulted = stats.defaulted,
        "labeled tree"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;
    use crate::tree::TreeBuilder;

    fn leaf(builder: &mut TreeBuilder, seq: &str) -> NodeId {
        let label = Alphabet::dna().encode(seq, builder.label_length()).unwrap();
        builder.add_leaf(seq, label).unwrap()
    }

    fn cherry(builder: &mut TreeBuilder, a: &str, b: &str) -> NodeId {
        let (a, b) = (leaf(builder, a), leaf(builder, b));
        builder.add_internal(None, vec![a, b]).unwrap()
    }

    fn symbols(tree: &Tree, id: NodeId) -> String {
        let dna = Alphabet::dna();
        tree[id]
            .label()
            .codes()
            .map(|c| dna.symbol(c).unwrap())
            .collect()
    }

    #[test]
    fn test_two_cherries() {
        let mut b = TreeBuilder::new(3).unwrap();
        let x = cherry(&mut b, "ACT", "ACT");
        let y = cherry(&mut b, "AGA", "AGT");
        let root = b.add_internal(None, vec![x, y]).unwrap();
        let mut tree = b.build(root).unwrap();

        let stats = label_tree(&mut tree).unwrap();

        assert_eq!(symbols(&tree, x), "ACT");
        assert_eq!(symbols(&tree, y), "AGT");
        assert_eq!(symbols(&tree, root), "ACT");
        assert!(tree.is_fully_labeled());
        assert_eq!(
            stats,
            LabelingStats { consensus: 6, voted: 1, defaulted: 2, pairs: 2 }
        );
    }

    #[test]
    fn test_full_tie_uses_first_candidate() {
        // (((ACT,ACT),(AGA,AGT)),(TGA,TCG))
        let mut b = TreeBuilder::new(3).unwrap();
        let x = cherry(&mut b, "ACT", "ACT");
        let y = cherry(&mut b, "AGA", "AGT");
        let q = b.add_internal(None, vec![x, y]).unwrap();
        let w = cherry(&mut b, "TGA", "TCG");
        let root = b.add_internal(None, vec![q, w]).unwrap();
        let mut tree = b.build(root).unwrap();

        label_tree(&mut tree).unwrap();

        assert_eq!(symbols(&tree, y), "AGT");
        // slot 1 ties C/G two against two; q's first child (C) wins
        assert_eq!(symbols(&tree, q), "ACT");
        // slot 2 ties A/G/T one each; w's first child (A) wins
        assert_eq!(symbols(&tree, w), "TCA");
        assert_eq!(symbols(&tree, root), "ACT");
    }

    #[test]
    fn test_leaf_sibling_as_evidence() {
        // (ACT,(AGA,AGT))
        let mut b = TreeBuilder::new(3).unwrap();
        let a = leaf(&mut b, "ACT");
        let y = cherry(&mut b, "AGA", "AGT");
        let root = b.add_internal(None, vec![a, y]).unwrap();
        let mut tree = b.build(root).unwrap();

        label_tree(&mut tree).unwrap();

        assert_eq!(symbols(&tree, y), "AGT");
        assert_eq!(symbols(&tree, root), "ACT");
    }

    #[test]
    fn test_agreement_propagates_unchanged() {
        let mut b = TreeBuilder::new(4).unwrap();
        let x = cherry(&mut b, "GATC", "GATC");
        let y = cherry(&mut b, "GATC", "GATC");
        let root = b.add_internal(None, vec![x, y]).unwrap();
        let mut tree = b.build(root).unwrap();

        let stats = label_tree(&mut tree).unwrap();

        for id in [x, y, root] {
            assert_eq!(symbols(&tree, id), "GATC");
        }
        assert_eq!(stats.voted, 0);
        assert_eq!(stats.defaulted, 0);
    }

    #[test]
    fn test_labeler_is_deterministic() {
        let build = || {
            let mut b = TreeBuilder::new(5).unwrap();
            let x = cherry(&mut b, "ACGTA", "TGCAA");
            let y = cherry(&mut b, "ACCTA", "GGCTT");
            let z = cherry(&mut b, "CCGTA", "ACGAT");
            let xy = b.add_internal(None, vec![x, y]).unwrap();
            let root = b.add_internal(None, vec![xy, z]).unwrap();
            b.build(root).unwrap()
        };
        let mut first = build();
        let mut second = build();
        label_tree(&mut first).unwrap();
        label_tree(&mut second).unwrap();

        for (a, b) in first.nodes().zip(second.nodes()) {
            assert_eq!(a.label(), b.label());
        }
        assert!(first.is_fully_labeled());
    }

    #[test]
    fn test_step_by_step() {
        let mut b = TreeBuilder::new(3).unwrap();
        let x = cherry(&mut b, "ACT", "ACT");
        let y = cherry(&mut b, "AGA", "AGT");
        let root = b.add_internal(None, vec![x, y]).unwrap();
        let mut tree = b.build(root).unwrap();
        let traversal = Traversal::build(&tree).unwrap();

        let mut labeler = Labeler::new(&mut tree);
        labeler.label_pair(&traversal.pairs()[0]).unwrap();
        assert!(labeler.tree()[x].label().is_full());
        assert!(labeler.tree()[y].label().is_full());
        assert!(labeler.tree()[root].label().is_empty());

        labeler.label_pair(&traversal.pairs()[1]).unwrap();
        assert!(labeler.tree()[root].label().is_full());
        assert_eq!(labeler.stats().pairs, 2);
    }

    #[test]
    fn test_out_of_order_pair_is_rejected() {
        let mut b = TreeBuilder::new(3).unwrap();
        let x = cherry(&mut b, "ACT", "ACT");
        let y = cherry(&mut b, "AGA", "AGT");
        let root = b.add_internal(None, vec![x, y]).unwrap();
        let mut tree = b.build(root).unwrap();

        let mut labeler = Labeler::new(&mut tree);
        let err = labeler
            .label_pair(&LabelingPair { query: root, partner: Partner::Sentinel })
            .unwrap_err();
        assert!(matches!(
            err,
            ParsimonyError::UnresolvedChild { node, slot: 0 } if node == root
        ));
    }
}
