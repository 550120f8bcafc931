//! End-to-end small parsimony: label, decode, score.
//!
//! This is the entry point most callers want. It runs the labeler, decoder and
//! cost accumulator in sequence on one tree and flattens the result into
//! read-only node records for export. [`small_parsimony_batch`] does the same
//! for many independent trees in parallel.

use crate::alphabet::Alphabet;
use crate::cost::edge_costs;
use crate::decode::DecodedTree;
use crate::error::Result;
use crate::labeler::{label_tree, LabelingStats};
use crate::tree::{NodeId, Tree};
use rayon::prelude::*;
use tracing::{debug, info};

/// One node of a labeled tree, as handed to exporters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub name: Option<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Decoded label.
    pub label: String,
    /// Hamming distance to the parent's label; `None` for the root.
    pub cost: Option<usize>,
}

/// Labeled tree plus its parsimony score.
#[derive(Clone, Debug)]
pub struct ParsimonyResult {
    /// Records indexed by [`NodeId`].
    pub records: Vec<NodeRecord>,
    pub root: NodeId,
    pub total_cost: usize,
    pub stats: LabelingStats,
}

impl ParsimonyResult {
    pub fn root_record(&self) -> &NodeRecord {
        &self.records[self.root]
    }

    /// Records of nodes without children.
    pub fn leaves(&self) -> impl Iterator<Item = &NodeRecord> {
        self.records.iter().filter(|r| r.children.is_empty())
    }

    /// Label of the node named `name`, if any.
    pub fn label_of(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.name.as_deref() == Some(name))
            .map(|r| r.label.as_str())
    }
}

/// Labels `tree` in place and scores it.
///
/// # Example
/// ```
/// # use fitch_parsimony::alphabet::Alphabet;
/// # use fitch_parsimony::tree::TreeBuilder;
/// # use fitch_parsimony::parsimony::small_parsimony;
/// let dna = Alphabet::dna();
/// let mut b = TreeBuilder::new(3).unwrap();
/// let l: Vec<_> = ["ACT", "ACT", "AGA", "AGT"]
///     .iter()
///     .map(|s| b.add_leaf(*s, dna.encode(s, 3).unwrap()).unwrap())
///     .collect();
/// let x = b.add_internal(None, vec![l[0], l[1]]).unwrap();
/// let y = b.add_internal(None, vec![l[2], l[3]]).unwrap();
/// let root = b.add_internal(None, vec![x, y]).unwrap();
/// let mut tree = b.build(root).unwrap();
///
/// let result = small_parsimony(&mut tree, &dna).unwrap();
/// assert_eq!(result.records[y].label, "AGT");
/// assert_eq!(result.total_cost, 2);
/// ```
pub fn small_parsimony(tree: &mut Tree, alphabet: &Alphabet) -> Result<ParsimonyResult> {
    let stats = label_tree(tree)?;
    let decoded = DecodedTree::from_tree(tree, alphabet)?;
    let edges = edge_costs(tree, &decoded)?;

    let mut costs = vec![None; tree.len()];
    for edge in &edges {
        costs[edge.child] = Some(edge.distance);
    }
    let total_cost = edges.iter().map(|e| e.distance).sum();

    let records = tree
        .nodes()
        .zip(decoded.into_labels())
        .zip(costs)
        .map(|((node, label), cost)| NodeRecord {
            id: node.id(),
            name: node.name().map(str::to_owned),
            parent: node.parent(),
            children: node.children().to_vec(),
            label,
            cost,
        })
        .collect();

    debug!(nodes = tree.len(), total_cost, "scored tree");
    Ok(ParsimonyResult {
        records,
        root: tree.root(),
        total_cost,
        stats,
    })
}

/// Runs [`small_parsimony`] on every tree in parallel.
///
/// Results keep the input order; one failing tree does not affect the others.
pub fn small_parsimony_batch(
    trees: Vec<Tree>,
    alphabet: &Alphabet,
) -> Vec<Result<ParsimonyResult>> {
    let results: Vec<_> = trees
        .into_par_iter()
        .map(|mut tree| small_parsimony(&mut tree, alphabet))
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    info!(trees = results.len(), failed, "labeled batch");
    results
}
