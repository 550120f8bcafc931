//! Arena-backed binary tree whose nodes carry packed labels.
//!
//! # Overview
//! All nodes live in one `Vec` and refer to each other by [`NodeId`]. Parents
//! own their children through the id lists; the `parent` field is a plain
//! index used only to walk upwards, so the structure has no ownership cycles.
//!
//! ```text
//!            root (4)
//!           /        \
//!       node (2)    node (3)
//!       /    \       /    \
//!     ACT    ACT   AGA    AGT
//!     (0)    (1)   ...    ...
//! ```
//!
//! Leaves are created fully labeled. Internal nodes start with an empty label
//! that the labeler fills in place. Construction goes through [`TreeBuilder`],
//! which rejects anything the labeler cannot work with: nodes with a child
//! count other than 0 or 2, leaves whose sequence length differs from the
//! tree-wide label length, children attached twice.

use crate::error::{ParsimonyError, Result};
use crate::label::Label;
use std::ops::Index;

/// Index of a node in the tree arena.
pub type NodeId = usize;

/// A tree vertex.
///
/// Children are kept in attach order; the first child is the "first" one for
/// every tie-break rule downstream.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: Option<String>,
    label: Label,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_internal(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// A validated binary tree with a uniform label length.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    label_length: usize,
}

impl Tree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of symbol slots in every label of this tree.
    pub fn label_length(&self) -> usize {
        self.label_length
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(ParsimonyError::UnknownNode(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn num_internal(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_internal()).count()
    }

    /// The two children of an internal node, first child first.
    pub fn children_pair(&self, id: NodeId) -> Result<(NodeId, NodeId)> {
        match *self.get(id)?.children() {
            [first, second] => Ok((first, second)),
            ref other => Err(ParsimonyError::MalformedTopology {
                node: id,
                children: other.len(),
            }),
        }
    }

    /// The other child of `id`'s parent, if `id` has a parent.
    pub fn sibling(&self, id: NodeId) -> Result<Option<NodeId>> {
        let Some(parent) = self.get(id)?.parent() else {
            return Ok(None);
        };
        let (first, second) = self.children_pair(parent)?;
        Ok(Some(if first == id { second } else { first }))
    }

    /// True once every node carries a full label.
    pub fn is_fully_labeled(&self) -> bool {
        self.nodes.iter().all(|n| n.label.is_full())
    }

    /// Appends one code to the label of `id`.
    pub(crate) fn push_code(&mut self, id: NodeId, code: u8) -> Result<()> {
        self.nodes
            .get_mut(id)
            .ok_or(ParsimonyError::UnknownNode(id))?
            .label
            .push(code)
    }

    /// Appends to the label of `id` the codes of `source` starting at `from`.
    pub(crate) fn extend_label(&mut self, id: NodeId, source: NodeId, from: usize) -> Result<()> {
        let source_label = self.get(source)?.label.clone();
        self.nodes
            .get_mut(id)
            .ok_or(ParsimonyError::UnknownNode(id))?
            .label
            .extend_from(&source_label, from)
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

/// Bottom-up construction of a [`Tree`].
///
/// # Example
/// ```
/// # use fitch_parsimony::alphabet::Alphabet;
/// # use fitch_parsimony::tree::TreeBuilder;
/// let dna = Alphabet::dna();
/// let mut builder = TreeBuilder::new(3).unwrap();
/// let a = builder.add_leaf("a", dna.encode("ACT", 3).unwrap()).unwrap();
/// let b = builder.add_leaf("b", dna.encode("AGT", 3).unwrap()).unwrap();
/// let root = builder.add_internal(None, vec![a, b]).unwrap();
/// let tree = builder.build(root).unwrap();
///
/// assert_eq!(tree.num_leaves(), 2);
/// assert_eq!(tree[a].parent(), Some(root));
/// assert!(tree[root].label().is_empty());
/// ```
#[derive(Debug)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    label_length: usize,
}

impl TreeBuilder {
    pub fn new(label_length: usize) -> Result<Self> {
        if label_length == 0 {
            return Err(ParsimonyError::ZeroLabelLength);
        }
        Ok(TreeBuilder {
            nodes: Vec::new(),
            label_length,
        })
    }

    pub fn label_length(&self) -> usize {
        self.label_length
    }

    /// Adds a leaf carrying its observed sequence.
    ///
    /// The label must be completely filled and sized to the tree's label length.
    pub fn add_leaf(&mut self, name: impl Into<String>, label: Label) -> Result<NodeId> {
        let name = name.into();
        if label.capacity() != self.label_length || !label.is_full() {
            return Err(ParsimonyError::LabelLengthMismatch {
                leaf: name,
                expected: self.label_length,
                found: label.len(),
            });
        }
        Ok(self.push_node(Some(name), label, Vec::new()))
    }

    /// Adds an internal node over `children`, in the given order.
    ///
    /// Exactly two children are required.
    pub fn add_internal(&mut self, name: Option<String>, children: Vec<NodeId>) -> Result<NodeId> {
        let id = self.nodes.len();
        if children.len() != 2 {
            return Err(ParsimonyError::MalformedTopology {
                node: id,
                children: children.len(),
            });
        }
        for &child in &children {
            let node = self
                .nodes
                .get(child)
                .ok_or(ParsimonyError::UnknownNode(child))?;
            if let Some(parent) = node.parent {
                return Err(ParsimonyError::NodeReattached {
                    node: child,
                    parent,
                });
            }
        }
        if children[0] == children[1] {
            return Err(ParsimonyError::NodeReattached {
                node: children[1],
                parent: id,
            });
        }

        for &child in &children {
            self.nodes[child].parent = Some(id);
        }
        Ok(self.push_node(name, Label::empty(self.label_length), children))
    }

    /// Finishes construction with `root` as the root.
    ///
    /// Nodes not reachable from `root` are kept in the arena but ignored by
    /// traversal; `root` itself must not have a parent.
    pub fn build(self, root: NodeId) -> Result<Tree> {
        if self.nodes.is_empty() {
            return Err(ParsimonyError::EmptyTree);
        }
        let node = self.nodes.get(root).ok_or(ParsimonyError::UnknownNode(root))?;
        if node.parent.is_some() {
            return Err(ParsimonyError::RootHasParent(root));
        }

        Ok(Tree {
            nodes: self.nodes,
            root,
            label_length: self.label_length,
        })
    }

    fn push_node(&mut self, name: Option<String>, label: Label, children: Vec<NodeId>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            name,
            label,
            children,
            parent: None,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Alphabet;

    fn leaf(builder: &mut TreeBuilder, seq: &str) -> NodeId {
        let label = Alphabet::dna().encode(seq, builder.label_length()).unwrap();
        builder.add_leaf(seq, label).unwrap()
    }

    /// ```text
    ///        root
    ///       /    \
    ///     x       y
    ///    / \     / \
    ///  ACT ACT AGA AGT
    /// ```
    #[test]
    fn test_building_tree() {
        let mut builder = TreeBuilder::new(3).unwrap();
        let l0 = leaf(&mut builder, "ACT");
        let l1 = leaf(&mut builder, "ACT");
        let l2 = leaf(&mut builder, "AGA");
        let l3 = leaf(&mut builder, "AGT");
        let x = builder.add_internal(None, vec![l0, l1]).unwrap();
        let y = builder.add_internal(Some("y".into()), vec![l2, l3]).unwrap();
        let root = builder.add_internal(None, vec![x, y]).unwrap();
        let tree = builder.build(root).unwrap();

        assert_eq!(tree.len(), 7);
        assert_eq!(tree.num_leaves(), 4);
        assert_eq!(tree.num_internal(), 3);
        assert_eq!(tree.root(), root);
        assert!(tree[root].is_root());
        assert_eq!(tree[y].name(), Some("y"));
        assert_eq!(tree.children_pair(root).unwrap(), (x, y));
        assert_eq!(tree.sibling(x).unwrap(), Some(y));
        assert_eq!(tree.sibling(l3).unwrap(), Some(l2));
        assert_eq!(tree.sibling(root).unwrap(), None);
        assert!(!tree.is_fully_labeled());
    }

    #[test]
    fn test_ternary_node_rejected() {
        let mut builder = TreeBuilder::new(3).unwrap();
        let a = leaf(&mut builder, "ACT");
        let b = leaf(&mut builder, "ACG");
        let c = leaf(&mut builder, "ACA");
        let err = builder.add_internal(None, vec![a, b, c]).unwrap_err();
        assert!(matches!(
            err,
            ParsimonyError::MalformedTopology { node: 3, children: 3 }
        ));
    }

    #[test]
    fn test_unary_node_rejected() {
        let mut builder = TreeBuilder::new(3).unwrap();
        let a = leaf(&mut builder, "ACT");
        assert!(matches!(
            builder.add_internal(None, vec![a]),
            Err(ParsimonyError::MalformedTopology { children: 1, .. })
        ));
    }

    #[test]
    fn test_leaf_length_mismatch() {
        let mut builder = TreeBuilder::new(4).unwrap();
        let short = Alphabet::dna().encode("ACT", 4).unwrap();
        let err = builder.add_leaf("ACT", short).unwrap_err();
        assert!(matches!(
            err,
            ParsimonyError::LabelLengthMismatch { expected: 4, found: 3, .. }
        ));

        let other_capacity = Alphabet::dna().encode("ACT", 3).unwrap();
        assert!(builder.add_leaf("ACT", other_capacity).is_err());
    }

    #[test]
    fn test_child_attached_twice() {
        let mut builder = TreeBuilder::new(1).unwrap();
        let a = leaf(&mut builder, "A");
        let b = leaf(&mut builder, "C");
        let c = leaf(&mut builder, "G");
        let x = builder.add_internal(None, vec![a, b]).unwrap();
        assert!(matches!(
            builder.add_internal(None, vec![b, c]),
            Err(ParsimonyError::NodeReattached { node, parent }) if node == b && parent == x
        ));
        assert!(matches!(
            builder.add_internal(None, vec![c, c]),
            Err(ParsimonyError::NodeReattached { .. })
        ));
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(
            TreeBuilder::new(0),
            Err(ParsimonyError::ZeroLabelLength)
        ));
        assert!(matches!(
            TreeBuilder::new(2).unwrap().build(0),
            Err(ParsimonyError::EmptyTree)
        ));

        let mut builder = TreeBuilder::new(1).unwrap();
        let a = leaf(&mut builder, "A");
        let b = leaf(&mut builder, "C");
        builder.add_internal(None, vec![a, b]).unwrap();
        assert!(matches!(
            builder.build(a),
            Err(ParsimonyError::RootHasParent(id)) if id == a
        ));
    }

    #[test]
    fn test_single_leaf_tree() {
        let mut builder = TreeBuilder::new(2).unwrap();
        let a = leaf(&mut builder, "GT");
        let tree = builder.build(a).unwrap();
        assert!(tree.is_fully_labeled());
        assert_eq!(tree.num_internal(), 0);
    }
}
