//! Translation of packed labels back to symbol strings.

use crate::alphabet::Alphabet;
use crate::error::{ParsimonyError, Result};
use crate::label::Label;
use crate::tree::{NodeId, Tree};

/// Decodes a full label, lowest slot first.
///
/// # Example
/// ```
/// # use fitch_parsimony::alphabet::Alphabet;
/// # use fitch_parsimony::decode::decode_label;
/// let dna = Alphabet::dna();
/// let label = dna.encode("TGCA", 4).unwrap();
/// assert_eq!(decode_label(0, &label, &dna).unwrap(), "TGCA");
///
/// let partial = dna.encode("TG", 4).unwrap();
/// assert!(decode_label(0, &partial, &dna).is_err());
/// ```
pub fn decode_label(node: NodeId, label: &Label, alphabet: &Alphabet) -> Result<String> {
    if !label.is_full() {
        return Err(ParsimonyError::IncompleteLabel {
            node,
            filled: label.len(),
            expected: label.capacity(),
        });
    }

    label
        .codes()
        .enumerate()
        .map(|(slot, code)| {
            alphabet
                .symbol(code)
                .ok_or(ParsimonyError::InvalidCode { code, slot })
        })
        .collect()
}

/// Decoded labels of a whole tree, indexed by [`NodeId`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedTree {
    labels: Vec<String>,
}

impl DecodedTree {
    /// Decodes every node of `tree`, leaves included.
    pub fn from_tree(tree: &Tree, alphabet: &Alphabet) -> Result<Self> {
        let labels = tree
            .nodes()
            .map(|node| decode_label(node.id(), node.label(), alphabet))
            .collect::<Result<Vec<_>>>()?;
        Ok(DecodedTree { labels })
    }

    pub fn get(&self, id: NodeId) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<String> {
        self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labeler::label_tree;
    use crate::tree::TreeBuilder;

    #[test]
    fn test_leaves_round_trip() {
        let dna = Alphabet::dna();
        let sequences = ["GATTACA", "GATTACC", "CATTACA"];
        let mut b = TreeBuilder::new(7).unwrap();
        let ids: Vec<_> = sequences
            .iter()
            .map(|s| b.add_leaf(*s, dna.encode(s, 7).unwrap()).unwrap())
            .collect();
        let inner = b.add_internal(None, vec![ids[0], ids[1]]).unwrap();
        let root = b.add_internal(None, vec![inner, ids[2]]).unwrap();
        let mut tree = b.build(root).unwrap();
        label_tree(&mut tree).unwrap();

        let decoded = DecodedTree::from_tree(&tree, &dna).unwrap();
        for (id, seq) in ids.iter().zip(sequences) {
            assert_eq!(decoded.get(*id), Some(seq));
        }
        assert_eq!(decoded.get(inner), Some("GATTACA"));
    }

    #[test]
    fn test_unlabeled_tree_fails() {
        let dna = Alphabet::dna();
        let mut b = TreeBuilder::new(2).unwrap();
        let x = b.add_leaf("AC", dna.encode("AC", 2).unwrap()).unwrap();
        let y = b.add_leaf("AG", dna.encode("AG", 2).unwrap()).unwrap();
        let root = b.add_internal(None, vec![x, y]).unwrap();
        let tree = b.build(root).unwrap();

        let err = DecodedTree::from_tree(&tree, &dna).unwrap_err();
        assert!(matches!(
            err,
            ParsimonyError::IncompleteLabel { node, filled: 0, expected: 2 } if node == root
        ));
    }

    #[test]
    fn test_custom_alphabet() {
        let rna = Alphabet::new("ACGU").unwrap();
        let label = Label::from_codes(3, &[3, 3, 0]).unwrap();
        assert_eq!(decode_label(0, &label, &rna).unwrap(), "UUA");
    }
}
