//! Crate root: lightweight module orchestration and public re-exports.
//!
//! Modules:
//! - `label`: 2-bit packed, append-only symbol labels.
//! - `alphabet`: the 4-symbol table mapping characters to codes.
//! - `tree`: arena tree of labeled nodes and its validating builder.
//! - `traversal`: sibling-pair processing order for the labeler.
//! - `labeler`: the Fitch consensus / no-consensus labeling engine.
//! - `decode`: packed labels back to symbol strings.
//! - `cost`: per-edge Hamming distances and the parsimony score.
//! - `parsimony`: label + decode + score in one call, single or batched.
//! - `io`: Newick input and XML / TSV export.
//! - `api`: Python bindings via `pyo3` (gated behind "python" feature).

pub mod alphabet;
pub mod cost;
pub mod decode;
pub mod error;
pub mod io;
pub mod label;
pub mod labeler;
pub mod parsimony;
pub mod traversal;
pub mod tree;

#[cfg(feature = "python")]
pub mod api;

// Re-export frequently used types & functions
pub use alphabet::Alphabet;
pub use error::{ParsimonyError, Result};
pub use io::{parse_newick, read_newick_file, write_results_file};
pub use label::Label;
pub use parsimony::{small_parsimony, small_parsimony_batch, NodeRecord, ParsimonyResult};
pub use tree::{Node, NodeId, Tree, TreeBuilder};
