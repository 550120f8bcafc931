//! Python binding layer for Fitch labeling.
//!
//! Provides Python functions that label Newick trees and return node records
//! together with the parsimony cost.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::alphabet::Alphabet;
use crate::error::ParsimonyError;
use crate::io::parse_newick;
use crate::parsimony::{small_parsimony, small_parsimony_batch, ParsimonyResult};

/// `(id, name, parent, children, label, cost)`
type PyNodeRecord = (usize, Option<String>, Option<usize>, Vec<usize>, String, Option<usize>);

/// Label the internal nodes of one Newick tree.
///
/// Args:
///     newick: Newick string whose leaf names are the leaf sequences
///     label_length: Symbols per sequence; inferred from the first leaf if None
///     alphabet: The four symbols in code order (default: "ACGT")
///
/// Returns:
///     A tuple of (nodes, total_cost) where nodes is a list of
///     (id, name, parent, children, label, cost) tuples indexed by id
///
/// Raises:
///     ValueError: If the tree is not binary, a leaf has the wrong length or
///     holds a symbol outside the alphabet
#[pyfunction]
#[pyo3(signature = (newick, label_length=None, alphabet="ACGT"))]
fn fitch_label(
    newick: &str,
    label_length: Option<usize>,
    alphabet: &str,
) -> PyResult<(Vec<PyNodeRecord>, usize)> {
    let alphabet = Alphabet::new(alphabet).map_err(to_py_err)?;
    let mut tree = parse_newick(newick, &alphabet, label_length).map_err(to_py_err)?;
    let result = small_parsimony(&mut tree, &alphabet).map_err(to_py_err)?;
    Ok(into_py_records(result))
}

/// Label many Newick trees in parallel.
///
/// Args:
///     newicks: List of Newick strings
///     label_length: Symbols per sequence; inferred per tree if None
///     alphabet: The four symbols in code order (default: "ACGT")
///
/// Returns:
///     A list with one (nodes, total_cost) tuple per input tree, in order
///
/// Raises:
///     ValueError: On the first tree that cannot be parsed or labeled
#[pyfunction]
#[pyo3(signature = (newicks, label_length=None, alphabet="ACGT"))]
fn fitch_label_many(
    newicks: Vec<String>,
    label_length: Option<usize>,
    alphabet: &str,
) -> PyResult<Vec<(Vec<PyNodeRecord>, usize)>> {
    let alphabet = Alphabet::new(alphabet).map_err(to_py_err)?;
    let trees = newicks
        .iter()
        .enumerate()
        .map(|(idx, newick)| {
            parse_newick(newick, &alphabet, label_length)
                .map_err(|e| PyValueError::new_err(format!("tree {idx}: {e}")))
        })
        .collect::<PyResult<Vec<_>>>()?;

    small_parsimony_batch(trees, &alphabet)
        .into_iter()
        .enumerate()
        .map(|(idx, result)| {
            result
                .map(into_py_records)
                .map_err(|e| PyValueError::new_err(format!("tree {idx}: {e}")))
        })
        .collect()
}

fn into_py_records(result: ParsimonyResult) -> (Vec<PyNodeRecord>, usize) {
    let records = result
        .records
        .into_iter()
        .map(|r| (r.id, r.name, r.parent, r.children, r.label, r.cost))
        .collect();
    (records, result.total_cost)
}

fn to_py_err(e: ParsimonyError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Python module definition
#[pymodule]
fn fitch_parsimony(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(fitch_label, m)?)?;
    m.add_function(wrap_pyfunction!(fitch_label_many, m)?)?;
    Ok(())
}
