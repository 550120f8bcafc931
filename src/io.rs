//! Reading Newick trees and writing labeled trees.
//!
//! Input trees are Newick strings whose leaf names are the leaf sequences:
//!
//! ```text
//! (((ACT,ACT),(AGA,AGT)),(TGA,TCG));
//! ```
//!
//! Parsing is delegated to `phylotree`; the parsed tree is then copied into the
//! arena [`Tree`] with every leaf name encoded through an [`Alphabet`].
//!
//! Output is either a nested XML document (one element per node, carrying the
//! decoded label and the cost of the edge above it) or a flat TSV node table.
//! Paths ending in `.gz` are gzip-compressed, `-` writes to stdout.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use itertools::Itertools;
use phylotree::tree::Tree as PhyloTree;

use crate::alphabet::Alphabet;
use crate::error::{ParsimonyError, Result};
use crate::label::Label;
use crate::parsimony::ParsimonyResult;
use crate::tree::{NodeId, Tree, TreeBuilder};

/// Output layout for labeled trees.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    #[default]
    Xml,
    Tsv,
}

/// Splits text into Newick records.
///
/// A record ends at `;` or at the end of a line whose brackets are balanced,
/// so trees may span lines but a tree missing its `;` still stays on its own.
/// Blank lines and lines starting with `#` are ignored. Every returned record
/// ends with `;`.
///
/// # Example
/// ```
/// # use fitch_parsimony::io::split_newick_records;
/// let text = "# three trees\n(A,C);\n(G,\n T);\n(A,G)\n";
/// assert_eq!(split_newick_records(text), vec!["(A,C);", "(G,T);", "(A,G);"]);
/// ```
pub fn split_newick_records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;

    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for c in line.chars() {
            match c {
                ';' => {
                    push_record(&mut records, &mut current);
                    depth = 0;
                    continue;
                }
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                _ => {}
            }
            current.push(c);
        }
        if depth == 0 {
            push_record(&mut records, &mut current);
        }
    }
    push_record(&mut records, &mut current);
    records
}

fn push_record(records: &mut Vec<String>, current: &mut String) {
    let record = current.trim();
    if !record.is_empty() {
        records.push(format!("{record};"));
    }
    current.clear();
}

/// Reads all Newick records from a file, gzip-compressed if it ends in `.gz`.
pub fn read_newick_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let p = path.as_ref();
    let file = File::open(p)?;

    let mut content = String::new();
    if p.to_string_lossy().ends_with(".gz") {
        BufReader::new(GzDecoder::new(file)).read_to_string(&mut content)?;
    } else {
        BufReader::new(file).read_to_string(&mut content)?;
    }

    Ok(split_newick_records(&content))
}

/// Parses one Newick string into a tree ready for labeling.
///
/// When `label_length` is `None` it is taken from the first leaf; every leaf
/// must then have that many symbols. A record without brackets, such as
/// `ACT;`, is a tree of one leaf.
pub fn parse_newick(
    newick: &str,
    alphabet: &Alphabet,
    label_length: Option<usize>,
) -> Result<Tree> {
    let body = check_brackets(newick)?;
    if !body.starts_with('(') {
        return parse_single_leaf(body, alphabet, label_length);
    }

    let phylo = PhyloTree::from_newick(&format!("{body};"))
        .map_err(|e| ParsimonyError::Newick(e.to_string()))?;
    let root = phylo
        .get_root()
        .map_err(|e| ParsimonyError::Newick(e.to_string()))?;

    // pop order with children pushed in order; reversed, every node follows
    // its descendants
    let mut order = Vec::new();
    let mut work = vec![root];
    while let Some(id) = work.pop() {
        let node = phylo
            .get(&id)
            .map_err(|e| ParsimonyError::Newick(e.to_string()))?;
        order.push((id, node));
        work.extend(node.children.iter().copied());
    }
    order.reverse();

    let label_length = match label_length {
        Some(length) => length,
        None => order
            .iter()
            .find(|(_, node)| node.children.is_empty())
            .and_then(|(_, node)| node.name.as_ref())
            .map(|name| name.chars().count())
            .ok_or_else(|| ParsimonyError::Newick("tree has no named leaf".to_string()))?,
    };

    let mut builder = TreeBuilder::new(label_length)?;
    let mut ids: HashMap<usize, NodeId> = HashMap::with_capacity(order.len());

    for (phylo_id, node) in order {
        let name = node.name.clone().filter(|n| !n.is_empty());
        let id = if node.children.is_empty() {
            let name = name.ok_or_else(|| {
                ParsimonyError::Newick(format!("leaf {phylo_id} has no sequence"))
            })?;
            let label = leaf_label(&name, alphabet, label_length)?;
            builder.add_leaf(name, label)?
        } else {
            let children = node
                .children
                .iter()
                .map(|child| {
                    ids.get(child).copied().ok_or_else(|| {
                        ParsimonyError::Newick(format!("child {child} seen before its parent"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            builder.add_internal(name, children)?
        };
        ids.insert(phylo_id, id);
    }

    let root = ids
        .get(&root)
        .copied()
        .ok_or_else(|| ParsimonyError::Newick("root was not converted".to_string()))?;
    builder.build(root)
}

/// Checks the bracket structure of one record and returns it without its `;`.
///
/// `phylotree` panics on some malformed records, so those are rejected here.
fn check_brackets(newick: &str) -> Result<&str> {
    let record = newick.trim();
    let body = record.strip_suffix(';').unwrap_or(record).trim_end();
    if body.is_empty() {
        return Err(ParsimonyError::Newick("empty record".to_string()));
    }
    if body.contains(';') {
        return Err(ParsimonyError::Newick(
            "more than one tree in one record".to_string(),
        ));
    }
    if !body.starts_with('(') {
        if body.contains(['(', ')', ',']) {
            return Err(ParsimonyError::Newick(format!(
                "text before the opening bracket in {body:?}"
            )));
        }
        return Ok(body);
    }

    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    let rest = &body[i + 1..];
                    if rest.contains(['(', ')', ',']) {
                        return Err(ParsimonyError::Newick(format!(
                            "unexpected text after the closing bracket: {rest:?}"
                        )));
                    }
                    return Ok(body);
                }
            }
            _ => {}
        }
    }
    Err(ParsimonyError::Newick("missing a closing bracket".to_string()))
}

/// A record without brackets is a tree of one leaf, optionally with a
/// branch length.
fn parse_single_leaf(
    body: &str,
    alphabet: &Alphabet,
    label_length: Option<usize>,
) -> Result<Tree> {
    let name = body.split_once(':').map_or(body, |(name, _)| name).trim();
    if name.is_empty() {
        return Err(ParsimonyError::Newick("leaf has no sequence".to_string()));
    }
    let label_length = label_length.unwrap_or_else(|| name.chars().count());

    let mut builder = TreeBuilder::new(label_length)?;
    let label = leaf_label(name, alphabet, label_length)?;
    let leaf = builder.add_leaf(name, label)?;
    builder.build(leaf)
}

fn leaf_label(name: &str, alphabet: &Alphabet, label_length: usize) -> Result<Label> {
    let found = name.chars().count();
    if found != label_length {
        return Err(ParsimonyError::LabelLengthMismatch {
            leaf: name.to_string(),
            expected: label_length,
            found,
        });
    }
    alphabet.encode(name, label_length)
}

/// Opens `path` for writing; `-` is stdout, `.gz` is gzip-compressed.
pub fn open_output<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Write>> {
    let p = path.as_ref();
    if p.as_os_str() == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    }

    let is_gz = p.to_string_lossy().ends_with(".gz");

    let out: Box<dyn Write> = if is_gz {
        let f = File::create(p)?;
        let enc = GzEncoder::new(f, Compression::default());
        Box::new(BufWriter::new(enc))
    } else {
        Box::new(BufWriter::new(File::create(p)?))
    };
    Ok(out)
}

/// Writes named results to `path` in the requested format.
pub fn write_results_file<P: AsRef<Path>>(
    path: P,
    results: &[(String, ParsimonyResult)],
    format: OutputFormat,
) -> io::Result<()> {
    let mut out = open_output(path)?;
    match format {
        OutputFormat::Xml => write_xml(&mut out, results)?,
        OutputFormat::Tsv => write_node_table(&mut out, results)?,
    }
    out.flush()
}

/// Writes results as nested XML, one `<tree>` per result.
///
/// The root's cost is `NA`; every other node's cost is the Hamming distance
/// to its parent.
pub fn write_xml<W: Write>(mut out: W, results: &[(String, ParsimonyResult)]) -> io::Result<()> {
    enum Step {
        Open(NodeId, usize),
        Close(usize),
    }

    writeln!(out, "<?xml version=\"1.0\" ?>")?;
    writeln!(out, "<forest>")?;
    for (name, result) in results {
        writeln!(
            out,
            "\t<tree name=\"{}\" cost=\"{}\">",
            escape_xml(name),
            result.total_cost
        )?;

        let mut work = vec![Step::Open(result.root, 2)];
        while let Some(step) = work.pop() {
            match step {
                Step::Open(id, depth) => {
                    let record = &result.records[id];
                    let indent = "\t".repeat(depth);
                    write!(out, "{indent}<node id=\"{id}\"")?;
                    if let Some(name) = &record.name {
                        write!(out, " name=\"{}\"", escape_xml(name))?;
                    }
                    write!(out, " label=\"{}\" cost=\"", escape_xml(&record.label))?;
                    match record.cost {
                        Some(cost) => write!(out, "{cost}")?,
                        None => write!(out, "NA")?,
                    }
                    if record.children.is_empty() {
                        writeln!(out, "\"/>")?;
                    } else {
                        writeln!(out, "\">")?;
                        work.push(Step::Close(depth));
                        work.extend(
                            record
                                .children
                                .iter()
                                .rev()
                                .map(|&child| Step::Open(child, depth + 1)),
                        );
                    }
                }
                Step::Close(depth) => {
                    writeln!(out, "{}</node>", "\t".repeat(depth))?;
                }
            }
        }
        writeln!(out, "\t</tree>")?;
    }
    writeln!(out, "</forest>")?;
    Ok(())
}

/// Writes results as a TSV table with one row per node.
///
/// Columns: tree, id, name, parent, children, label, cost. Missing values are
/// written as `NA`.
pub fn write_node_table<W: Write>(
    mut out: W,
    results: &[(String, ParsimonyResult)],
) -> io::Result<()> {
    writeln!(out, "tree\tid\tname\tparent\tchildren\tlabel\tcost")?;
    for (name, result) in results {
        for record in &result.records {
            let parent = record
                .parent
                .map_or_else(|| "NA".to_string(), |p| p.to_string());
            let children = if record.children.is_empty() {
                "NA".to_string()
            } else {
                record.children.iter().join(",")
            };
            let cost = record
                .cost
                .map_or_else(|| "NA".to_string(), |c| c.to_string());
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                name,
                record.id,
                record.name.as_deref().unwrap_or("NA"),
                parent,
                children,
                record.label,
                cost
            )?;
        }
    }
    Ok(())
}

fn escape_xml(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
