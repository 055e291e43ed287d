//! DIMACS shortest-path graph loader
//!
//! Accepts the `.gr` text format of the 9th DIMACS challenge:
//!
//! ```text
//! c comment
//! p sp <nodes> <arcs>
//! a <from> <to> <weight>
//! ```
//!
//! Node ids are 1-based in the file and 0-based in the matrix. When an arc
//! appears more than once the lightest copy is kept.

use crate::matrix::CsrMatrix;
use crate::ops::TropicalMatrix;
use hashbrown::HashMap;
use semicsr_core::validation::{checked_byte_size, validate_array_bounds};
use semicsr_core::{CsrError, MatrixElement, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Arcs of a parsed graph
#[derive(Debug, Clone, PartialEq)]
pub struct DimacsGraph<T> {
    /// Node count from the problem line
    pub nodes: usize,
    /// Arc count announced by the problem line
    pub declared_arcs: usize,
    /// Deduplicated `(from, to, weight)` arcs, 0-based, sorted by
    /// `(from, to)`
    pub arcs: Vec<(usize, usize, T)>,
}

impl<T: MatrixElement> DimacsGraph<T> {
    /// Tropical adjacency matrix of the graph
    pub fn into_matrix(self) -> TropicalMatrix<T> {
        CsrMatrix::from_triplets(self.nodes, self.nodes, self.arcs)
    }
}

fn parse_field<F: std::str::FromStr>(field: Option<&str>, line_no: usize) -> Result<F> {
    field.and_then(|s| s.parse().ok()).ok_or_else(|| {
        log::error!("line {line_no}: missing or malformed field");
        CsrError::Parse
    })
}

fn parse_node(field: Option<&str>, nodes: usize, line_no: usize) -> Result<usize> {
    let id: usize = parse_field(field, line_no)?;
    if id == 0 || id > nodes {
        log::error!("line {line_no}: node {id} outside 1..={nodes}");
        return Err(CsrError::IndexOutOfBounds);
    }
    Ok(id - 1)
}

/// Reject node counts whose row offsets could not be addressed
fn check_node_count(nodes: usize, line_no: usize) -> Result<()> {
    let offsets = nodes.checked_add(1).ok_or(CsrError::ArraySizeOverflow);
    offsets
        .and_then(|len| checked_byte_size(len, std::mem::size_of::<usize>()))
        .and_then(validate_array_bounds::<u8>)
        .map(|_| ())
        .inspect_err(|_| log::error!("line {line_no}: node count {nodes} too large"))
}

/// Parse a DIMACS graph from a reader
///
/// # Errors
///
/// `CsrError::ArraySizeOverflow` when the problem line announces more
/// nodes than a matrix can index, `CsrError::IndexOutOfBounds` for arcs
/// naming unknown nodes and `CsrError::Parse` for malformed lines.
pub fn parse<T: MatrixElement, R: BufRead>(reader: R) -> Result<DimacsGraph<T>> {
    let mut problem: Option<(usize, usize)> = None;
    let mut weights: HashMap<(usize, usize), T> = HashMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|err| {
            log::error!("line {line_no}: {err}");
            CsrError::Io
        })?;

        let mut fields = line.split_whitespace();
        match fields.next() {
            None | Some("c") => {}
            Some("p") => {
                if problem.is_some() || fields.next() != Some("sp") {
                    log::error!("line {line_no}: expected a single `p sp` problem line");
                    return Err(CsrError::Parse);
                }
                let nodes: usize = parse_field(fields.next(), line_no)?;
                check_node_count(nodes, line_no)?;
                let arcs: usize = parse_field(fields.next(), line_no)?;
                weights.reserve(arcs.min(1 << 20));
                problem = Some((nodes, arcs));
            }
            Some("a") => {
                let Some((nodes, _)) = problem else {
                    log::error!("line {line_no}: arc before problem line");
                    return Err(CsrError::Parse);
                };
                let from = parse_node(fields.next(), nodes, line_no)?;
                let to = parse_node(fields.next(), nodes, line_no)?;
                let weight: T = parse_field(fields.next(), line_no)?;

                weights
                    .entry((from, to))
                    .and_modify(|w| *w = w.minimum(weight))
                    .or_insert(weight);
            }
            Some(other) => {
                log::error!("line {line_no}: unknown record type {other:?}");
                return Err(CsrError::Parse);
            }
        }
    }

    let Some((nodes, declared_arcs)) = problem else {
        log::error!("no problem line");
        return Err(CsrError::Parse);
    };

    let mut arcs: Vec<_> = weights.into_iter().map(|((u, v), w)| (u, v, w)).collect();
    arcs.sort_unstable_by_key(|&(u, v, _)| (u, v));

    if arcs.len() != declared_arcs {
        log::debug!("{declared_arcs} arcs declared, {} distinct arcs read", arcs.len());
    }

    Ok(DimacsGraph {
        nodes,
        declared_arcs,
        arcs,
    })
}

/// Load a DIMACS file straight into a tropical matrix
pub fn load<T: MatrixElement, P: AsRef<Path>>(path: P) -> Result<TropicalMatrix<T>> {
    let file = File::open(path.as_ref()).map_err(|err| {
        log::error!("failed to open {}: {err}", path.as_ref().display());
        CsrError::Io
    })?;
    Ok(parse(BufReader::new(file))?.into_matrix())
}
