//! Compressed sparse row storage over a semiring
//!
//! `CsrMatrix` keeps three arrays: `values[nnz]`, `col_index[nnz]` and
//! `row_offset[rows + 1]`. Row `r` owns the half-open range
//! `row_offset[r]..row_offset[r + 1]`, column indices inside a row are
//! strictly increasing and no stored value equals the semiring zero.

mod partition;

use semicsr_core::{validate_csr, Result, Semiring, SparseMatrix, SparseMatrixMut, Value};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

/// Sparse matrix in compressed row form
///
/// Mutation goes through `&mut self`, so a matrix that is shared with
/// worker threads cannot be written until every borrow has ended.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix<S: Semiring> {
    nrows: usize,
    ncols: usize,
    values: Vec<S::Value>,
    col_index: Vec<usize>,
    row_offset: Vec<usize>,
    _ring: PhantomData<S>,
}

impl<S: Semiring> CsrMatrix<S> {
    /// Create an all-absent `nrows x ncols` matrix
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            values: Vec::new(),
            col_index: Vec::new(),
            row_offset: vec![0; nrows + 1],
            _ring: PhantomData,
        }
    }

    /// Square matrix with the semiring one on the diagonal
    pub fn identity(n: usize) -> Self {
        let mut assembler = RowAssembler::new(n, n);
        for row in 0..n {
            assembler.push_row(&[(row, S::one())]);
        }
        assembler.finish()
    }

    /// Build from raw CSR arrays, checking every invariant
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        values: Vec<S::Value>,
        col_index: Vec<usize>,
        row_offset: Vec<usize>,
    ) -> Result<Self> {
        validate_csr(nrows, ncols, &values, &S::zero(), &col_index, &row_offset)?;

        Ok(Self {
            nrows,
            ncols,
            values,
            col_index,
            row_offset,
            _ring: PhantomData,
        })
    }

    /// Decompose into `(nrows, ncols, values, col_index, row_offset)`
    pub fn into_parts(self) -> (usize, usize, Vec<S::Value>, Vec<usize>, Vec<usize>) {
        (
            self.nrows,
            self.ncols,
            self.values,
            self.col_index,
            self.row_offset,
        )
    }

    /// Build from `(row, col, value)` triples in any order
    ///
    /// Zeros are dropped. When a coordinate repeats, the last triple wins.
    ///
    /// # Panics
    ///
    /// Panics if a triple lies outside `nrows x ncols`.
    pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, S::Value)>,
    {
        let mut triplets: Vec<_> = triplets.into_iter().collect();
        for &(row, col, _) in &triplets {
            assert!(
                row < nrows && col < ncols,
                "triple ({row}, {col}) outside {nrows}x{ncols} matrix"
            );
        }

        // Stable, so later duplicates stay after earlier ones
        triplets.sort_by_key(|&(row, col, _)| (row, col));

        let mut assembler = RowAssembler::new(nrows, ncols);
        let mut row_entries = Vec::new();
        let mut cursor = triplets.into_iter().peekable();

        for row in 0..nrows {
            row_entries.clear();
            while let Some(&(r, col, value)) = cursor.peek() {
                if r != row {
                    break;
                }
                cursor.next();
                let superseded = matches!(cursor.peek(), Some(&(nr, nc, _)) if nr == r && nc == col);
                if !superseded {
                    row_entries.push((col, value));
                }
            }
            assembler.push_row(&row_entries);
        }

        assembler.finish()
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Matrix dimensions as (rows, cols)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Whether the matrix is square
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Stored values, row by row
    pub fn values(&self) -> &[S::Value] {
        &self.values
    }

    /// Column index of each stored value
    pub fn col_index(&self) -> &[usize] {
        &self.col_index
    }

    /// Row offsets into `values` and `col_index`
    pub fn row_offset(&self) -> &[usize] {
        &self.row_offset
    }

    fn row_range(&self, row: usize) -> Range<usize> {
        self.row_offset[row]..self.row_offset[row + 1]
    }

    /// Value at a position, or the semiring zero if absent or out of bounds
    pub fn get(&self, row: usize, col: usize) -> S::Value {
        if row >= self.nrows || col >= self.ncols {
            return S::zero();
        }

        let range = self.row_range(row);
        self.col_index[range.clone()]
            .iter()
            .position(|&c| c == col)
            .map_or_else(S::zero, |i| self.values[range.start + i])
    }

    /// Store `value` at `(row, col)`
    ///
    /// Storing the zero removes an existing entry; storing a non-zero value
    /// inserts or overwrites. Cost is linear in the row length plus the
    /// number of following rows.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is outside the matrix.
    pub fn set(&mut self, value: S::Value, row: usize, col: usize) {
        assert!(
            row < self.nrows && col < self.ncols,
            "set({row}, {col}) outside {}x{} matrix",
            self.nrows,
            self.ncols
        );

        let range = self.row_range(row);
        let index = self.col_index[range.clone()]
            .iter()
            .position(|&c| col <= c)
            .map_or(range.end, |i| range.start + i);
        let found = index < range.end && self.col_index[index] == col;

        match (found, S::is_zero(value)) {
            (true, true) => {
                self.values.remove(index);
                self.col_index.remove(index);
                for offset in &mut self.row_offset[row + 1..] {
                    *offset -= 1;
                }
            }
            (true, false) => self.values[index] = value,
            (false, false) => {
                self.values.insert(index, value);
                self.col_index.insert(index, col);
                for offset in &mut self.row_offset[row + 1..] {
                    *offset += 1;
                }
            }
            (false, true) => {}
        }
    }

    /// Fill from a row-major dense slice, skipping zeros
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != nrows * ncols`.
    pub fn set_bulk(&mut self, data: &[S::Value]) {
        assert_eq!(
            data.len(),
            self.nrows * self.ncols,
            "dense input does not match {}x{} matrix",
            self.nrows,
            self.ncols
        );

        if self.ncols == 0 {
            return;
        }
        for (row, chunk) in data.chunks_exact(self.ncols).enumerate() {
            for (col, &value) in chunk.iter().enumerate() {
                self.set(value, row, col);
            }
        }
    }

    /// Stored entries of a row as `(col, value)` in ascending column order
    ///
    /// # Panics
    ///
    /// Panics if `row >= nrows`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, S::Value)> + '_ {
        let range = self.row_range(row);
        self.col_index[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// All stored entries as `(row, col, value)` in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, S::Value)> + '_ {
        (0..self.nrows).flat_map(move |row| self.row(row).map(move |(col, value)| (row, col, value)))
    }

    /// Re-check every storage invariant
    pub fn check_invariants(&self) -> Result<()> {
        validate_csr(
            self.nrows,
            self.ncols,
            &self.values,
            &S::zero(),
            &self.col_index,
            &self.row_offset,
        )
    }
}

impl<S: Semiring> SparseMatrix for CsrMatrix<S> {
    type Ring = S;

    fn nrows(&self) -> usize {
        self.nrows
    }

    fn ncols(&self) -> usize {
        self.ncols
    }

    fn nnz(&self) -> usize {
        self.values.len()
    }

    fn get(&self, row: usize, col: usize) -> Value<S> {
        CsrMatrix::get(self, row, col)
    }

    fn row_nonzeros(&self, row: usize) -> impl Iterator<Item = (usize, Value<S>)> + '_ {
        self.row(row)
    }
}

impl<S: Semiring> SparseMatrixMut for CsrMatrix<S> {
    fn set(&mut self, value: Value<S>, row: usize, col: usize) {
        CsrMatrix::set(self, value, row, col)
    }
}

impl<S: Semiring> fmt::Display for CsrMatrix<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for row in 0..self.nrows {
            if row != 0 {
                write!(f, "\n ")?;
            }
            write!(f, "[")?;
            for col in 0..self.ncols {
                if col != 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", self.get(row, col))?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}

/// Appends whole rows in order to build a matrix in O(nnz)
///
/// Entries of each pushed row must be in ascending column order; zeros are
/// dropped.
pub(crate) struct RowAssembler<S: Semiring> {
    matrix: CsrMatrix<S>,
    next_row: usize,
}

impl<S: Semiring> RowAssembler<S> {
    pub(crate) fn new(nrows: usize, ncols: usize) -> Self {
        Self {
            matrix: CsrMatrix::new(nrows, ncols),
            next_row: 0,
        }
    }

    pub(crate) fn push_row(&mut self, entries: &[(usize, S::Value)]) {
        assert!(self.next_row < self.matrix.nrows, "too many rows pushed");

        for &(col, value) in entries {
            debug_assert!(col < self.matrix.ncols);
            if !S::is_zero(value) {
                self.matrix.values.push(value);
                self.matrix.col_index.push(col);
            }
        }

        self.next_row += 1;
        self.matrix.row_offset[self.next_row] = self.matrix.values.len();
    }

    pub(crate) fn finish(self) -> CsrMatrix<S> {
        assert_eq!(self.next_row, self.matrix.nrows, "missing rows");
        self.matrix
    }
}
