//! Storage capability traits
//!
//! Operations are written once against these traits; any storage that can
//! answer point lookups and enumerate a row's nonzeros in ascending column
//! order can take part in a product.

use crate::semiring::{Semiring, Value};

/// Read access to a sparse matrix over a semiring
pub trait SparseMatrix {
    /// Semiring the stored values belong to
    type Ring: Semiring;

    /// Number of rows
    fn nrows(&self) -> usize;

    /// Number of columns
    fn ncols(&self) -> usize;

    /// Matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize) {
        (self.nrows(), self.ncols())
    }

    /// Number of stored (non-zero) entries
    fn nnz(&self) -> usize;

    /// Value at a position
    ///
    /// Returns the semiring zero if the entry is absent or the position is
    /// out of bounds.
    fn get(&self, row: usize, col: usize) -> Value<Self::Ring>;

    /// Stored entries of a row as `(col, value)` in ascending column order
    fn row_nonzeros(&self, row: usize) -> impl Iterator<Item = (usize, Value<Self::Ring>)> + '_;

    /// Whether a row has no stored entries
    fn row_is_empty(&self, row: usize) -> bool {
        self.row_nonzeros(row).next().is_none()
    }

    /// Whether the matrix is square
    fn is_square(&self) -> bool {
        self.nrows() == self.ncols()
    }
}

/// Single-writer mutation of a sparse matrix
pub trait SparseMatrixMut: SparseMatrix {
    /// Store `value` at a position; storing the zero removes the entry
    fn set(&mut self, value: Value<Self::Ring>, row: usize, col: usize);
}
