//! Quadrant extraction, reassembly and power-of-two padding

use super::{CsrMatrix, RowAssembler};
use semicsr_core::{padded_side, Semiring};

impl<S: Semiring> CsrMatrix<S> {
    /// Copy of a `rows x cols` window starting at `(row0, col0)`
    fn window(&self, row0: usize, col0: usize, rows: usize, cols: usize) -> Self {
        let col_end = col0 + cols;
        let mut assembler = RowAssembler::new(rows, cols);
        let mut entries = Vec::new();

        for row in row0..row0 + rows {
            entries.clear();
            entries.extend(
                self.row(row)
                    .skip_while(|&(col, _)| col < col0)
                    .take_while(|&(col, _)| col < col_end)
                    .map(|(col, value)| (col - col0, value)),
            );
            assembler.push_row(&entries);
        }

        assembler.finish()
    }

    /// Extract the half-size quadrant whose top-left corner is
    /// `(offset_row, offset_col)`
    ///
    /// # Panics
    ///
    /// Panics if either dimension is odd or the quadrant does not fit.
    pub fn partition(&self, offset_row: usize, offset_col: usize) -> Self {
        assert!(
            self.nrows % 2 == 0 && self.ncols % 2 == 0,
            "cannot partition {}x{} matrix with an odd dimension",
            self.nrows,
            self.ncols
        );

        let (rows, cols) = (self.nrows / 2, self.ncols / 2);
        assert!(
            offset_row + rows <= self.nrows && offset_col + cols <= self.ncols,
            "quadrant at ({offset_row}, {offset_col}) exceeds {}x{} matrix",
            self.nrows,
            self.ncols
        );

        self.window(offset_row, offset_col, rows, cols)
    }

    /// The four quadrants in order top-left, top-right, bottom-left,
    /// bottom-right
    pub fn quadrants(&self) -> [Self; 4] {
        let (h, w) = (self.nrows / 2, self.ncols / 2);
        [
            self.partition(0, 0),
            self.partition(0, w),
            self.partition(h, 0),
            self.partition(h, w),
        ]
    }

    /// Copy every stored entry of `self` into `dst`, shifted by the offset
    ///
    /// Entries already in `dst` at positions `self` leaves absent are kept.
    ///
    /// # Panics
    ///
    /// Panics if `self` does not fit inside `dst` at the offset.
    pub fn rebuild(&self, dst: &mut Self, offset_row: usize, offset_col: usize) {
        assert!(
            offset_row + self.nrows <= dst.nrows && offset_col + self.ncols <= dst.ncols,
            "{}x{} block at ({offset_row}, {offset_col}) exceeds {}x{} matrix",
            self.nrows,
            self.ncols,
            dst.nrows,
            dst.ncols
        );

        for (row, col, value) in self.iter() {
            dst.set(value, row + offset_row, col + offset_col);
        }
    }

    /// Embed into the top-left corner of a square matrix whose side is the
    /// next power of two of `max(rows, cols)`, at least 2
    pub fn pad_to_power_of_two(&self) -> Self {
        let side = padded_side(self.nrows, self.ncols);

        let mut row_offset = self.row_offset.clone();
        row_offset.resize(side + 1, self.nnz());

        Self {
            nrows: side,
            ncols: side,
            values: self.values.clone(),
            col_index: self.col_index.clone(),
            row_offset,
            _ring: self._ring,
        }
    }

    /// Top-left `rows x cols` corner, the inverse of padding
    ///
    /// # Panics
    ///
    /// Panics if the requested corner is larger than the matrix.
    pub fn restrict(&self, rows: usize, cols: usize) -> Self {
        assert!(
            rows <= self.nrows && cols <= self.ncols,
            "cannot restrict {}x{} matrix to {rows}x{cols}",
            self.nrows,
            self.ncols
        );

        self.window(0, 0, rows, cols)
    }
}
