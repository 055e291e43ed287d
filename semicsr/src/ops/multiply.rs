//! Semiring matrix multiplication

use super::accumulator::{row_product, AccumulatorPool, RowBuffer, SparseAccumulator};
use crate::matrix::{CsrMatrix, RowAssembler};
use crate::pool::{PoolConfig, ThreadPool};
use semicsr_core::{Result, Semiring, SparseMatrix};

fn assert_compatible<A: SparseMatrix, B: SparseMatrix>(a: &A, b: &B) {
    assert_eq!(
        a.ncols(),
        b.nrows(),
        "cannot multiply {}x{} by {}x{}",
        a.nrows(),
        a.ncols(),
        b.nrows(),
        b.ncols()
    );
}

/// `a · b` over the operands' semiring, one row at a time
///
/// Only the finished value of each output entry is compared against the
/// zero, so intermediate sums that cancel do not affect the result.
///
/// # Panics
///
/// Panics if `a.ncols() != b.nrows()`.
pub fn multiply<A, B>(a: &A, b: &B) -> CsrMatrix<A::Ring>
where
    A: SparseMatrix,
    B: SparseMatrix<Ring = A::Ring>,
{
    assert_compatible(a, b);

    let mut acc = SparseAccumulator::new(b.ncols());
    let mut row = RowBuffer::new();
    let mut assembler = RowAssembler::new(a.nrows(), b.ncols());

    for i in 0..a.nrows() {
        row_product(a, b, i, &mut acc, &mut row);
        assembler.push_row(row.entries());
    }

    assembler.finish()
}

/// `a · b` with one pool task per output row
///
/// Each task fills its own [`RowBuffer`]; rows are appended to the result
/// after the pool has drained. The result is identical to [`multiply`].
///
/// # Errors
///
/// Returns `CsrError::PoolSpawn` if the worker threads cannot be started.
///
/// # Panics
///
/// Panics if `a.ncols() != b.nrows()`.
pub fn multiply_concurrent<A, B>(a: &A, b: &B, config: &PoolConfig) -> Result<CsrMatrix<A::Ring>>
where
    A: SparseMatrix + Sync,
    B: SparseMatrix<Ring = A::Ring> + Sync,
{
    assert_compatible(a, b);

    let (nrows, ncols) = (a.nrows(), b.ncols());
    let mut rows: Vec<RowBuffer<_>> = (0..nrows).map(|_| RowBuffer::new()).collect();
    log::debug!("multiply: {nrows} row tasks over {} workers", config.workers);

    let accumulators = AccumulatorPool::new(ncols, config.workers);
    std::thread::scope(|scope| -> Result<()> {
        let pool = ThreadPool::new(scope, config)?;
        for (i, out) in rows.iter_mut().enumerate() {
            let accumulators = &accumulators;
            pool.submit(move || accumulators.with(|acc| row_product(a, b, i, acc, out)));
        }
        pool.join();
        Ok(())
    })?;
    log::trace!("multiply: {} accumulators allocated", accumulators.allocated());

    let mut assembler = RowAssembler::new(nrows, ncols);
    for row in &rows {
        assembler.push_row(row.entries());
    }
    Ok(assembler.finish())
}

/// Entrywise semiring sum of two equally sized matrices
///
/// # Panics
///
/// Panics if the dimensions differ.
pub fn combine<S: Semiring>(a: &CsrMatrix<S>, b: &CsrMatrix<S>) -> CsrMatrix<S> {
    assert_eq!(
        a.dimensions(),
        b.dimensions(),
        "cannot combine matrices of different dimensions"
    );

    let mut assembler = RowAssembler::new(a.nrows(), a.ncols());
    let mut merged = Vec::new();

    for row in 0..a.nrows() {
        merged.clear();
        let mut left = a.row(row).peekable();
        let mut right = b.row(row).peekable();

        loop {
            let entry = match (left.peek(), right.peek()) {
                (Some(&(lc, lv)), Some(&(rc, rv))) => {
                    if lc == rc {
                        left.next();
                        right.next();
                        (lc, S::add(lv, rv))
                    } else if lc < rc {
                        left.next();
                        (lc, lv)
                    } else {
                        right.next();
                        (rc, rv)
                    }
                }
                (Some(&l), None) => {
                    left.next();
                    l
                }
                (None, Some(&r)) => {
                    right.next();
                    r
                }
                (None, None) => break,
            };
            merged.push(entry);
        }

        assembler.push_row(&merged);
    }

    assembler.finish()
}
