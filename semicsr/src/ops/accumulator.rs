//! Per-row product kernel shared by every multiply variant

use crossbeam_channel::{Receiver, Sender};
use semicsr_core::{Semiring, SparseMatrix, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Private output of one row product: `(col, value)` in ascending column
/// order, zeros already pruned
#[derive(Debug, Clone, PartialEq)]
pub struct RowBuffer<V> {
    entries: Vec<(usize, V)>,
}

impl<V> Default for RowBuffer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RowBuffer<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[(usize, V)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Dense scratch row indexed by output column
///
/// `touched` records which columns received a product so draining costs
/// O(k log k) in the number of touched columns, not O(ncols).
pub(crate) struct SparseAccumulator<S: Semiring> {
    values: Vec<S::Value>,
    occupied: Vec<bool>,
    touched: Vec<usize>,
}

impl<S: Semiring> SparseAccumulator<S> {
    pub(crate) fn new(ncols: usize) -> Self {
        Self {
            values: vec![S::zero(); ncols],
            occupied: vec![false; ncols],
            touched: Vec::new(),
        }
    }

    #[inline]
    fn accumulate(&mut self, col: usize, product: S::Value) {
        if !self.occupied[col] {
            self.occupied[col] = true;
            self.touched.push(col);
        }
        self.values[col] = S::add(self.values[col], product);
    }

    /// Move the accumulated row into `out`, dropping zeros, and reset
    fn drain_into(&mut self, out: &mut RowBuffer<S::Value>) {
        out.clear();
        self.touched.sort_unstable();

        for &col in &self.touched {
            let value = std::mem::replace(&mut self.values[col], S::zero());
            self.occupied[col] = false;
            if !S::is_zero(value) {
                out.entries.push((col, value));
            }
        }
        self.touched.clear();
    }
}

/// Accumulators recycled between the row tasks of one concurrent product
///
/// A task takes an idle accumulator or allocates one when none is free, and
/// hands it back when its row is done. Since a pool of `n` workers runs at
/// most `n` tasks at once, at most `n` accumulators are ever allocated.
pub(crate) struct AccumulatorPool<S: Semiring> {
    ncols: usize,
    idle_tx: Sender<SparseAccumulator<S>>,
    idle_rx: Receiver<SparseAccumulator<S>>,
    allocated: AtomicUsize,
}

impl<S: Semiring> AccumulatorPool<S> {
    pub(crate) fn new(ncols: usize, workers: usize) -> Self {
        let (idle_tx, idle_rx) = crossbeam_channel::bounded(workers.max(1));
        Self {
            ncols,
            idle_tx,
            idle_rx,
            allocated: AtomicUsize::new(0),
        }
    }

    /// Run `f` with an accumulator sized for the output width
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut SparseAccumulator<S>) -> R) -> R {
        let mut acc = self.idle_rx.try_recv().unwrap_or_else(|_| {
            self.allocated.fetch_add(1, Ordering::Relaxed);
            SparseAccumulator::new(self.ncols)
        });
        let result = f(&mut acc);
        // A full queue only means another task already returned enough
        let _ = self.idle_tx.try_send(acc);
        result
    }

    /// Accumulators allocated so far
    pub(crate) fn allocated(&self) -> usize {
        self.allocated.load(Ordering::Relaxed)
    }
}

/// `out = a[row, :] · b` over the shared semiring
///
/// Products are folded into each output column in the order A's row, then
/// B's row, visits them; every multiply variant goes through here so the
/// accumulation order is the same everywhere.
pub(crate) fn row_product<A, B>(
    a: &A,
    b: &B,
    row: usize,
    acc: &mut SparseAccumulator<A::Ring>,
    out: &mut RowBuffer<Value<A::Ring>>,
) where
    A: SparseMatrix,
    B: SparseMatrix<Ring = A::Ring>,
{
    for (k, a_val) in a.row_nonzeros(row) {
        for (j, b_val) in b.row_nonzeros(k) {
            acc.accumulate(j, <A::Ring as Semiring>::mul(a_val, b_val));
        }
    }
    acc.drain_into(out);
}
