//! semicsr - concurrent sparse matrices over semirings
//!
//! This library stores sparse matrices in compressed row form and multiplies
//! them over a pluggable semiring, sequentially, on a scoped worker pool, or
//! by block recursion. Over the tropical (min-plus) semiring repeated
//! squaring yields all-pairs shortest paths.
//!
//! ## Architecture
//!
//! semicsr follows a definitions/implementation split:
//!
//! - **semicsr-core**: semirings, element types, capability traits, the
//!   snapshot format and validation (no I/O, no threads)
//! - **semicsr**: the CSR store, the thread pool, the operations and the
//!   file collaborators
//!
//! ## Quick Start
//!
//! ```rust
//! use semicsr::{diamond_closure, multiply, Arithmetic, CsrMatrix, Tropical};
//!
//! let mut m = CsrMatrix::<Arithmetic<i64>>::new(3, 3);
//! m.set_bulk(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
//! assert_eq!(multiply(&m, &m).get(2, 2), 150);
//!
//! let mut g = CsrMatrix::<Tropical<f64>>::new(3, 3);
//! g.set(1.0, 0, 1);
//! g.set(2.0, 1, 2);
//! assert_eq!(diamond_closure(&g).get(0, 2), 3.0);
//! ```
//!
//! ## Features
//!
//! - **mmap** (default): memory-mapped snapshot loading
//! - **serde**: serde derives on configuration and header types
//! - **cli**: dependencies of the `bench` example

pub use semicsr_core::{
    // Algebra
    Arithmetic, Semiring, Tropical, Value,
    // Core traits
    MatrixElement, SparseMatrix, SparseMatrixMut,
    // Format definitions
    DataType, SnapshotHeader,
    // Error handling
    CsrError, ErrorCategory, Result,
};

pub mod dimacs;
pub mod matrix;
pub mod ops;
pub mod pool;
pub mod snapshot;

pub use matrix::CsrMatrix;
pub use ops::{
    block_diamond_closure, block_diamond_step, block_multiply, block_multiply_parallel, combine,
    diamond_closure, diamond_closure_concurrent, diamond_closure_linear, diamond_step,
    diamond_step_concurrent, multiply, multiply_concurrent, BlockConfig, RowBuffer,
    TropicalMatrix,
};
pub use pool::{PoolConfig, PoolState, PoolStats, ThreadPool};
