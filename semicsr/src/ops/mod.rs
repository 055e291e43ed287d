//! Matrix operations over semirings
//!
//! - [`multiply`] / [`multiply_concurrent`]: row-by-row products, the
//!   latter with one pool task per output row
//! - [`diamond_closure`] and friends: min-plus powers for path problems
//! - [`block`]: divide-and-conquer variants on power-of-two squares
//!
//! All flat operations accept any [`SparseMatrix`](semicsr_core::SparseMatrix)
//! implementation.

mod accumulator;
pub mod block;
mod diamond;
mod multiply;

pub use accumulator::RowBuffer;
pub use block::{
    block_diamond_closure, block_diamond_step, block_multiply, block_multiply_parallel, BlockConfig,
};
pub use diamond::{
    diamond_closure, diamond_closure_concurrent, diamond_closure_linear, diamond_step,
    diamond_step_concurrent, TropicalMatrix,
};
pub use multiply::{combine, multiply, multiply_concurrent};
