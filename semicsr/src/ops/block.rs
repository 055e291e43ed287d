//! Block-recursive products over power-of-two squares
//!
//! Each operand is split into quadrants `0 1 / 2 3` and the product is
//!
//! ```text
//! r0 = a0·b0 ⊕ a1·b2    r1 = a0·b1 ⊕ a1·b3
//! r2 = a2·b0 ⊕ a3·b2    r3 = a2·b1 ⊕ a3·b3
//! ```
//!
//! down to 2x2 blocks, which are evaluated directly. Inputs of other shapes
//! go through [`CsrMatrix::pad_to_power_of_two`] first.

use super::diamond::{power_by_squaring, TropicalMatrix};
use super::multiply::combine;
use crate::matrix::CsrMatrix;
use semicsr_core::{validate_block_side, MatrixElement, Semiring};
use std::convert::Infallible;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for [`block_multiply_parallel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BlockConfig {
    /// Recursion levels whose eight sub-products run in parallel
    pub parallel_depth: usize,
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self { parallel_depth: 2 }
    }
}

impl BlockConfig {
    /// Set the parallel recursion depth; 0 runs fully sequentially
    pub fn with_parallel_depth(mut self, depth: usize) -> Self {
        self.parallel_depth = depth;
        self
    }
}

fn assert_block_operands<S: Semiring>(a: &CsrMatrix<S>, b: &CsrMatrix<S>) {
    assert!(
        a.is_square() && a.dimensions() == b.dimensions() && validate_block_side(a.nrows()).is_ok(),
        "block operands must be equal power-of-two squares of side >= 2, got {}x{} and {}x{}",
        a.nrows(),
        a.ncols(),
        b.nrows(),
        b.ncols()
    );
}

/// Direct 2x2 product
fn base_product<S: Semiring>(a: &CsrMatrix<S>, b: &CsrMatrix<S>) -> CsrMatrix<S> {
    let mut result = CsrMatrix::new(2, 2);
    for i in 0..2 {
        for j in 0..2 {
            let mut acc = S::zero();
            for k in 0..2 {
                let (x, y) = (a.get(i, k), b.get(k, j));
                if !S::is_zero(x) && !S::is_zero(y) {
                    acc = S::add(acc, S::mul(x, y));
                }
            }
            result.set(acc, i, j);
        }
    }
    result
}

fn assemble<S: Semiring>(side: usize, blocks: [CsrMatrix<S>; 4]) -> CsrMatrix<S> {
    let half = side / 2;
    let mut result = CsrMatrix::new(side, side);
    for (block, (row, col)) in blocks.iter().zip([(0, 0), (0, half), (half, 0), (half, half)]) {
        block.rebuild(&mut result, row, col);
    }
    result
}

fn recurse<S: Semiring>(
    a: &CsrMatrix<S>,
    b: &CsrMatrix<S>,
    depth: usize,
    parallel_depth: usize,
) -> CsrMatrix<S> {
    let side = a.nrows();
    if side == 2 {
        return base_product(a, b);
    }

    let [a0, a1, a2, a3] = a.quadrants();
    let [b0, b1, b2, b3] = b.quadrants();
    let next = depth + 1;
    let half = |x: &CsrMatrix<S>, y: &CsrMatrix<S>, u: &CsrMatrix<S>, v: &CsrMatrix<S>| {
        combine(&recurse(x, y, next, parallel_depth), &recurse(u, v, next, parallel_depth))
    };

    let blocks = if depth < parallel_depth {
        let ((r0, r1), (r2, r3)) = rayon::join(
            || {
                rayon::join(
                    || half(&a0, &b0, &a1, &b2),
                    || half(&a0, &b1, &a1, &b3),
                )
            },
            || {
                rayon::join(
                    || half(&a2, &b0, &a3, &b2),
                    || half(&a2, &b1, &a3, &b3),
                )
            },
        );
        [r0, r1, r2, r3]
    } else {
        [
            half(&a0, &b0, &a1, &b2),
            half(&a0, &b1, &a1, &b3),
            half(&a2, &b0, &a3, &b2),
            half(&a2, &b1, &a3, &b3),
        ]
    };

    assemble(side, blocks)
}

/// Block-recursive `a · b`
///
/// # Panics
///
/// Panics unless both operands are squares of the same power-of-two side,
/// at least 2.
pub fn block_multiply<S: Semiring>(a: &CsrMatrix<S>, b: &CsrMatrix<S>) -> CsrMatrix<S> {
    assert_block_operands(a, b);
    recurse(a, b, 0, 0)
}

/// [`block_multiply`] with the top `config.parallel_depth` levels forked
/// onto the rayon pool
pub fn block_multiply_parallel<S: Semiring>(
    a: &CsrMatrix<S>,
    b: &CsrMatrix<S>,
    config: &BlockConfig,
) -> CsrMatrix<S> {
    assert_block_operands(a, b);
    recurse(a, b, 0, config.parallel_depth)
}

/// Block-recursive diamond product
pub fn block_diamond_step<T: MatrixElement>(a: &TropicalMatrix<T>, b: &TropicalMatrix<T>) -> TropicalMatrix<T> {
    block_multiply(a, b)
}

/// Path closure using block-recursive steps on a padded copy
///
/// Padding adds isolated vertices, which never shorten a walk between
/// original vertices, so the result restricted to the original size equals
/// the flat closure.
///
/// # Panics
///
/// Panics if `a` is not square.
pub fn block_diamond_closure<T: MatrixElement>(a: &TropicalMatrix<T>) -> TropicalMatrix<T> {
    assert!(
        a.is_square(),
        "diamond closure needs a square matrix, got {}x{}",
        a.nrows(),
        a.ncols()
    );

    let n = a.nrows();
    if n <= 1 {
        return a.clone();
    }

    let padded = a.pad_to_power_of_two();
    let closure = power_by_squaring(&padded, n - 1, |x, y| Ok::<_, Infallible>(block_diamond_step(x, y)));
    match closure {
        Ok(m) => m.restrict(n, n),
        Err(never) => match never {},
    }
}
