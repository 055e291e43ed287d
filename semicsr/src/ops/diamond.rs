//! Min-plus products and path closure
//!
//! The diamond product `(X ⋄ Y)[i][j] = min_k (X[i][k] + Y[k][j])` is plain
//! [`multiply`] over the tropical semiring. The closure of an `n x n` weight
//! matrix is its `(n - 1)`-fold diamond power: entry `(i, j)` is the
//! cheapest walk from `i` to `j` using exactly `n - 1` edges. With zero-cost
//! self loops on the diagonal that is the all-pairs shortest path.

use super::multiply::{multiply, multiply_concurrent};
use crate::matrix::CsrMatrix;
use crate::pool::PoolConfig;
use semicsr_core::{MatrixElement, Result, Tropical};
use std::convert::Infallible;

/// Matrix over the min-plus semiring
pub type TropicalMatrix<T> = CsrMatrix<Tropical<T>>;

/// One diamond product `x ⋄ y`
///
/// # Panics
///
/// Panics if `x.ncols() != y.nrows()`.
pub fn diamond_step<T: MatrixElement>(x: &TropicalMatrix<T>, y: &TropicalMatrix<T>) -> TropicalMatrix<T> {
    multiply(x, y)
}

/// One diamond product computed with a row-per-task pool
pub fn diamond_step_concurrent<T: MatrixElement>(
    x: &TropicalMatrix<T>,
    y: &TropicalMatrix<T>,
    config: &PoolConfig,
) -> Result<TropicalMatrix<T>> {
    multiply_concurrent(x, y, config)
}

/// `base` raised to the `exp`-th power by repeated squaring
///
/// `None` stands for the identity, so the first odd bit adopts `base`
/// instead of multiplying by an identity matrix. `exp` must be positive.
pub(crate) fn power_by_squaring<T, E, F>(
    base: &TropicalMatrix<T>,
    mut exp: usize,
    mut step: F,
) -> std::result::Result<TropicalMatrix<T>, E>
where
    T: MatrixElement,
    F: FnMut(&TropicalMatrix<T>, &TropicalMatrix<T>) -> std::result::Result<TropicalMatrix<T>, E>,
{
    debug_assert!(exp > 0);

    let mut result: Option<TropicalMatrix<T>> = None;
    let mut base = base.clone();
    let mut steps = 0usize;

    while exp > 0 {
        if exp & 1 == 1 {
            result = Some(match result {
                None => base.clone(),
                Some(acc) => {
                    steps += 1;
                    step(&acc, &base)?
                }
            });
        }
        exp >>= 1;
        if exp > 0 {
            steps += 1;
            base = step(&base, &base)?;
        }
        log::trace!("closure: {steps} steps, remaining exponent {exp}");
    }

    Ok(result.unwrap_or(base))
}

fn assert_square<T: MatrixElement>(a: &TropicalMatrix<T>) {
    assert!(
        a.is_square(),
        "diamond closure needs a square matrix, got {}x{}",
        a.nrows(),
        a.ncols()
    );
}

/// Path closure by exponentiation by squaring
///
/// Uses about `2 log2(n)` diamond steps. Matrices with fewer than two rows
/// are returned unchanged.
///
/// # Panics
///
/// Panics if `a` is not square.
pub fn diamond_closure<T: MatrixElement>(a: &TropicalMatrix<T>) -> TropicalMatrix<T> {
    assert_square(a);
    if a.nrows() <= 1 {
        return a.clone();
    }

    let closure = power_by_squaring(a, a.nrows() - 1, |x, y| Ok::<_, Infallible>(diamond_step(x, y)));
    match closure {
        Ok(m) => m,
        Err(never) => match never {},
    }
}

/// [`diamond_closure`] with every step run on a fresh pool
///
/// # Errors
///
/// Returns `CsrError::PoolSpawn` if a pool cannot be started.
pub fn diamond_closure_concurrent<T: MatrixElement>(
    a: &TropicalMatrix<T>,
    config: &PoolConfig,
) -> Result<TropicalMatrix<T>> {
    assert_square(a);
    if a.nrows() <= 1 {
        return Ok(a.clone());
    }

    power_by_squaring(a, a.nrows() - 1, |x, y| diamond_step_concurrent(x, y, config))
}

/// Path closure by `n - 2` successive steps
///
/// Quadratically more work than [`diamond_closure`]; kept as a reference.
pub fn diamond_closure_linear<T: MatrixElement>(a: &TropicalMatrix<T>) -> TropicalMatrix<T> {
    assert_square(a);
    if a.nrows() <= 1 {
        return a.clone();
    }

    let mut result = a.clone();
    for _ in 2..a.nrows() {
        result = diamond_step(&result, a);
    }
    result
}
