//! Semiring definitions
//!
//! A semiring fixes the algebra a matrix is evaluated in: the zero that marks
//! an absent entry, an associative commutative `add` and an associative
//! `mul` that distributes over it. Semirings are zero-sized marker types;
//! matrices carry theirs as a type parameter, so the zero used to prune
//! entries can never disagree with the zero used to combine them.

use core::marker::PhantomData;

use crate::traits::MatrixElement;

/// Algebra used to evaluate matrix products
pub trait Semiring: Copy + Clone + core::fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Scalar type stored in matrices over this semiring
    type Value: MatrixElement;

    /// Short human-readable name
    const NAME: &'static str;

    /// Additive identity; never stored explicitly
    fn zero() -> Self::Value;

    /// Multiplicative identity
    fn one() -> Self::Value;

    /// Semiring addition
    fn add(a: Self::Value, b: Self::Value) -> Self::Value;

    /// Semiring multiplication
    fn mul(a: Self::Value, b: Self::Value) -> Self::Value;

    /// Whether a value equals the zero
    fn is_zero(value: Self::Value) -> bool {
        value == Self::zero()
    }
}

/// Scalar type of a semiring
pub type Value<S> = <S as Semiring>::Value;

/// Ordinary `(0, +, ×)` arithmetic
///
/// Integer sums and products wrap on overflow.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Arithmetic<T>(PhantomData<T>);

impl<T: MatrixElement> Semiring for Arithmetic<T> {
    type Value = T;

    const NAME: &'static str = "arithmetic";

    fn zero() -> T {
        T::ZERO
    }

    fn one() -> T {
        T::ONE
    }

    fn add(a: T, b: T) -> T {
        a.plus(b)
    }

    fn mul(a: T, b: T) -> T {
        a.times(b)
    }
}

/// Min-plus `(∞, min, +)` arithmetic
///
/// The zero is the element's `INFINITY` sentinel and absorbs under `mul`.
/// Callers must keep legitimate weights away from the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tropical<T>(PhantomData<T>);

impl<T: MatrixElement> Semiring for Tropical<T> {
    type Value = T;

    const NAME: &'static str = "tropical";

    fn zero() -> T {
        T::INFINITY
    }

    fn one() -> T {
        T::ZERO
    }

    fn add(a: T, b: T) -> T {
        a.minimum(b)
    }

    fn mul(a: T, b: T) -> T {
        if a == T::INFINITY || b == T::INFINITY {
            T::INFINITY
        } else {
            a.saturating_plus(b)
        }
    }
}
