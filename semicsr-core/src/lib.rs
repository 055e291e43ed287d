#![cfg_attr(not(test), no_std)]

//! semicsr core - semiring and sparse matrix definitions
//!
//! This crate provides the algebra, element types, storage capability traits
//! and snapshot format definitions shared by every semicsr implementation.
//! It performs no I/O and spawns no threads.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod format;
pub mod semiring;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::{DataType, SnapshotHeader, SnapshotLayout};
pub use semiring::{Arithmetic, Semiring, Tropical, Value};
pub use traits::*;
pub use validation::{padded_side, validate_array_bounds, validate_block_side, validate_csr};
