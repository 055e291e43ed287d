//! Validation utilities
//!
//! Pure functions over array lengths and CSR structure with no I/O.

pub mod bounds;
pub mod csr;
pub mod shape;

pub use bounds::{checked_byte_size, validate_array_bounds};
pub use csr::validate_csr;
pub use shape::{padded_side, validate_block_side};
