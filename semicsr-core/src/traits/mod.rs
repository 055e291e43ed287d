//! Abstract interfaces for semicsr
//!
//! This module defines the trait abstractions shared by every storage
//! implementation. Traits are pure interfaces with no concrete storage.

pub mod element;
pub mod matrix;

pub use element::MatrixElement;
pub use matrix::{SparseMatrix, SparseMatrixMut};
