//! Format constants for matrix snapshots

/// Tag identifying a snapshot
pub const TAG: [u8; TAG_SIZE] = *b"SparseMatrix";

/// Length of the tag in bytes
pub const TAG_SIZE: usize = 12;

/// Encoded header size: tag plus rows, cols and nnz
pub const HEADER_SIZE: usize = TAG_SIZE + 3 * 8;

/// Width of each array length prefix
pub const LENGTH_PREFIX_SIZE: usize = 8;

/// Width of a stored column index or row offset
pub const INDEX_SIZE: usize = 8;
