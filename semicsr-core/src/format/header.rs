//! Snapshot header format definitions
//!
//! A snapshot starts with the 12-byte tag `SparseMatrix` followed by the
//! row count, column count and stored-entry count as little-endian `u64`.

use super::constants::{HEADER_SIZE, TAG, TAG_SIZE};
use crate::{CsrError, Result};

/// Fixed-size header of a matrix snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnapshotHeader {
    /// Tag bytes: "SparseMatrix"
    pub tag: [u8; TAG_SIZE],
    /// Number of rows
    pub nrows: u64,
    /// Number of columns
    pub ncols: u64,
    /// Number of stored entries
    pub nnz: u64,
}

impl SnapshotHeader {
    /// Tag bytes for snapshots
    pub const TAG: [u8; TAG_SIZE] = TAG;

    /// Size of the encoded header in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Create a header for the given shape
    pub const fn new(nrows: u64, ncols: u64, nnz: u64) -> Self {
        Self {
            tag: Self::TAG,
            nrows,
            ncols,
            nnz,
        }
    }

    /// Validate the tag and the entry count against the shape
    pub fn validate(&self) -> Result<()> {
        if self.tag != Self::TAG {
            return Err(CsrError::InvalidHeader);
        }

        let capacity = self
            .nrows
            .checked_mul(self.ncols)
            .ok_or(CsrError::ArraySizeOverflow)?;

        if self.nnz > capacity {
            return Err(CsrError::LengthMismatch);
        }

        Ok(())
    }

    /// Parse header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(CsrError::InsufficientBuffer);
        }

        if bytes[0..TAG_SIZE] != Self::TAG {
            return Err(CsrError::InvalidHeader);
        }

        let header = Self::new(
            read_u64(bytes, TAG_SIZE),
            read_u64(bytes, TAG_SIZE + 8),
            read_u64(bytes, TAG_SIZE + 16),
        );
        header.validate()?;

        Ok(header)
    }

    /// Convert header to a fixed byte array
    pub fn to_bytes_array(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];

        bytes[0..TAG_SIZE].copy_from_slice(&self.tag);
        bytes[TAG_SIZE..TAG_SIZE + 8].copy_from_slice(&self.nrows.to_le_bytes());
        bytes[TAG_SIZE + 8..TAG_SIZE + 16].copy_from_slice(&self.ncols.to_le_bytes());
        bytes[TAG_SIZE + 16..TAG_SIZE + 24].copy_from_slice(&self.nnz.to_le_bytes());

        bytes
    }

    /// Convert header to bytes (requires alloc feature)
    #[cfg(feature = "alloc")]
    pub fn to_bytes(&self) -> alloc::vec::Vec<u8> {
        self.to_bytes_array().to_vec()
    }
}

/// Read a little-endian u64 at `offset`; caller checks bounds
pub(crate) fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

/// Element types a matrix can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum DataType {
    /// 32-bit floating point
    F32 = 0,
    /// 64-bit floating point
    F64 = 1,
    /// 32-bit signed integer
    I32 = 2,
    /// 64-bit signed integer
    I64 = 3,
    /// 32-bit unsigned integer
    U32 = 4,
    /// 64-bit unsigned integer
    U64 = 5,
}

impl DataType {
    /// Convert from u8 representation
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(DataType::F32),
            1 => Some(DataType::F64),
            2 => Some(DataType::I32),
            3 => Some(DataType::I64),
            4 => Some(DataType::U32),
            5 => Some(DataType::U64),
            _ => None,
        }
    }

    /// Convert to u8 representation
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the size in bytes for this data type
    pub const fn size_bytes(self) -> usize {
        match self {
            DataType::F32 | DataType::I32 | DataType::U32 => 4,
            DataType::F64 | DataType::I64 | DataType::U64 => 8,
        }
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DataType::F32 => write!(f, "f32"),
            DataType::F64 => write!(f, "f64"),
            DataType::I32 => write!(f, "i32"),
            DataType::I64 => write!(f, "i64"),
            DataType::U32 => write!(f, "u32"),
            DataType::U64 => write!(f, "u64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = SnapshotHeader::new(3, 4, 5);
        let bytes = header.to_bytes_array();
        assert_eq!(&bytes[0..12], b"SparseMatrix");
        assert_eq!(SnapshotHeader::from_bytes(&bytes), Ok(header));
    }

    #[test]
    fn test_header_rejects_bad_tag() {
        let mut bytes = SnapshotHeader::new(2, 2, 1).to_bytes_array();
        bytes[0] = b's';
        assert_eq!(
            SnapshotHeader::from_bytes(&bytes),
            Err(CsrError::InvalidHeader)
        );
    }

    #[test]
    fn test_header_rejects_short_buffer() {
        let bytes = SnapshotHeader::new(2, 2, 1).to_bytes_array();
        assert_eq!(
            SnapshotHeader::from_bytes(&bytes[..20]),
            Err(CsrError::InsufficientBuffer)
        );
    }

    #[test]
    fn test_header_rejects_excess_nnz() {
        let bytes = SnapshotHeader::new(2, 2, 5).to_bytes_array();
        assert_eq!(
            SnapshotHeader::from_bytes(&bytes),
            Err(CsrError::LengthMismatch)
        );
    }

    #[test]
    fn test_data_type_conversion() {
        assert_eq!(DataType::from_u8(1), Some(DataType::F64));
        assert_eq!(DataType::from_u8(9), None);
        assert_eq!(DataType::U32.size_bytes(), 4);
    }
}
