//! Byte layout of a snapshot body
//!
//! After the header come three length-prefixed arrays: values, column
//! indices and row offsets. Offsets below point at the first data byte of
//! each array, past its prefix.

use super::constants::{INDEX_SIZE, LENGTH_PREFIX_SIZE};
use super::header::{read_u64, SnapshotHeader};
use crate::validation::checked_byte_size;
use crate::{CsrError, Result};

/// Offsets and sizes of the arrays in a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotLayout {
    pub values_offset: usize,
    pub values_size: usize,
    pub col_index_offset: usize,
    pub col_index_size: usize,
    pub row_offset_offset: usize,
    pub row_offset_size: usize,
    /// Total encoded size including header
    pub total_size: usize,
}

impl SnapshotLayout {
    /// Compute the layout for a header and element width
    pub fn calculate(header: &SnapshotHeader, element_size: usize) -> Result<Self> {
        let nnz = usize::try_from(header.nnz).map_err(|_| CsrError::ArraySizeOverflow)?;
        let offsets_len = usize::try_from(header.nrows)
            .ok()
            .and_then(|rows| rows.checked_add(1))
            .ok_or(CsrError::ArraySizeOverflow)?;

        let values_offset = SnapshotHeader::SIZE + LENGTH_PREFIX_SIZE;
        let values_size = checked_byte_size(nnz, element_size)?;

        let col_index_offset = advance(values_offset, values_size)?;
        let col_index_size = checked_byte_size(nnz, INDEX_SIZE)?;

        let row_offset_offset = advance(col_index_offset, col_index_size)?;
        let row_offset_size = checked_byte_size(offsets_len, INDEX_SIZE)?;

        let total_size = row_offset_offset
            .checked_add(row_offset_size)
            .ok_or(CsrError::ArraySizeOverflow)?;

        Ok(Self {
            values_offset,
            values_size,
            col_index_offset,
            col_index_size,
            row_offset_offset,
            row_offset_size,
            total_size,
        })
    }

    /// Check that the three length prefixes in `bytes` agree with the header
    pub fn validate_prefixes(&self, bytes: &[u8], header: &SnapshotHeader) -> Result<()> {
        if bytes.len() < self.total_size {
            return Err(CsrError::InsufficientBuffer);
        }

        let expected = [
            (self.values_offset, header.nnz),
            (self.col_index_offset, header.nnz),
            (self.row_offset_offset, header.nrows.saturating_add(1)),
        ];

        for (data_offset, len) in expected {
            if read_u64(bytes, data_offset - LENGTH_PREFIX_SIZE) != len {
                return Err(CsrError::LengthMismatch);
            }
        }

        Ok(())
    }
}

/// Start of the next array: past the current data and the next prefix
fn advance(offset: usize, size: usize) -> Result<usize> {
    offset
        .checked_add(size)
        .and_then(|end| end.checked_add(LENGTH_PREFIX_SIZE))
        .ok_or(CsrError::ArraySizeOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let header = SnapshotHeader::new(3, 3, 4);
        let layout = SnapshotLayout::calculate(&header, 8).unwrap();

        assert_eq!(layout.values_offset, 36 + 8);
        assert_eq!(layout.values_size, 32);
        assert_eq!(layout.col_index_offset, 44 + 32 + 8);
        assert_eq!(layout.col_index_size, 32);
        assert_eq!(layout.row_offset_offset, 84 + 32 + 8);
        assert_eq!(layout.row_offset_size, 32);
        assert_eq!(layout.total_size, 124 + 32);
    }

    #[test]
    fn test_layout_empty_matrix() {
        let header = SnapshotHeader::new(0, 0, 0);
        let layout = SnapshotLayout::calculate(&header, 4).unwrap();
        assert_eq!(layout.values_size, 0);
        assert_eq!(layout.row_offset_size, 8);
        assert_eq!(layout.total_size, 36 + 3 * 8 + 8);
    }

    #[test]
    fn test_layout_overflow() {
        let header = SnapshotHeader::new(u64::MAX, 1, 0);
        assert!(SnapshotLayout::calculate(&header, 8).is_err());
    }
}
