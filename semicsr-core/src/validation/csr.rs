//! Structural validation of compressed sparse row arrays

use crate::CsrError;

/// Check every CSR invariant on raw arrays
///
/// - `row_offset` has `nrows + 1` entries, starts at 0, is non-decreasing
///   and ends at `values.len()`
/// - `col_index` has one entry per value, each `< ncols`, strictly
///   increasing inside a row
/// - no stored value equals `zero`
pub fn validate_csr<T: PartialEq>(
    nrows: usize,
    ncols: usize,
    values: &[T],
    zero: &T,
    col_index: &[usize],
    row_offset: &[usize],
) -> Result<(), CsrError> {
    let expected_offsets = nrows.checked_add(1).ok_or(CsrError::ArraySizeOverflow)?;
    if row_offset.len() != expected_offsets || col_index.len() != values.len() {
        return Err(CsrError::LengthMismatch);
    }

    if row_offset[0] != 0 || row_offset[nrows] != values.len() {
        return Err(CsrError::InvalidOffsets);
    }

    for window in row_offset.windows(2) {
        let (start, end) = (window[0], window[1]);
        if start > end || end > col_index.len() {
            return Err(CsrError::InvalidOffsets);
        }

        let cols = &col_index[start..end];
        if cols.iter().any(|&c| c >= ncols) {
            return Err(CsrError::IndexOutOfBounds);
        }
        if cols.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(CsrError::UnsortedIndices);
        }
    }

    if values.iter().any(|v| v == zero) {
        return Err(CsrError::ExplicitZero);
    }

    Ok(())
}
