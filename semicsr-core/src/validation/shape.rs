//! Shape checks for block-recursive algorithms

use crate::CsrError;

/// Validate that a square side can be split in halves down to 2x2
pub const fn validate_block_side(side: usize) -> Result<(), CsrError> {
    if side < 2 || !side.is_power_of_two() {
        return Err(CsrError::LengthMismatch);
    }
    Ok(())
}

/// Side of the smallest power-of-two square holding a `rows x cols` matrix
///
/// Never smaller than 2, the block-recursive base case.
pub const fn padded_side(rows: usize, cols: usize) -> usize {
    let side = if rows > cols { rows } else { cols };
    if side <= 2 {
        2
    } else {
        side.next_power_of_two()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_block_side() {
        assert_eq!(validate_block_side(2), Ok(()));
        assert_eq!(validate_block_side(64), Ok(()));
        assert_eq!(validate_block_side(0), Err(CsrError::LengthMismatch));
        assert_eq!(validate_block_side(1), Err(CsrError::LengthMismatch));
        assert_eq!(validate_block_side(6), Err(CsrError::LengthMismatch));
    }

    #[test]
    fn test_padded_side() {
        assert_eq!(padded_side(0, 0), 2);
        assert_eq!(padded_side(1, 1), 2);
        assert_eq!(padded_side(3, 3), 4);
        assert_eq!(padded_side(4, 4), 4);
        assert_eq!(padded_side(5, 2), 8);
        assert_eq!(padded_side(9, 17), 32);
    }
}
