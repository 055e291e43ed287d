//! Array size validation
//!
//! Pure arithmetic checks for converting between byte lengths and element
//! counts without overflow.

use crate::CsrError;

/// Validate that `byte_len` holds a whole number of `T` elements
///
/// Returns the element count.
pub const fn validate_array_bounds<T>(byte_len: usize) -> Result<usize, CsrError> {
    let element_size = core::mem::size_of::<T>();

    if byte_len % element_size != 0 {
        return Err(CsrError::ArrayAlignment);
    }

    let count = byte_len / element_size;

    // Conservative overflow protection for downstream index arithmetic
    if count > isize::MAX as usize {
        return Err(CsrError::ArraySizeOverflow);
    }

    Ok(count)
}

/// Byte size of `count` elements of `element_size` bytes each
pub const fn checked_byte_size(count: usize, element_size: usize) -> Result<usize, CsrError> {
    match count.checked_mul(element_size) {
        Some(size) => Ok(size),
        None => Err(CsrError::ArraySizeOverflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_array_bounds() {
        assert_eq!(validate_array_bounds::<u32>(16), Ok(4));
        assert_eq!(validate_array_bounds::<u64>(24), Ok(3));
        assert_eq!(validate_array_bounds::<u32>(0), Ok(0));

        assert_eq!(
            validate_array_bounds::<u32>(15),
            Err(CsrError::ArrayAlignment)
        );
        assert_eq!(
            validate_array_bounds::<u64>(23),
            Err(CsrError::ArrayAlignment)
        );
    }

    #[test]
    fn test_checked_byte_size() {
        assert_eq!(checked_byte_size(3, 8), Ok(24));
        assert_eq!(
            checked_byte_size(usize::MAX, 2),
            Err(CsrError::ArraySizeOverflow)
        );
    }
}
