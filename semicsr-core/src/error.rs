//! Error types for semicsr operations

/// Recoverable errors raised by semicsr operations
///
/// Precondition violations (mismatched dimensions, out-of-range writes) are
/// not represented here; those panic at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrError {
    /// A worker thread could not be started
    PoolSpawn,
    /// Snapshot tag or header fields are invalid
    InvalidHeader,
    /// Buffer ended before the declared data
    InsufficientBuffer,
    /// An array length disagrees with the declared dimensions
    LengthMismatch,
    /// A column or row index exceeds the matrix dimensions
    IndexOutOfBounds,
    /// Column indices within a row are not strictly increasing
    UnsortedIndices,
    /// Row offsets are not monotone or do not span the value array
    InvalidOffsets,
    /// A stored value equals the semiring zero
    ExplicitZero,
    /// Byte length is not a multiple of the element size
    ArrayAlignment,
    /// Array size computation would overflow
    ArraySizeOverflow,
    /// Underlying reader or writer failed
    Io,
    /// Text input could not be parsed
    Parse,
}

impl CsrError {
    /// Coarse grouping used when reporting failures
    pub const fn category(&self) -> ErrorCategory {
        match self {
            CsrError::PoolSpawn => ErrorCategory::Runtime,
            CsrError::Io => ErrorCategory::Io,
            CsrError::Parse => ErrorCategory::Input,
            CsrError::InvalidHeader
            | CsrError::InsufficientBuffer
            | CsrError::ArrayAlignment
            | CsrError::ArraySizeOverflow => ErrorCategory::Format,
            CsrError::LengthMismatch
            | CsrError::IndexOutOfBounds
            | CsrError::UnsortedIndices
            | CsrError::InvalidOffsets
            | CsrError::ExplicitZero => ErrorCategory::Structure,
        }
    }
}

/// Error groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Runtime,
    Io,
    Input,
    Format,
    Structure,
}

impl core::fmt::Display for CsrError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            CsrError::PoolSpawn => "Failed to start worker thread",
            CsrError::InvalidHeader => "Invalid snapshot header",
            CsrError::InsufficientBuffer => "Insufficient buffer space",
            CsrError::LengthMismatch => "Array length does not match dimensions",
            CsrError::IndexOutOfBounds => "Index out of bounds",
            CsrError::UnsortedIndices => "Column indices not strictly increasing",
            CsrError::InvalidOffsets => "Invalid row offsets",
            CsrError::ExplicitZero => "Explicit zero stored",
            CsrError::ArrayAlignment => "Array size not aligned to element size",
            CsrError::ArraySizeOverflow => "Array size overflow",
            CsrError::Io => "I/O failure",
            CsrError::Parse => "Malformed input",
        };
        write!(f, "{msg}")
    }
}

impl core::error::Error for CsrError {}

/// Result type for semicsr operations
pub type Result<T> = core::result::Result<T, CsrError>;
