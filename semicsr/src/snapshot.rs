//! Binary matrix snapshots
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! "SparseMatrix" | rows u64 | cols u64 | nnz u64
//! nnz u64        | values[nnz]
//! nnz u64        | col_index[nnz] as u64
//! rows+1 u64     | row_offset[rows + 1] as u64
//! ```
//!
//! The semiring is not recorded; the caller names it when loading.

use crate::matrix::CsrMatrix;
use semicsr_core::format::constants::INDEX_SIZE;
use semicsr_core::{
    validate_array_bounds, CsrError, MatrixElement, Result, Semiring, SnapshotHeader,
    SnapshotLayout,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::mem::size_of;
use std::path::Path;

fn io_error(context: &'static str) -> impl FnOnce(std::io::Error) -> CsrError {
    move |err| {
        log::error!("{context}: {err}");
        CsrError::Io
    }
}

/// Encode a matrix into a snapshot buffer
pub fn to_bytes<S: Semiring>(matrix: &CsrMatrix<S>) -> Result<Vec<u8>> {
    let header = SnapshotHeader::new(
        matrix.nrows() as u64,
        matrix.ncols() as u64,
        matrix.nnz() as u64,
    );
    let layout = SnapshotLayout::calculate(&header, size_of::<S::Value>())?;

    let mut bytes = Vec::with_capacity(layout.total_size);
    bytes.extend_from_slice(&header.to_bytes_array());

    let values: Vec<S::Value> = matrix.values().iter().map(|&v| v.to_le()).collect();
    bytes.extend_from_slice(&(values.len() as u64).to_le_bytes());
    bytes.extend_from_slice(bytemuck::cast_slice(&values));

    for indices in [matrix.col_index(), matrix.row_offset()] {
        bytes.extend_from_slice(&(indices.len() as u64).to_le_bytes());
        for &index in indices {
            bytes.extend_from_slice(&(index as u64).to_le_bytes());
        }
    }

    debug_assert_eq!(bytes.len(), layout.total_size);
    Ok(bytes)
}

fn decode_indices(bytes: &[u8]) -> Result<Vec<usize>> {
    bytes
        .chunks_exact(INDEX_SIZE)
        .map(|chunk| {
            let raw = u64::from_le_bytes(bytemuck::pod_read_unaligned(chunk));
            usize::try_from(raw).map_err(|_| CsrError::ArraySizeOverflow)
        })
        .collect()
}

/// Decode a snapshot, checking the header, the array lengths and every
/// storage invariant
pub fn from_bytes<S: Semiring>(bytes: &[u8]) -> Result<CsrMatrix<S>> {
    let header = SnapshotHeader::from_bytes(bytes)?;
    let layout = SnapshotLayout::calculate(&header, size_of::<S::Value>())?;
    layout.validate_prefixes(bytes, &header)?;

    let values_bytes = &bytes[layout.values_offset..layout.values_offset + layout.values_size];
    let count = validate_array_bounds::<S::Value>(values_bytes.len())?;
    let values: Vec<S::Value> = values_bytes
        .chunks_exact(size_of::<S::Value>())
        .map(|chunk| bytemuck::pod_read_unaligned::<S::Value>(chunk).from_le())
        .collect();
    debug_assert_eq!(values.len(), count);

    let col_index = decode_indices(
        &bytes[layout.col_index_offset..layout.col_index_offset + layout.col_index_size],
    )?;
    let row_offset = decode_indices(
        &bytes[layout.row_offset_offset..layout.row_offset_offset + layout.row_offset_size],
    )?;

    let nrows = usize::try_from(header.nrows).map_err(|_| CsrError::ArraySizeOverflow)?;
    let ncols = usize::try_from(header.ncols).map_err(|_| CsrError::ArraySizeOverflow)?;

    CsrMatrix::from_parts(nrows, ncols, values, col_index, row_offset).inspect_err(|err| {
        log::warn!("rejected snapshot of {nrows}x{ncols} matrix: {err}");
    })
}

/// Write a snapshot to any writer
pub fn write_to<S: Semiring, W: Write>(matrix: &CsrMatrix<S>, mut writer: W) -> Result<()> {
    let bytes = to_bytes(matrix)?;
    writer
        .write_all(&bytes)
        .map_err(io_error("failed to write snapshot"))?;
    writer.flush().map_err(io_error("failed to flush snapshot"))
}

/// Read one snapshot from a reader
///
/// Reads exactly the bytes the header announces, so several snapshots can
/// be stored back to back.
pub fn read_from<S: Semiring, R: Read>(mut reader: R) -> Result<CsrMatrix<S>> {
    let mut bytes = vec![0u8; SnapshotHeader::SIZE];
    reader
        .read_exact(&mut bytes)
        .map_err(io_error("failed to read snapshot header"))?;

    let header = SnapshotHeader::from_bytes(&bytes)?;
    let layout = SnapshotLayout::calculate(&header, size_of::<S::Value>())?;

    // Grow with the data actually read rather than the announced size
    let body_len = (layout.total_size - bytes.len()) as u64;
    reader
        .by_ref()
        .take(body_len)
        .read_to_end(&mut bytes)
        .map_err(io_error("failed to read snapshot body"))?;

    from_bytes(&bytes)
}

/// Save a snapshot to a file
pub fn save<S: Semiring, P: AsRef<Path>>(matrix: &CsrMatrix<S>, path: P) -> Result<()> {
    let file = File::create(path.as_ref()).map_err(io_error("failed to create snapshot file"))?;
    write_to(matrix, BufWriter::new(file))
}

/// Load a snapshot from a file
pub fn load<S: Semiring, P: AsRef<Path>>(path: P) -> Result<CsrMatrix<S>> {
    let file = File::open(path.as_ref()).map_err(io_error("failed to open snapshot file"))?;
    read_from(BufReader::new(file))
}

/// Load a snapshot through a read-only memory map
#[cfg(feature = "mmap")]
pub fn load_mmap<S: Semiring, P: AsRef<Path>>(path: P) -> Result<CsrMatrix<S>> {
    let file = File::open(path.as_ref()).map_err(io_error("failed to open snapshot file"))?;

    // SAFETY: the map is read-only and dropped before returning; the
    // decoded matrix owns copies of every array.
    let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(io_error("failed to map snapshot file"))?;

    from_bytes(&mmap)
}
