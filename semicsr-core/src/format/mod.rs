//! Binary snapshot format definitions
//!
//! This module contains pure data structure definitions for the snapshot
//! wire format. No I/O happens here.

pub mod constants;
pub mod header;
pub mod layout;

pub use header::{DataType, SnapshotHeader};
pub use layout::SnapshotLayout;
