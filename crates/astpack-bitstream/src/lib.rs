#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Block-structured bitstream container and on-disk hash tables.
//!
//! Write side: [`BitstreamWriter`] (blocks, abbreviations, records, blobs) and
//! [`OnDiskHashTableBuilder`]. Read side: [`reader::parse`], [`HashTableView`]
//! and [`dump`], used by tests and tooling to check what was written.

pub mod abbrev;
mod block_info;
pub mod constants;
pub mod dump;
mod error;
pub mod io;
pub mod on_disk_hash;
pub mod reader;
mod writer;

#[cfg(test)]
mod dump_tests;

pub use abbrev::{Abbrev, AbbrevOp};
pub use dump::dump;
pub use error::{HashTableError, ReadError, StreamError};
pub use on_disk_hash::{
    HashTableInfo, HashTableView, LengthLayout, OnDiskHashTableBuilder, bernstein_hash,
    bernstein_hash_partial,
};
pub use writer::{AbbrevId, BitstreamWriter, StreamState};
