#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Precompiled header writer.
//!
//! Turns an analyzed [`astpack_core::Program`] into a single self-describing
//! artifact: a block-structured bitstream with one record per type,
//! declaration and macro, offset tables indexed by persistent ID, and
//! on-disk hash tables for identifier and selector lookup.
//!
//! ```ignore
//! let artifact = astpack_writer::emit(&program)?;
//! artifact.write_to("prelude.pch")?;
//! ```

mod artifact;
mod encode;
mod error;
pub mod id_space;
mod invariants;
mod offsets;
mod options;
mod session;
mod tables;

#[cfg(test)]
mod offsets_tests;
#[cfg(test)]
mod tables_tests;
#[cfg(test)]
mod test_utils;

pub use artifact::{Artifact, EmitStats};
pub use error::{Category, EmitError, Result, Warning};
pub use id_space::IdSpace;
pub use options::EmitOptions;
pub use session::{emit, emit_with};
