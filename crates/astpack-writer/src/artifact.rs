//! The finished artifact.

use std::path::Path;

use crate::error::{Result, Warning};
use crate::id_space::IdSpace;

/// Counters collected during one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitStats {
    pub types: usize,
    pub decls: usize,
    pub identifiers: usize,
    pub selectors: usize,
    pub statements: usize,
    pub macros: usize,
    pub lexical_contexts: usize,
    pub visible_contexts: usize,
    /// Iterations of the types/declarations fixed-point loop.
    pub rounds: usize,
}

#[derive(Debug)]
pub struct Artifact {
    pub bytes: Vec<u8>,
    pub warnings: Vec<Warning>,
    pub stats: EmitStats,
    /// Final ID assignment, for tools that correlate records with program entities.
    pub ids: IdSpace,
}

impl Artifact {
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}
