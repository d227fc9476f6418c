//! On-disk hash tables written at the end of the top-level block.
//!
//! Both tables share a shape: one blob holding the hash table followed by
//! the entities that did not go into it, and a second record mapping every
//! ID to the byte offset of its key inside that blob.

mod identifiers;
mod selectors;

use astpack_bitstream::Abbrev;

use crate::error::Result;
use crate::offsets::OffsetIndex;
use crate::session::Session;

/// Start of every table blob. No entry can sit at offset 0, so 0 stays free
/// as the end-of-chain marker.
fn new_table_blob() -> Vec<u8> {
    vec![0; 4]
}

impl Session<'_> {
    /// `[count, u32 offsets]` record for a table's key offsets.
    fn write_key_offsets(&mut self, code: u32, offsets: &OffsetIndex) -> Result<()> {
        let abbrev = self
            .stream
            .define_abbrev(Abbrev::new().literal(code as u64).fixed(32).blob())?;
        self.stream.emit_record_with_blob(
            abbrev,
            code,
            &[offsets.len() as u64],
            &offsets.to_u32_blob()?,
        )?;
        Ok(())
    }
}
