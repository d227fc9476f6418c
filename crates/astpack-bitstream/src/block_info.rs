//! The block-info block: names for block IDs and record codes.

use crate::constants::{BLOCKINFO_CODE_WIDTH, BlockSchema, STMT_RECORDS, blockinfo};
use crate::writer::{BitstreamWriter, Result};

fn name_fields(prefix: &[u64], name: &str) -> Vec<u64> {
    prefix
        .iter()
        .copied()
        .chain(name.bytes().map(u64::from))
        .collect()
}

impl BitstreamWriter {
    /// Write the block-info block. With `with_names` unset only the block IDs
    /// are announced.
    pub fn emit_block_info(&mut self, schema: &[BlockSchema], with_names: bool) -> Result<()> {
        self.enter_block_info(BLOCKINFO_CODE_WIDTH)?;
        for block in schema {
            self.emit_record(blockinfo::SETBID, &[block.block_id as u64])?;
            if !with_names {
                continue;
            }
            self.emit_record(blockinfo::BLOCKNAME, &name_fields(&[], block.name))?;

            let stmts = if block.has_stmts { STMT_RECORDS } else { &[] };
            for &(code, name) in block.records.iter().chain(stmts) {
                self.emit_record(
                    blockinfo::SETRECORDNAME,
                    &name_fields(&[code as u64], name),
                )?;
            }
        }
        self.exit_block()
    }
}
