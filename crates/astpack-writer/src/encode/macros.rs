//! Preprocessor block: user macro definitions and their replacement tokens.

use log::{trace, warn};

use astpack_bitstream::constants::{
    PREPROCESSOR_BLOCK_ID, PREPROCESSOR_CODE_WIDTH, pch, preprocessor as pp,
};
use astpack_core::{IdentHandle, MacroInfo, MacroKind, Token};

use crate::error::{Result, Warning};
use crate::session::{Record, Session, add_location};

impl Session<'_> {
    pub(crate) fn write_preprocessor(&mut self) -> Result<()> {
        let program = self.program;
        let preprocessor = &program.preprocessor;

        if preprocessor.counter_value != 0 {
            self.stream
                .emit_record(pch::PP_COUNTER_VALUE, &[preprocessor.counter_value as u64])?;
        }

        if preprocessor.saw_date_or_time && self.options.report_date_time {
            warn!("__DATE__ or __TIME__ was expanded; the artifact is not reproducible");
            self.warnings.push(Warning::DateTimeMacros);
        }

        // Output order must not depend on hash map iteration.
        let mut macros: Vec<(&str, IdentHandle, &MacroInfo)> = Vec::new();
        for (&ident, info) in &preprocessor.macros {
            if !info.is_builtin {
                macros.push((program.ident_name(ident)?, ident, info));
            }
        }
        macros.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(&b.1)));

        self.in_block(PREPROCESSOR_BLOCK_ID, PREPROCESSOR_CODE_WIDTH, |s| {
            for (name, ident, info) in macros {
                s.write_macro(ident, info)?;
                trace!("macro {name}: {} tokens", info.tokens.len());
            }
            Ok(())
        })
    }

    fn write_macro(&mut self, ident: IdentHandle, info: &MacroInfo) -> Result<()> {
        let mut record = Vec::new();
        self.add_ident_ref(&mut record, Some(ident))?;
        add_location(&mut record, info.definition_loc);
        record.push(info.is_used as u64);

        let code = match &info.kind {
            MacroKind::ObjectLike => pp::MACRO_OBJECT_LIKE,
            MacroKind::FunctionLike {
                is_c99_varargs,
                is_gnu_varargs,
                params,
            } => {
                record.push(*is_c99_varargs as u64);
                record.push(*is_gnu_varargs as u64);
                record.push(params.len() as u64);
                for &param in params {
                    self.add_ident_ref(&mut record, Some(param))?;
                }
                pp::MACRO_FUNCTION_LIKE
            }
        };

        self.macro_offsets.insert(ident, self.stream.bit_position());
        self.stream.emit_record(code, &record)?;

        for token in &info.tokens {
            let record = self.token_record(token)?;
            self.stream.emit_record(pp::TOKEN, &record)?;
        }
        self.stats.macros += 1;
        Ok(())
    }

    fn token_record(&mut self, token: &Token) -> Result<Record> {
        let mut record = Vec::with_capacity(5);
        add_location(&mut record, token.location);
        record.push(token.length as u64);
        self.add_ident_ref(&mut record, token.ident)?;
        record.push(token.kind.0 as u64);
        record.push(token.flags.0 as u64);
        Ok(record)
    }
}
