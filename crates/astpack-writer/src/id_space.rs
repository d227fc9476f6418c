//! Persistent ID allocation.
//!
//! Each category maps entity handles to dense IDs in first-reference order.
//! ID 0 is the null reference and is never handed out. Types and
//! declarations are additionally queued for emission the first time they are
//! seen; identifiers and selectors are written in bulk at the end of the
//! session and need no queue.

use std::collections::VecDeque;
use std::hash::Hash;

use indexmap::IndexSet;

use astpack_bitstream::constants::{
    NUM_PREDEF_TYPE_IDS, PREDEF_TYPE_BOOL_ID, PREDEF_TYPE_CHAR_S_ID, PREDEF_TYPE_CHAR_U_ID,
    PREDEF_TYPE_DEPENDENT_ID, PREDEF_TYPE_DOUBLE_ID, PREDEF_TYPE_FLOAT_ID, PREDEF_TYPE_INT_ID,
    PREDEF_TYPE_LONG_ID, PREDEF_TYPE_LONGDOUBLE_ID, PREDEF_TYPE_LONGLONG_ID,
    PREDEF_TYPE_OVERLOAD_ID, PREDEF_TYPE_SCHAR_ID, PREDEF_TYPE_SHORT_ID, PREDEF_TYPE_UCHAR_ID,
    PREDEF_TYPE_UINT_ID, PREDEF_TYPE_ULONG_ID, PREDEF_TYPE_ULONGLONG_ID, PREDEF_TYPE_USHORT_ID,
    PREDEF_TYPE_VOID_ID, PREDEF_TYPE_WCHAR_ID,
};
use astpack_core::{BuiltinKind, DeclHandle, IdentHandle, SelectorHandle, TypeHandle};

/// Identity table for one category.
#[derive(Debug, Clone)]
pub struct EntityTable<H> {
    assigned: IndexSet<H>,
    first_id: u32,
    pending: VecDeque<H>,
    queued: bool,
}

impl<H: Copy + Eq + Hash> EntityTable<H> {
    fn new(first_id: u32, queued: bool) -> Self {
        Self {
            assigned: IndexSet::new(),
            first_id,
            pending: VecDeque::new(),
            queued,
        }
    }

    /// ID of `handle`, allocating (and queueing) it on first use.
    pub fn id_for(&mut self, handle: H) -> u32 {
        let (index, inserted) = self.assigned.insert_full(handle);
        if inserted && self.queued {
            self.pending.push_back(handle);
        }
        self.first_id + index as u32
    }

    /// Like [`Self::id_for`], with `None` mapping to the null ID.
    pub fn id_for_opt(&mut self, handle: Option<H>) -> u32 {
        handle.map_or(0, |h| self.id_for(h))
    }

    /// ID of an already referenced entity. Never allocates.
    pub fn get(&self, handle: H) -> Option<u32> {
        self.assigned
            .get_index_of(&handle)
            .map(|index| self.first_id + index as u32)
    }

    pub fn pop_pending(&mut self) -> Option<H> {
        self.pending.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of IDs handed out.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn first_id(&self) -> u32 {
        self.first_id
    }

    /// `(handle, id)` pairs in ID order.
    pub fn iter(&self) -> impl Iterator<Item = (H, u32)> + '_ {
        self.assigned
            .iter()
            .enumerate()
            .map(|(index, &handle)| (handle, self.first_id + index as u32))
    }
}

/// All ID tables of one session.
#[derive(Debug, Clone)]
pub struct IdSpace {
    pub types: EntityTable<TypeHandle>,
    pub decls: EntityTable<DeclHandle>,
    pub identifiers: EntityTable<IdentHandle>,
    pub selectors: EntityTable<SelectorHandle>,
}

impl Default for IdSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSpace {
    pub fn new() -> Self {
        Self {
            types: EntityTable::new(NUM_PREDEF_TYPE_IDS, true),
            decls: EntityTable::new(1, true),
            identifiers: EntityTable::new(1, false),
            selectors: EntityTable::new(1, false),
        }
    }
}

/// Reserved ID of a builtin scalar type.
pub fn predefined_type_id(kind: BuiltinKind) -> u32 {
    match kind {
        BuiltinKind::Void => PREDEF_TYPE_VOID_ID,
        BuiltinKind::Bool => PREDEF_TYPE_BOOL_ID,
        BuiltinKind::CharU => PREDEF_TYPE_CHAR_U_ID,
        BuiltinKind::UChar => PREDEF_TYPE_UCHAR_ID,
        BuiltinKind::UShort => PREDEF_TYPE_USHORT_ID,
        BuiltinKind::UInt => PREDEF_TYPE_UINT_ID,
        BuiltinKind::ULong => PREDEF_TYPE_ULONG_ID,
        BuiltinKind::ULongLong => PREDEF_TYPE_ULONGLONG_ID,
        BuiltinKind::CharS => PREDEF_TYPE_CHAR_S_ID,
        BuiltinKind::SChar => PREDEF_TYPE_SCHAR_ID,
        BuiltinKind::WChar => PREDEF_TYPE_WCHAR_ID,
        BuiltinKind::Short => PREDEF_TYPE_SHORT_ID,
        BuiltinKind::Int => PREDEF_TYPE_INT_ID,
        BuiltinKind::Long => PREDEF_TYPE_LONG_ID,
        BuiltinKind::LongLong => PREDEF_TYPE_LONGLONG_ID,
        BuiltinKind::Float => PREDEF_TYPE_FLOAT_ID,
        BuiltinKind::Double => PREDEF_TYPE_DOUBLE_ID,
        BuiltinKind::LongDouble => PREDEF_TYPE_LONGDOUBLE_ID,
        BuiltinKind::Overload => PREDEF_TYPE_OVERLOAD_ID,
        BuiltinKind::Dependent => PREDEF_TYPE_DEPENDENT_ID,
    }
}
