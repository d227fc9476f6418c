//! Source locations and the source manager's entry table.

use serde::{Deserialize, Serialize};

/// Raw encoded source location. Zero is the invalid location.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceLocation(pub u32);

impl SourceLocation {
    pub const INVALID: Self = Self(0);

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Whether a file is user code or a system header.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum FileCharacteristic {
    #[default]
    User,
    System,
    ExternCSystem,
}

impl FileCharacteristic {
    pub fn code(self) -> u64 {
        match self {
            FileCharacteristic::User => 0,
            FileCharacteristic::System => 1,
            FileCharacteristic::ExternCSystem => 2,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum SLocEntry {
    File {
        offset: u32,
        #[serde(default)]
        include_loc: SourceLocation,
        #[serde(default)]
        characteristic: FileCharacteristic,
        #[serde(default)]
        has_line_directives: bool,
        name: String,
    },
    /// In-memory buffer; its contents travel with the artifact.
    Buffer {
        offset: u32,
        #[serde(default)]
        include_loc: SourceLocation,
        #[serde(default)]
        characteristic: FileCharacteristic,
        #[serde(default)]
        has_line_directives: bool,
        name: String,
        contents: String,
    },
    /// Macro expansion.
    Instantiation {
        offset: u32,
        spelling_loc: SourceLocation,
        expansion_start: SourceLocation,
        expansion_end: SourceLocation,
    },
}

impl SLocEntry {
    pub fn offset(&self) -> u32 {
        match self {
            SLocEntry::File { offset, .. }
            | SLocEntry::Buffer { offset, .. }
            | SLocEntry::Instantiation { offset, .. } => *offset,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LineEntry {
    pub file_offset: u32,
    pub line: u32,
    /// Index into [`LineTable::filenames`].
    pub filename_id: u32,
    #[serde(default)]
    pub file_kind: FileCharacteristic,
    #[serde(default)]
    pub include_offset: u32,
}

/// `#line` directive effects.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineTable {
    pub filenames: Vec<String>,
    /// Per-file entries, keyed by the file's entry index.
    pub files: Vec<(u32, Vec<LineEntry>)>,
}

impl LineTable {
    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty() && self.files.is_empty()
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SourceManager {
    /// Entry 0 is a dummy and is never written.
    pub entries: Vec<SLocEntry>,
    /// Offset one past the last allocated entry.
    pub next_offset: u32,
    #[serde(default)]
    pub line_table: LineTable,
}

impl Default for SourceManager {
    fn default() -> Self {
        Self {
            entries: vec![SLocEntry::Buffer {
                offset: 0,
                include_loc: SourceLocation::INVALID,
                characteristic: FileCharacteristic::User,
                has_line_directives: false,
                name: String::new(),
                contents: String::new(),
            }],
            next_offset: 1,
            line_table: LineTable::default(),
        }
    }
}

impl SourceManager {
    /// Append a file entry covering `size` bytes and return its starting offset.
    pub fn add_file(&mut self, name: impl Into<String>, size: u32) -> u32 {
        let offset = self.next_offset;
        self.entries.push(SLocEntry::File {
            offset,
            include_loc: SourceLocation::INVALID,
            characteristic: FileCharacteristic::User,
            has_line_directives: false,
            name: name.into(),
        });
        self.next_offset = offset + size + 1;
        offset
    }

    /// Append a memory buffer entry and return its starting offset.
    pub fn add_buffer(&mut self, name: impl Into<String>, contents: impl Into<String>) -> u32 {
        let contents = contents.into();
        let offset = self.next_offset;
        let size = contents.len() as u32;
        self.entries.push(SLocEntry::Buffer {
            offset,
            include_loc: SourceLocation::INVALID,
            characteristic: FileCharacteristic::User,
            has_line_directives: false,
            name: name.into(),
            contents,
        });
        self.next_offset = offset + size + 1;
        offset
    }

    /// Append a macro expansion entry spanning `token_len` characters.
    pub fn add_instantiation(
        &mut self,
        spelling_loc: SourceLocation,
        expansion_start: SourceLocation,
        expansion_end: SourceLocation,
        token_len: u32,
    ) -> u32 {
        let offset = self.next_offset;
        self.entries.push(SLocEntry::Instantiation {
            offset,
            spelling_loc,
            expansion_start,
            expansion_end,
        });
        self.next_offset = offset + token_len + 1;
        offset
    }
}
