//! Chained-bucket hash tables serialized into a single blob.
//!
//! Layout, starting at the table offset returned by [`OnDiskHashTableBuilder::emit`]:
//!
//! ```text
//! u32 num_buckets
//! u32 num_entries
//! u32 bucket[num_buckets]       offset of the first entry in the chain, 0 if empty
//! entries, grouped by bucket:
//!   u32 hash
//!   key/data lengths            written by the HashTableInfo
//!   key bytes
//!   data bytes
//!   u32 next                    offset of the next entry in the chain, 0 at the end
//! ```
//!
//! All offsets are relative to the start of the blob. Callers prefix the blob
//! with at least one word so that no entry can live at offset 0.

use crate::error::{HashTableError, ReadError};
use crate::io::{emit_u32, read_u16, read_u32};

/// Describes how keys and data of one table are hashed and written.
///
/// Data values are fully resolved before insertion, so only the length
/// prefix can fail: a length that does not fit its on-disk width. Length
/// mismatches are caught by the builder.
pub trait HashTableInfo {
    type Key;
    type Data;

    fn hash(&self, key: &Self::Key) -> u32;

    /// Write the length prefix and return `(key_len, data_len)`.
    fn emit_key_data_len(
        &mut self,
        out: &mut Vec<u8>,
        key: &Self::Key,
        data: &Self::Data,
    ) -> Result<(usize, usize), HashTableError>;

    fn emit_key(&mut self, out: &mut Vec<u8>, key: &Self::Key, key_len: usize);

    fn emit_data(&mut self, out: &mut Vec<u8>, key: &Self::Key, data: &Self::Data, data_len: usize);
}

pub const DEFAULT_BUCKET_COUNT: usize = 64;

struct Entry<K, D> {
    hash: u32,
    key: K,
    data: D,
}

pub struct OnDiskHashTableBuilder<I: HashTableInfo> {
    entries: Vec<Entry<I::Key, I::Data>>,
    /// Entry indices per bucket, in insertion order.
    buckets: Vec<Vec<usize>>,
}

impl<I: HashTableInfo> Default for OnDiskHashTableBuilder<I> {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET_COUNT)
    }
}

impl<I: HashTableInfo> OnDiskHashTableBuilder<I> {
    /// `initial_buckets` is rounded up to a power of two.
    pub fn new(initial_buckets: usize) -> Self {
        let count = initial_buckets.max(1).next_power_of_two();
        Self {
            entries: Vec::new(),
            buckets: vec![Vec::new(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn insert(&mut self, info: &I, key: I::Key, data: I::Data) {
        if 4 * (self.entries.len() + 1) > 3 * self.buckets.len() {
            self.resize(self.buckets.len() * 2);
        }
        let hash = info.hash(&key);
        let index = self.entries.len();
        self.entries.push(Entry { hash, key, data });
        let bucket = hash as usize & (self.buckets.len() - 1);
        self.buckets[bucket].push(index);
    }

    fn resize(&mut self, count: usize) {
        let mut buckets = vec![Vec::new(); count];
        for (index, entry) in self.entries.iter().enumerate() {
            buckets[entry.hash as usize & (count - 1)].push(index);
        }
        self.buckets = buckets;
    }

    /// Serialize the table onto `out` and return the offset of its header.
    pub fn emit(self, out: &mut Vec<u8>, info: &mut I) -> Result<u32, HashTableError> {
        let table_offset = out.len();
        emit_u32(out, self.buckets.len() as u32);
        emit_u32(out, self.entries.len() as u32);
        let bucket_array = out.len();
        out.resize(bucket_array + 4 * self.buckets.len(), 0);

        for (bucket, chain) in self.buckets.iter().enumerate() {
            let mut link = bucket_array + 4 * bucket;
            for &index in chain {
                let entry = &self.entries[index];
                let entry_offset = u32::try_from(out.len())
                    .map_err(|_| HashTableError::OffsetOverflow { offset: out.len() })?;
                out[link..link + 4].copy_from_slice(&entry_offset.to_le_bytes());

                emit_u32(out, entry.hash);
                let (key_len, data_len) = info.emit_key_data_len(out, &entry.key, &entry.data)?;

                let start = out.len();
                info.emit_key(out, &entry.key, key_len);
                let written = out.len() - start;
                if written != key_len {
                    return Err(HashTableError::KeyLength {
                        entry: index,
                        announced: key_len,
                        written,
                    });
                }

                let start = out.len();
                info.emit_data(out, &entry.key, &entry.data, data_len);
                let written = out.len() - start;
                if written != data_len {
                    return Err(HashTableError::DataLength {
                        entry: index,
                        announced: data_len,
                        written,
                    });
                }

                link = out.len();
                emit_u32(out, 0);
            }
        }

        u32::try_from(table_offset)
            .map_err(|_| HashTableError::OffsetOverflow {
                offset: table_offset,
            })
    }
}

// ============================================================================
// Hashing
// ============================================================================

/// Continue a Bernstein hash from `seed`.
pub fn bernstein_hash_partial(bytes: &[u8], seed: u32) -> u32 {
    let r = bytes
        .iter()
        .fold(seed, |r, &c| r.wrapping_mul(33).wrapping_add(c as u32));
    r.wrapping_add(r >> 5)
}

pub fn bernstein_hash(bytes: &[u8]) -> u32 {
    bernstein_hash_partial(bytes, 0)
}

// ============================================================================
// Read side
// ============================================================================

/// How an entry's length prefix is laid out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LengthLayout {
    /// `u16 key_len, u16 data_len`
    KeyThenData16,
    /// `u16 data_len, u16 key_len`
    DataThenKey16,
}

impl LengthLayout {
    fn read(self, blob: &[u8], at: usize) -> Option<(usize, usize)> {
        let first = read_u16(blob, at)? as usize;
        let second = read_u16(blob, at + 2)? as usize;
        Some(match self {
            LengthLayout::KeyThenData16 => (first, second),
            LengthLayout::DataThenKey16 => (second, first),
        })
    }
}

/// One entry located in a serialized table.
#[derive(Clone, Copy, Debug)]
pub struct RawEntry<'a> {
    /// Offset of the entry's hash field.
    pub offset: usize,
    /// Offset of the first key byte.
    pub key_offset: usize,
    pub hash: u32,
    pub key: &'a [u8],
    pub data: &'a [u8],
}

/// Probe-only view over a serialized table.
pub struct HashTableView<'a> {
    blob: &'a [u8],
    layout: LengthLayout,
    num_buckets: usize,
    num_entries: usize,
    bucket_array: usize,
}

impl<'a> HashTableView<'a> {
    pub fn new(blob: &'a [u8], table_offset: usize, layout: LengthLayout) -> Result<Self, ReadError> {
        let truncated = ReadError::TruncatedTable {
            offset: table_offset,
        };
        let num_buckets = read_u32(blob, table_offset).ok_or(truncated.clone())? as usize;
        let num_entries = read_u32(blob, table_offset + 4).ok_or(truncated.clone())? as usize;
        let bucket_array = table_offset + 8;
        if blob.len() < bucket_array + 4 * num_buckets || !num_buckets.is_power_of_two() {
            return Err(truncated);
        }
        Ok(Self {
            blob,
            layout,
            num_buckets,
            num_entries,
            bucket_array,
        })
    }

    pub fn len(&self) -> usize {
        self.num_entries
    }

    pub fn is_empty(&self) -> bool {
        self.num_entries == 0
    }

    fn entry_at(&self, offset: usize) -> Result<(RawEntry<'a>, usize), ReadError> {
        let truncated = ReadError::TruncatedTable { offset };
        let hash = read_u32(self.blob, offset).ok_or(truncated.clone())?;
        let (key_len, data_len) = self
            .layout
            .read(self.blob, offset + 4)
            .ok_or(truncated.clone())?;
        let key_offset = offset + 8;
        let data_offset = key_offset + key_len;
        let next_field = data_offset + data_len;
        let key = self
            .blob
            .get(key_offset..data_offset)
            .ok_or(truncated.clone())?;
        let data = self
            .blob
            .get(data_offset..next_field)
            .ok_or(truncated.clone())?;
        let next = read_u32(self.blob, next_field).ok_or(truncated)? as usize;
        let entry = RawEntry {
            offset,
            key_offset,
            hash,
            key,
            data,
        };
        Ok((entry, next))
    }

    fn chain(&self, bucket: usize) -> Result<Vec<RawEntry<'a>>, ReadError> {
        let mut entries = Vec::new();
        let mut offset = read_u32(self.blob, self.bucket_array + 4 * bucket)
            .ok_or(ReadError::TruncatedTable {
                offset: self.bucket_array,
            })? as usize;
        while offset != 0 {
            let (entry, next) = self.entry_at(offset)?;
            entries.push(entry);
            offset = next;
        }
        Ok(entries)
    }

    /// Find the entry with `hash` whose key satisfies `matches`.
    pub fn find(
        &self,
        hash: u32,
        mut matches: impl FnMut(&[u8]) -> bool,
    ) -> Result<Option<RawEntry<'a>>, ReadError> {
        let bucket = hash as usize & (self.num_buckets - 1);
        Ok(self
            .chain(bucket)?
            .into_iter()
            .find(|entry| entry.hash == hash && matches(entry.key)))
    }

    /// All entries, bucket by bucket.
    pub fn entries(&self) -> Result<Vec<RawEntry<'a>>, ReadError> {
        let mut all = Vec::with_capacity(self.num_entries);
        for bucket in 0..self.num_buckets {
            all.extend(self.chain(bucket)?);
        }
        Ok(all)
    }
}
