use astpack_bitstream::io::{read_u32, read_u64};

use crate::error::{Category, EmitError};
use crate::offsets::OffsetIndex;

#[test]
fn records_grow_with_zero_fill() {
    let mut index = OffsetIndex::new(Category::Type, 100);
    index.record(102, 640);
    assert_eq!(index.len(), 3);
    assert_eq!(index.get(100), None);
    assert_eq!(index.get(102), Some(640));

    index.record(100, 320);
    index.record(101, 480);
    assert!(index.check_coverage(3).is_ok());
}

#[test]
fn coverage_gap_is_reported() {
    let mut index = OffsetIndex::new(Category::Decl, 1);
    index.record(2, 96);

    let err = index.check_coverage(2).unwrap_err();
    assert!(matches!(
        err,
        EmitError::OffsetCoverage {
            category: Category::Decl,
            recorded: 1,
            assigned: 2
        }
    ));
    assert_eq!(
        err.to_string(),
        "declaration offsets: 1 recorded, 2 IDs assigned"
    );
}

#[test]
fn blobs_are_little_endian() {
    let mut index = OffsetIndex::new(Category::Identifier, 1);
    index.record(1, 8);
    index.record(2, 0x0102_0304);

    let wide = index.to_u64_blob();
    assert_eq!(wide.len(), 16);
    assert_eq!(read_u64(&wide, 8), Some(0x0102_0304));

    let narrow = index.to_u32_blob().unwrap();
    assert_eq!(narrow.len(), 8);
    assert_eq!(read_u32(&narrow, 0), Some(8));
}

#[test]
fn narrow_blob_rejects_large_offsets() {
    let mut index = OffsetIndex::new(Category::Selector, 1);
    index.record(1, 1 << 40);
    assert!(matches!(
        index.to_u32_blob(),
        Err(EmitError::HashTable(_))
    ));
}
