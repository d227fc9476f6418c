use crate::constants::{BlockSchema, MAGIC};
use crate::{Abbrev, BitstreamWriter, dump};

const DEMO: &[BlockSchema] = &[BlockSchema {
    block_id: 8,
    name: "DEMO",
    records: &[(1, "ONE"), (2, "TWO")],
    has_stmts: false,
}];

#[test]
fn dump_small_stream() {
    let mut w = BitstreamWriter::new();
    w.write_magic(MAGIC);
    w.emit_block_info(DEMO, true).unwrap();
    w.enter_block(8, 4).unwrap();
    w.emit_record(1, &[1, 2]).unwrap();
    let abbrev = w.define_abbrev(Abbrev::new().literal(2).vbr(6).blob()).unwrap();
    w.emit_record_with_blob(abbrev, 2, &[7], b"abc").unwrap();
    w.emit_record(3, &[]).unwrap();
    w.exit_block().unwrap();
    let bytes = w.finish().unwrap();

    insta::assert_snapshot!(dump(&bytes).unwrap(), @r#"
    magic "CPCH"
    <BLOCKINFO>
      SETBID [8]
      BLOCKNAME "DEMO"
      SETRECORDNAME 1 "ONE"
      SETRECORDNAME 2 "TWO"
    </BLOCKINFO>
    <DEMO>
      ONE [1, 2]
      abbrev #4
      TWO [7] blob(3)
      RECORD3 []
    </DEMO>
    "#);
}
