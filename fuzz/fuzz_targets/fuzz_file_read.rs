#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use sqlitefs::{Database, Entry, File, FileInfo, Timestamps};
use std::sync::Arc;

#[derive(Debug, Arbitrary)]
struct ReadOp {
    offset: i64,
    len: u16,
}

// Read windows over arbitrary content stay inside both buffers
fuzz_target!(|input: &[u8]| {
    let mut u = Unstructured::new(input);

    let content: Vec<u8> = match u.arbitrary() {
        Ok(c) => c,
        Err(_) => return,
    };
    let ops: Vec<ReadOp> = match u.arbitrary() {
        Ok(ops) => ops,
        Err(_) => return,
    };

    let db = match Database::open_in_memory() {
        Ok(db) => db,
        Err(_) => return,
    };
    if db.insert_file("/f.bin", &content, Timestamps::at(0)).is_err() {
        return;
    }
    let file = File::new(Arc::new(db), "/f.bin");

    for op in ops.iter().take(16) {
        let mut buf = vec![0u8; op.len as usize];
        if let Ok(n) = file.read(&mut buf, op.offset, &FileInfo::new()) {
            assert!(n <= buf.len());
            if n > 0 {
                let start = op.offset as usize;
                assert_eq!(&buf[..n], &content[start..start + n]);
            }
        }
    }
});
