#![no_main]
use libfuzzer_sys::fuzz_target;
use sqlitefs::{Database, Dispatcher, FileInfo, Timestamps};
use std::sync::Arc;

// Arbitrary driver paths must resolve to a status, never a panic
fuzz_target!(|data: &[u8]| {
    let path = String::from_utf8_lossy(data);

    let db = match Database::open_in_memory() {
        Ok(db) => db,
        Err(_) => return,
    };
    if db.insert_file("/a.txt", b"hello world", Timestamps::at(0)).is_err() {
        return;
    }

    let fs = Dispatcher::new(Arc::new(db));
    let mut buf = [0u8; 16];
    let _ = fs.read_file(&path, &mut buf, 0, &FileInfo::new());
    let _ = fs.get_file_information(&path, &FileInfo::new());
    fs.cleanup(&path, &FileInfo::new().delete_on_close(true));
});
