//! Concurrent callbacks against one shared store

use parking_lot::Mutex;
use sqlitefs::{
    Database, Dispatcher, Entry, File, FileInfo, OpError, Status, StoreBuilder, Timestamps,
};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_concurrent_reads() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let content: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
    db.insert_file("/data.bin", &content, Timestamps::now())
        .unwrap();

    let content = Arc::new(content);
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let db = db.clone();
            let content = content.clone();
            thread::spawn(move || {
                let file = File::new(db, "/data.bin");
                for i in 0..50 {
                    let offset = (t * 4096 + i * 97) % content.len();
                    let mut buf = vec![0u8; 1000];
                    let n = file.read(&mut buf, offset as i64, &FileInfo::new()).unwrap();
                    let expected = 1000.min(content.len() - offset);
                    assert_eq!(n, expected);
                    assert_eq!(&buf[..n], &content[offset..offset + n]);
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn test_reads_racing_delete_see_whole_row_or_nothing() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    let content = vec![7u8; 8192];
    db.insert_file("/race.bin", &content, Timestamps::now())
        .unwrap();

    let outcomes = Arc::new(Mutex::new(Vec::new()));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let db = db.clone();
            let outcomes = outcomes.clone();
            thread::spawn(move || {
                let file = File::new(db, "/race.bin");
                for _ in 0..100 {
                    let mut buf = vec![0u8; 8192];
                    let result = file.read(&mut buf, 0, &FileInfo::new());
                    if let Ok(n) = result {
                        // No torn rows: a successful read returns the full blob
                        assert_eq!(n, 8192);
                        assert!(buf.iter().all(|&b| b == 7));
                    }
                    outcomes.lock().push(result);
                }
            })
        })
        .collect();

    let deleter = {
        let db = db.clone();
        thread::spawn(move || {
            let file = File::new(db, "/race.bin");
            file.cleanup(&FileInfo::new().delete_on_close(true));
        })
    };

    deleter.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }

    let outcomes = outcomes.lock();
    assert_eq!(outcomes.len(), 400);
    assert!(outcomes
        .iter()
        .all(|r| matches!(r, Ok(8192) | Err(OpError::NotFound))));

    // After the delete committed, every read reports not found
    let mut buf = [0u8; 1];
    assert_eq!(
        File::new(db.clone(), "/race.bin").read(&mut buf, 0, &FileInfo::new()),
        Err(OpError::NotFound)
    );
    assert_eq!(db.count().unwrap(), 0);
}

#[test]
fn test_independent_mounts_coexist() {
    let temp_dir = TempDir::new().unwrap();

    let first = StoreBuilder::new()
        .path(temp_dir.path().join("first.db"))
        .build()
        .unwrap();
    let second = StoreBuilder::new()
        .path(temp_dir.path().join("second.db"))
        .table("files")
        .build()
        .unwrap();
    first.ensure_schema().unwrap();
    second.ensure_schema().unwrap();

    first.insert_file("/same.txt", b"first", Timestamps::now()).unwrap();
    second.insert_file("/same.txt", b"second!", Timestamps::now()).unwrap();

    let a = Dispatcher::new(first);
    let b = Dispatcher::new(second);

    let mut buf = [0u8; 16];
    assert_eq!(a.read_file("/same.txt", &mut buf, 0, &FileInfo::new()), (Status::Success, 5));
    assert_eq!(&buf[..5], b"first");
    assert_eq!(b.read_file("/same.txt", &mut buf, 0, &FileInfo::new()), (Status::Success, 7));
    assert_eq!(&buf[..7], b"second!");

    b.cleanup("/same.txt", &FileInfo::new().delete_on_close(true));
    assert_eq!(a.read_file("/same.txt", &mut buf, 0, &FileInfo::new()).0, Status::Success);
    assert_eq!(b.read_file("/same.txt", &mut buf, 0, &FileInfo::new()).0, Status::NotFound);
}

#[test]
fn test_dispatcher_shared_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let db = StoreBuilder::new()
        .path(temp_dir.path().join("shared.db"))
        .build()
        .unwrap();
    db.ensure_schema().unwrap();

    for i in 0..16 {
        db.insert_file(&format!("/f{}.txt", i), format!("file {}", i).as_bytes(), Timestamps::now())
            .unwrap();
    }

    let fs = Dispatcher::new(db.clone());
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let fs = fs.clone();
            thread::spawn(move || {
                let path = format!("/f{}.txt", i);
                let expected = format!("file {}", i);
                let mut buf = [0u8; 32];

                let (status, n) = fs.read_file(&path, &mut buf, 0, &FileInfo::new());
                assert_eq!(status, Status::Success);
                assert_eq!(&buf[..n], expected.as_bytes());

                if i % 2 == 0 {
                    fs.cleanup(&path, &FileInfo::new().delete_on_close(true));
                }
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(db.count().unwrap(), 8);
}
