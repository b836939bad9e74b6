#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

use hexrec::{HexImporter, ImportError, ImportOptions, MAX_RECORD_DATA, RecordReader};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub fn temp_dir(prefix: &str) -> PathBuf {
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let mut dir = std::env::temp_dir();
    dir.push(format!("hexrec_{prefix}_{}_{}", std::process::id(), id));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn write_file(path: &Path, data: &[u8]) {
    std::fs::write(path, data).unwrap();
}

pub fn run_hexrec(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hexrec"))
        .args(args)
        .output()
        .unwrap()
}

pub fn assert_success(output: &Output) {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("hexrec failed: {stderr}");
    }
}

/// Drain an importer, returning every chunk and the error that ended the pass.
pub fn drain<R, F>(mut importer: HexImporter<R, F>) -> (Vec<(u32, Vec<u8>)>, Option<ImportError>)
where
    R: std::io::Read,
    F: RecordReader,
{
    let mut buf = [0u8; MAX_RECORD_DATA];
    let mut chunks = Vec::new();
    while let Some(chunk) = importer.get(&mut buf) {
        chunks.push((chunk.address, buf[..chunk.len].to_vec()));
    }
    let error = importer.take_error();
    (chunks, error)
}

pub fn contiguous_only() -> ImportOptions {
    ImportOptions {
        allow_noncontiguous: false,
    }
}
