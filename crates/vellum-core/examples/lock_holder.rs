//! Lock holder helper for cross-process tests
//!
//! Usage: lock_holder <lock_path> <marker_path> <id>
//!
//! Takes the cache write lock, appends `process_<id>` to the marker file,
//! holds the lock briefly and releases it.

use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use vellum_core::lock::lock_for_write;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: lock_holder <lock_path> <marker_path> <id>");
        std::process::exit(1);
    }

    let lock_path = PathBuf::from(&args[1]);
    let marker_path = PathBuf::from(&args[2]);
    let id = &args[3];

    let _guard = lock_for_write(&lock_path, Duration::from_secs(10), "marker")
        .expect("Failed to acquire lock");

    let mut marker = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&marker_path)
        .expect("Failed to open marker file");
    writeln!(marker, "process_{} start", id).expect("Failed to write marker");
    std::thread::sleep(Duration::from_millis(100));
    writeln!(marker, "process_{} end", id).expect("Failed to write marker");
}
