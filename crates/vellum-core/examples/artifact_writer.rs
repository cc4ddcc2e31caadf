//! Cache writer helper for cross-process tests
//!
//! Usage: artifact_writer <cache_dir> <source_path> <fill_char> <iterations>
//!
//! Stores the artifact for `source_path` `iterations` times. Every payload is
//! `PAYLOAD_LEN` copies of `fill_char`, so a reader can tell a complete
//! artifact from a torn one.

use std::env;
use std::path::PathBuf;
use vellum_core::cache::CompileCache;

const PAYLOAD_LEN: usize = 64 * 1024;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 5 {
        eprintln!("Usage: artifact_writer <cache_dir> <source_path> <fill_char> <iterations>");
        std::process::exit(1);
    }

    let cache = CompileCache::new(PathBuf::from(&args[1]));
    let source = PathBuf::from(&args[2]);
    let fill = args[3].chars().next().expect("fill_char must not be empty");
    let iterations: usize = args[4].parse().expect("iterations must be a number");

    let key = cache.key_for(&source);
    let payload: String = std::iter::repeat_n(fill, PAYLOAD_LEN).collect();

    for _ in 0..iterations {
        cache.store(&key, &payload).expect("Failed to store artifact");
    }

    println!("artifact_writer '{}' completed {} iterations", fill, iterations);
}
