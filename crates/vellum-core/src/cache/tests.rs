use super::*;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn source_in_past(dir: &Path) -> PathBuf {
    let source = dir.join("page.html");
    fs::write(&source, "hello").unwrap();
    set_mtime(&source, SystemTime::now() - Duration::from_secs(60));
    source
}

#[test]
fn test_key_is_deterministic_hex_of_path() {
    let cache = CompileCache::new("/tmp/cache");
    let a = cache.key_for(Path::new("/views/page.html"));
    let b = cache.key_for(Path::new("/views/page.html"));

    assert_eq!(a, b);
    assert_eq!(a.as_str().len(), 64);
    assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_key_differs_per_path() {
    let cache = CompileCache::new("/tmp/cache");
    let a = cache.key_for(Path::new("/views/a.html"));
    let b = cache.key_for(Path::new("/views/b.html"));

    assert_ne!(a, b);
}

#[test]
fn test_key_ignores_content() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("page.html");
    let cache = CompileCache::new(temp.path().join("cache"));

    fs::write(&source, "one").unwrap();
    let before = cache.key_for(&source);
    fs::write(&source, "two").unwrap();

    assert_eq!(before, cache.key_for(&source));
}

#[test]
fn test_missing_artifact_is_stale() {
    let temp = TempDir::new().unwrap();
    let source = source_in_past(temp.path());
    let cache = CompileCache::new(temp.path().join("cache"));
    let key = cache.key_for(&source);

    assert!(cache.is_stale(&source, &key).unwrap());
}

#[test]
fn test_fresh_artifact_is_not_stale() {
    let temp = TempDir::new().unwrap();
    let source = source_in_past(temp.path());
    let cache = CompileCache::new(temp.path().join("cache"));
    let key = cache.key_for(&source);

    cache.store(&key, "compiled").unwrap();

    assert!(!cache.is_stale(&source, &key).unwrap());
}

#[test]
fn test_equal_mtime_counts_as_stale() {
    let temp = TempDir::new().unwrap();
    let source = source_in_past(temp.path());
    let cache = CompileCache::new(temp.path().join("cache"));
    let key = cache.key_for(&source);

    let artifact = cache.store(&key, "compiled").unwrap();
    let source_time = fs::metadata(&source).unwrap().modified().unwrap();
    set_mtime(&artifact, source_time);

    assert!(cache.is_stale(&source, &key).unwrap());
}

#[test]
fn test_touched_source_makes_artifact_stale() {
    let temp = TempDir::new().unwrap();
    let source = source_in_past(temp.path());
    let cache = CompileCache::new(temp.path().join("cache"));
    let key = cache.key_for(&source);

    cache.store(&key, "compiled").unwrap();
    set_mtime(&source, SystemTime::now() + Duration::from_secs(60));

    assert!(cache.is_stale(&source, &key).unwrap());
}

#[test]
fn test_ttl_expires_old_artifact() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("page.html");
    fs::write(&source, "hello").unwrap();
    set_mtime(&source, SystemTime::now() - Duration::from_secs(3600));

    let mut cache = CompileCache::new(temp.path().join("cache"));
    cache.set_ttl(Some(Duration::from_secs(60)));
    let key = cache.key_for(&source);

    let artifact = cache.store(&key, "compiled").unwrap();
    assert!(!cache.is_stale(&source, &key).unwrap());

    set_mtime(&artifact, SystemTime::now() - Duration::from_secs(600));
    assert!(cache.is_stale(&source, &key).unwrap());
}

#[test]
fn test_missing_source_is_an_error() {
    let temp = TempDir::new().unwrap();
    let cache = CompileCache::new(temp.path().join("cache"));
    let source = temp.path().join("gone.html");
    let key = cache.key_for(&source);

    let err = cache.is_stale(&source, &key).unwrap_err();
    assert!(matches!(err, VellumError::TemplateReadError { .. }));
}

#[test]
fn test_store_then_load_returns_same_bytes() {
    let temp = TempDir::new().unwrap();
    let cache = CompileCache::new(temp.path().join("cache"));
    let key = cache.key_for(Path::new("/views/a.html"));

    let artifact = cache.store(&key, "<%= name %>\n").unwrap();

    assert_eq!(artifact, cache.artifact_path(&key));
    assert_eq!(cache.load(&key).unwrap(), "<%= name %>\n");
}

#[test]
fn test_store_overwrites_previous_artifact() {
    let temp = TempDir::new().unwrap();
    let cache = CompileCache::new(temp.path().join("cache"));
    let key = cache.key_for(Path::new("/views/a.html"));

    cache.store(&key, "old").unwrap();
    cache.store(&key, "new").unwrap();

    assert_eq!(cache.load(&key).unwrap(), "new");
}

#[cfg(unix)]
#[test]
fn test_unwritable_cache_dir_is_a_write_failure() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let cache_dir = temp.path().join("cache");
    fs::create_dir(&cache_dir).unwrap();
    fs::set_permissions(&cache_dir, fs::Permissions::from_mode(0o500)).unwrap();

    // root ignores directory permissions
    if fs::write(cache_dir.join("probe"), "x").is_ok() {
        return;
    }

    let cache = CompileCache::new(&cache_dir);
    let key = cache.key_for(Path::new("/views/a.html"));
    let err = cache.store(&key, "compiled").unwrap_err();

    assert!(matches!(err, VellumError::CacheWriteFailure { .. }));
    assert!(err.to_string().starts_with("CACHE_WRITE_FAILURE"));
    fs::set_permissions(&cache_dir, fs::Permissions::from_mode(0o700)).unwrap();
}

#[test]
fn test_concurrent_writers_leave_a_complete_artifact() {
    use std::sync::{Arc, Barrier};
    use std::thread;

    let temp = TempDir::new().unwrap();
    let cache = Arc::new(CompileCache::new(temp.path().join("cache")));
    let key = cache.key_for(Path::new("/views/shared.html"));
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let body = format!("writer-{}", i).repeat(1000);
                cache.store(&key, &body).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let content = cache.load(&key).unwrap();
    let first = &content[..8];
    assert_eq!(content, first.repeat(1000), "artifact mixes writers");
}
