//! View tree fixtures
//!
//! A [`ViewFixture`] owns a temp directory with a `views/` tree and an empty
//! `cache/` directory. Templates are written by logical name, so
//! `layouts.base` lands at `views/layouts/base.html`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub struct ViewFixture {
    temp: TempDir,
    views: PathBuf,
    cache: PathBuf,
}

impl ViewFixture {
    pub fn new() -> Self {
        let temp = crate::temp_dir_in_workspace();
        let views = temp.path().join("views");
        let cache = temp.path().join("cache");
        fs::create_dir_all(&views).expect("Failed to create views dir");
        fs::create_dir_all(&cache).expect("Failed to create cache dir");

        Self { temp, views, cache }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn views(&self) -> &Path {
        &self.views
    }

    pub fn cache(&self) -> &Path {
        &self.cache
    }

    /// Write `views/<name as path><suffix>`, creating parent directories
    pub fn write(&self, name: &str, suffix: &str, content: &str) -> PathBuf {
        let mut path = self.views.clone();
        for part in name.split('.') {
            path.push(part);
        }
        let mut file_name = path.into_os_string();
        file_name.push(suffix);
        let path = PathBuf::from(file_name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create template dir");
        }
        fs::write(&path, content).expect("Failed to write template");
        path
    }

    /// Write an `.html` template whose mtime is a minute in the past, so a
    /// compile right after it is unambiguously newer
    pub fn template(&self, name: &str, content: &str) -> PathBuf {
        let path = self.write(name, ".html", content);
        age_file(&path, Duration::from_secs(60));
        path
    }

    /// Compiled artifacts currently in the cache dir (lock files excluded)
    pub fn cache_entries(&self) -> Vec<PathBuf> {
        let mut entries: Vec<PathBuf> = fs::read_dir(&self.cache)
            .map(|dir| {
                dir.filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_file() && p.extension().is_none_or(|ext| ext != "lock"))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort();
        entries
    }
}

impl Default for ViewFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Set a file's modification time
pub fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(time))
        .unwrap_or_else(|e| panic!("Failed to set mtime of {}: {}", path.display(), e));
}

/// Move a file's modification time `age` into the past
pub fn age_file(path: &Path, age: Duration) {
    set_mtime(path, SystemTime::now() - age);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_maps_dotted_name() {
        let fixture = ViewFixture::new();
        let path = fixture.write("layouts.base", ".html", "x");
        assert_eq!(path, fixture.views().join("layouts").join("base.html"));
        assert_eq!(fs::read_to_string(path).unwrap(), "x");
    }

    #[test]
    fn test_template_is_in_the_past() {
        let fixture = ViewFixture::new();
        let path = fixture.template("page", "x");
        let modified = fs::metadata(path).unwrap().modified().unwrap();
        assert!(modified < SystemTime::now() - Duration::from_secs(30));
    }

    #[test]
    fn test_cache_entries_skips_locks() {
        let fixture = ViewFixture::new();
        fs::write(fixture.cache().join("abc"), "").unwrap();
        fs::write(fixture.cache().join("abc.lock"), "").unwrap();
        assert_eq!(fixture.cache_entries(), vec![fixture.cache().join("abc")]);
    }
}
