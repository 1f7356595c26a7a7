//! Filesystem tile storage: keys are file paths.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::TileCache;
use crate::error::Result;

/// Stores each tile as one file at the path named by its key.
///
/// Writes go to a sibling temporary file that is renamed into place, so a
/// reader never observes a partially written tile.
#[derive(Debug, Clone, Default)]
pub struct DiskCache;

impl DiskCache {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

impl TileCache for DiskCache {
    fn exists(&self, key: &str) -> Result<bool> {
        match fs::metadata(key) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => {
                warn!(key, error = %e, "failed to stat tile");
                Err(e.into())
            }
        }
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(key) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(key, "tile cache miss");
                Ok(None)
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read tile");
                Err(e.into())
            }
        }
    }

    fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = Path::new(key);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                warn!(dir = %parent.display(), error = %e, "failed to create tile directory");
                e
            })?;
        }

        let tmp = temp_path(path);
        let written = fs::write(&tmp, data).and_then(|()| fs::rename(&tmp, path));
        if let Err(e) = written {
            warn!(key, error = %e, "failed to write tile");
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(key, bytes = data.len(), "stored tile");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(key) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!(key, error = %e, "failed to delete tile");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_put_get_creates_directories() {
        let dir = tempdir().unwrap();
        let key = dir.path().join("dem/g/3/2/5.raw");
        let key = key.to_str().unwrap();
        let cache = DiskCache::new();

        assert!(!cache.exists(key).unwrap());
        assert!(cache.get(key).unwrap().is_none());

        cache.put(key, b"RAW0data").unwrap();
        assert!(cache.exists(key).unwrap());
        assert_eq!(cache.get(key).unwrap().unwrap(), b"RAW0data");

        // no temporary file left behind
        let entries: Vec<_> = fs::read_dir(dir.path().join("dem/g/3/2")).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let dir = tempdir().unwrap();
        let key = dir.path().join("t.json");
        let key = key.to_str().unwrap();
        let cache = DiskCache::new();
        cache.put(key, b"old").unwrap();
        cache.put(key, b"new").unwrap();
        assert_eq!(cache.get(key).unwrap().unwrap(), b"new");
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let dir = tempdir().unwrap();
        let key = dir.path().join("nothing.raw");
        let key = key.to_str().unwrap();
        let cache = DiskCache::new();
        cache.delete(key).unwrap();

        cache.put(key, b"x").unwrap();
        cache.delete(key).unwrap();
        assert!(!cache.exists(key).unwrap());
    }
}
