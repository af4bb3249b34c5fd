//! Geo cache persisted as a single JSON object on disk.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::domain::error::DomainError;
use crate::domain::geo_cache::GeoCache;

/// Durable [`GeoCache`] that survives restarts.
///
/// The whole map is loaded on open and rewritten on every `set`. Write
/// failures are logged; the in-memory copy stays authoritative for the
/// session.
#[derive(Debug)]
pub struct FileGeoCache {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileGeoCache {
    /// Open the cache at `path`, creating it lazily on first write.
    ///
    /// # Errors
    /// Returns `DomainError::CacheStore` if the file exists but cannot be
    /// read or is not a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| DomainError::cache_store(path.display(), e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(DomainError::cache_store(path.display(), e.to_string())),
        };

        tracing::debug!(path = %path.display(), entries = entries.len(), "geo cache opened");
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(entries)?;
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl GeoCache for FileGeoCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.write();
        entries.insert(key.to_owned(), value);
        // Held across the write so concurrent sets cannot persist out of order.
        if let Err(e) = self.persist(&entries) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to persist geo cache");
        }
    }
}
