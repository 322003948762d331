//! Parse cache: parsed tables stored as JSON under a content hash.
//!
//! Layout: `<root>/<id>/manifest.json` and `<root>/<id>/table.json`.

use std::fs;
use std::path::{Path, PathBuf};

use fl_core::Table;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ResultsError, ResultsResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    pub id: String,
    /// The parsed file, as given.
    pub source: PathBuf,
    /// Parser that produced the table (`solution`, `report`, ...).
    pub kind: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    pub rows: usize,
}

impl CacheManifest {
    pub fn new(id: impl Into<String>, source: &Path, kind: impl Into<String>, rows: usize) -> Self {
        Self {
            id: id.into(),
            source: source.to_path_buf(),
            kind: kind.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            rows,
        }
    }
}

#[derive(Clone)]
pub struct ParseCache {
    root_dir: PathBuf,
}

impl ParseCache {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Cache under `.fluentio/cache` next to the parsed file.
    pub fn for_file(path: &Path) -> ResultsResult<Self> {
        let dir = path.parent().ok_or_else(|| ResultsError::InvalidPath {
            message: format!("{} has no parent directory", path.display()),
        })?;
        Self::new(dir.join(".fluentio").join("cache"))
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn entry_dir(&self, id: &str) -> PathBuf {
        self.root_dir.join(id)
    }

    pub fn has(&self, id: &str) -> bool {
        let dir = self.entry_dir(id);
        dir.join("manifest.json").exists() && dir.join("table.json").exists()
    }

    pub fn save<K: Serialize>(&self, manifest: &CacheManifest, table: &Table<K>) -> ResultsResult<()> {
        let dir = self.entry_dir(&manifest.id);
        fs::create_dir_all(&dir)?;

        fs::write(dir.join("table.json"), serde_json::to_string(table)?)?;
        fs::write(
            dir.join("manifest.json"),
            serde_json::to_string_pretty(manifest)?,
        )?;

        debug!(id = %manifest.id, kind = %manifest.kind, rows = manifest.rows, "cached table");
        Ok(())
    }

    pub fn load_manifest(&self, id: &str) -> ResultsResult<CacheManifest> {
        let path = self.entry_dir(id).join("manifest.json");
        if !path.exists() {
            return Err(ResultsError::EntryNotFound { id: id.to_string() });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load<K: DeserializeOwned>(&self, id: &str) -> ResultsResult<Table<K>> {
        let path = self.entry_dir(id).join("table.json");
        if !path.exists() {
            return Err(ResultsError::EntryNotFound { id: id.to_string() });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Every readable manifest, oldest first. Unreadable entries are skipped.
    pub fn list(&self) -> ResultsResult<Vec<CacheManifest>> {
        let mut entries = Vec::new();

        if !self.root_dir.exists() {
            return Ok(entries);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&id) {
                    entries.push(manifest);
                }
            }
        }

        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(entries)
    }

    pub fn delete(&self, id: &str) -> ResultsResult<()> {
        let dir = self.entry_dir(id);
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        Ok(())
    }
}
