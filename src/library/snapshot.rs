//! Cached snapshot files: one JSON Track array per named cache.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

use super::model::Track;

/// Deserialize a snapshot file verbatim. Shape errors are reported as
/// corrupt persisted state; the caller decides how far to degrade.
pub fn read_snapshot(path: &Path) -> Result<Vec<Track>> {
    let raw = fs::read_to_string(path).map_err(|_| Error::SourceNotFound(path.to_path_buf()))?;
    serde_json::from_str(&raw).map_err(|e| Error::PersistedStateCorrupt {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Write `tracks` as the snapshot named `name` under `caches_dir`.
/// Returns the written path.
pub fn write_snapshot(caches_dir: &Path, name: &str, tracks: &[Track]) -> Result<std::path::PathBuf> {
    fs::create_dir_all(caches_dir)?;
    let path = caches_dir.join(format!("{name}.json"));
    fs::write(&path, serde_json::to_vec_pretty(tracks)?)?;
    Ok(path)
}
