//! The playlist source registry.
//!
//! Merges the persisted remote and local catalogs with a scan of the caches
//! directory and appends the two synthetic entries. Reload always re-derives
//! the whole list from disk; there is no incremental patching.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::paths::StoragePaths;

use super::model::{PlaylistSource, SourceKind};

pub const RECENTS_NAME: &str = "RECENTS";
pub const SEARCH_NAME: &str = "SEARCH YT";

pub struct SourceRegistry {
    paths: StoragePaths,
}

impl SourceRegistry {
    pub fn new(paths: StoragePaths) -> Self {
        Self { paths }
    }

    /// Load the full ordered source list.
    ///
    /// Order: remote catalog entries (`YT - `), local catalog entries
    /// (`LOCAL - `), cached snapshots (`CACHE - `, sorted by file name),
    /// then `RECENTS` and `SEARCH YT`.
    pub fn load(&self) -> Vec<PlaylistSource> {
        let mut sources: Vec<PlaylistSource> = Vec::new();

        for (key, url) in read_catalog(&self.paths.remote_catalog()) {
            sources.push(PlaylistSource::new(
                format!("YT - {key}"),
                SourceKind::RemotePlaylist,
                url,
            ));
        }

        for (key, dir) in read_catalog(&self.paths.local_catalog()) {
            sources.push(PlaylistSource::new(
                format!("LOCAL - {key}"),
                SourceKind::LocalDirectory,
                dir,
            ));
        }

        for (name, path) in scan_caches(&self.paths.caches_dir()) {
            sources.push(PlaylistSource::new(
                format!("CACHE - {name}"),
                SourceKind::CachedSnapshot,
                path,
            ));
        }

        sources.push(PlaylistSource::new(RECENTS_NAME, SourceKind::Recents, ""));
        sources.push(PlaylistSource::new(SEARCH_NAME, SourceKind::Search, ""));
        sources
    }

    /// Add a remote playlist under `name` and persist the catalog.
    /// The caller reloads the registry afterwards.
    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.append_entry(&self.paths.remote_catalog(), name, url)
    }

    /// Add a local directory under `name` and persist the catalog.
    pub fn add_local(&self, name: &str, dir: &str) -> Result<()> {
        self.append_entry(&self.paths.local_catalog(), name, dir)
    }

    /// Save `tracks` as the cached snapshot `name`; it appears as a
    /// `CACHE - <name>` source on the next load.
    pub fn save_cache(&self, name: &str, tracks: &[super::model::Track]) -> Result<std::path::PathBuf> {
        super::snapshot::write_snapshot(&self.paths.caches_dir(), name, tracks)
    }

    fn append_entry(&self, catalog: &Path, name: &str, locator: &str) -> Result<()> {
        let mut entries = read_catalog(catalog);
        // Re-adding a name overwrites its locator but keeps its position.
        match entries.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = locator.to_string(),
            None => entries.push((name.to_string(), locator.to_string())),
        }

        if let Some(parent) = catalog.parent() {
            fs::create_dir_all(parent)?;
        }
        let map: Map<String, Value> = entries
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        fs::write(catalog, serde_json::to_vec_pretty(&Value::Object(map))?)?;
        Ok(())
    }
}

/// Read a string -> string catalog, preserving entry order.
/// A missing or corrupt file degrades to an empty catalog.
fn read_catalog(path: &Path) -> Vec<(String, String)> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return Vec::new(),
    };

    match serde_json::from_str::<Map<String, Value>>(&raw) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect(),
        Err(e) => {
            let err = Error::PersistedStateCorrupt {
                path: path.to_path_buf(),
                detail: e.to_string(),
            };
            log::warn!("ignoring catalog: {err}");
            Vec::new()
        }
    }
}

/// List snapshot files as `(display name, absolute path)`, sorted by name.
fn scan_caches(dir: &Path) -> Vec<(String, String)> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut caches: Vec<(String, String)> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                return None;
            }
            let name = path.file_stem()?.to_str()?.to_string();
            Some((name, path.to_string_lossy().into_owned()))
        })
        .collect();
    caches.sort_by(|a, b| a.0.cmp(&b.0));
    caches
}
