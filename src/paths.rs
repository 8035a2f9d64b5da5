//! Storage path resolution.
//!
//! All persisted state (catalogs, caches, recents, log) lives under one data
//! directory resolved exactly once at startup and passed into the components
//! that need it. Nothing below this module reads the environment again.

use std::env;
use std::path::{Path, PathBuf};

/// Resolved locations of the persisted catalogs, caches and ledger.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    data_dir: PathBuf,
}

impl StoragePaths {
    /// Resolve the data directory from `VIVACE_DATA_DIR` or XDG defaults.
    pub fn resolve() -> Option<Self> {
        if let Some(p) = env::var_os("VIVACE_DATA_DIR") {
            return Some(Self::at(PathBuf::from(p)));
        }

        let data_home = if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
            Some(PathBuf::from(xdg))
        } else if let Some(home) = env::var_os("HOME") {
            Some(PathBuf::from(home).join(".local").join("share"))
        } else {
            None
        };

        data_home.map(|d| Self::at(d.join("vivace")))
    }

    /// Use an explicit root. Tests point this at a tempdir.
    pub fn at(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Remote-playlist catalog: JSON object, display key -> playlist URL.
    pub fn remote_catalog(&self) -> PathBuf {
        self.data_dir.join("playlists_remote.json")
    }

    /// Local-directory catalog: JSON object, display key -> directory path.
    pub fn local_catalog(&self) -> PathBuf {
        self.data_dir.join("playlists_local.json")
    }

    /// Directory of cached snapshot files (`<name>.json`, each a Track array).
    pub fn caches_dir(&self) -> PathBuf {
        self.data_dir.join("caches")
    }

    /// Recently-played ledger: JSON Track array, oldest first.
    pub fn recents_file(&self) -> PathBuf {
        self.data_dir.join("recents.json")
    }

    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("vivace.log")
    }
}
