//! The recently-played ledger.
//!
//! A capped, deduplicated, persisted list of tracks: oldest first on disk,
//! most recent first when read back. Single writer; the whole file is
//! rewritten on every record.

use std::fs;
use std::path::PathBuf;

use crate::error::Result;
use crate::library::Track;

#[derive(Clone)]
pub struct RecentsLedger {
    path: PathBuf,
    cap: usize,
}

impl RecentsLedger {
    pub fn new(path: PathBuf, cap: usize) -> Self {
        Self {
            path,
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Record `track` as most recently played.
    ///
    /// Any prior entry with the same url is removed first, so re-playing a
    /// track moves it to the most-recent position instead of duplicating it.
    /// The ledger is then truncated to the cap and persisted.
    pub fn record(&self, track: &Track) -> Result<()> {
        let mut entries = self.load();
        entries.retain(|t| t.url != track.url);
        entries.push(track.clone());

        if entries.len() > self.cap {
            let excess = entries.len() - self.cap;
            entries.drain(..excess);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        Ok(())
    }

    /// The last `limit` entries, most recently played first.
    pub fn read(&self, limit: usize) -> Vec<Track> {
        let entries = self.load();
        let skip = entries.len().saturating_sub(limit);
        entries.into_iter().skip(skip).rev().collect()
    }

    /// Load the persisted sequence; missing or corrupt state is an empty
    /// ledger, never an error.
    fn load(&self) -> Vec<Track> {
        let Ok(raw) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("recents file {} is corrupt, starting empty: {e}", self.path.display());
                Vec::new()
            }
        }
    }
}
