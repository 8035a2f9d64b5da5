use serde::{Deserialize, Serialize};

/// The uniform track record used everywhere downstream of resolution.
///
/// `url` is either a directly playable locator (absolute path, stream URL)
/// or a canonical watch URL for a remote track. It is never empty for a
/// track surfaced to playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub url: String,
}

impl Track {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// Where a playlist's tracks come from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// A local directory; tracks are its files, listed non-recursively.
    LocalDirectory,
    /// A remote playlist resolved through the extraction collaborator.
    RemotePlaylist,
    /// A saved snapshot file (JSON Track array) under the caches directory.
    CachedSnapshot,
    /// Synthetic entry: tracks come from the search collaborator.
    Search,
    /// Synthetic entry: tracks come from the recents ledger.
    Recents,
}

/// A resolved, typed pointer to a playlist source, as listed by the registry.
#[derive(Debug, Clone)]
pub struct PlaylistSource {
    /// Display name, including the catalog prefix (`YT - `, `LOCAL - `, ...).
    pub name: String,
    pub kind: SourceKind,
    /// Playlist URL, directory path or snapshot path. Empty for sentinels.
    pub locator: String,
}

impl PlaylistSource {
    pub fn new(name: impl Into<String>, kind: SourceKind, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            locator: locator.into(),
        }
    }
}
