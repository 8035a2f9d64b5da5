//! Error taxonomy for the resolution and playback layers.
//!
//! Resolution and metadata errors are recoverable: callers degrade to empty
//! lists or stored titles instead of failing the session. Only a missing or
//! unusable playback engine is treated as a hard failure.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A declared local source directory no longer exists.
    #[error("source path does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The upstream extraction collaborator failed for a remote playlist.
    #[error("playlist extraction failed: {0}")]
    ExtractionFailed(String),

    /// Title enrichment via the metadata collaborator failed.
    /// Recovered silently by falling back to the stored title.
    #[error("metadata lookup failed: {0}")]
    MetadataLookupFailed(String),

    /// A persisted catalog, snapshot or ledger file is malformed.
    /// Load paths recover to an empty default.
    #[error("persisted state is corrupt ({}): {detail}", path.display())]
    PersistedStateCorrupt { path: PathBuf, detail: String },

    /// The external playback engine could not be launched or reached.
    /// Fatal to the play attempt; the session stays idle.
    #[error("player launch failed: {0}")]
    PlayerLaunchFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Io(std::io::Error::other(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
