//! Upstream collaborator interfaces: playlist extraction, search, metadata
//! and timed lyrics. The services behind them are opaque; the session and
//! resolver only see these traits.

mod ytdlp;

pub use ytdlp::YtDlp;

use std::path::Path;

use crate::error::Result;
use crate::library::Track;
use crate::lyrics::{self, LyricLine};

/// Canonical watch-URL shape for remote tracks. Tracks with this prefix get
/// their titles enriched through the metadata collaborator before playback.
pub const WATCH_URL_PREFIX: &str = "https://music.youtube.com/watch?v=";

pub fn is_watch_url(url: &str) -> bool {
    url.starts_with(WATCH_URL_PREFIX)
}

/// Resolves a remote playlist locator into an ordered track list without
/// downloading any media.
pub trait PlaylistExtractor {
    fn extract_flat(&self, url: &str) -> Result<Vec<Track>>;
}

/// Free-text song search; results are ordinary tracks whose url is the
/// canonical watch URL.
pub trait SearchProvider {
    fn search(&self, term: &str) -> Result<Vec<Track>>;
}

/// Title lookup for a single remote track.
pub trait MetadataProvider {
    fn title_for(&self, url: &str) -> Result<String>;
}

/// Timed lyrics for a track. `None` means the upstream has no timestamped
/// data for it, which is the common case and not an error.
pub trait LyricsProvider {
    fn lines_for(&self, track: &Track) -> Option<Vec<LyricLine>>;
}

/// Lyrics from sidecar `.lrc` files next to local media.
pub struct SidecarLyrics;

impl LyricsProvider for SidecarLyrics {
    fn lines_for(&self, track: &Track) -> Option<Vec<LyricLine>> {
        let media = Path::new(&track.url);
        if !media.is_file() {
            return None;
        }
        lyrics::parse_lrc(lyrics::sidecar_path(media))
    }
}
