use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vivace/config.toml` or
/// `~/.config/vivace/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VIVACE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub ui: UiSettings,
    pub recents: RecentsSettings,
    pub player: PlayerSettings,
    pub extractor: ExtractorSettings,
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Named color theme; unknown names fall back to the first theme.
    pub theme: String,

    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            theme: "slate".to_string(),
            header_text: " ~ vivace! music in a hurry ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecentsSettings {
    /// Maximum number of entries kept in the recently-played ledger.
    pub cap: usize,
}

impl Default for RecentsSettings {
    fn default() -> Self {
        Self { cap: 25 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Playback engine binary. Anything that speaks mpv's IPC protocol works.
    pub binary: String,
    /// Initial volume, 0-100.
    pub volume: u8,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            binary: "mpv".to_string(),
            volume: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorSettings {
    /// Extraction/search binary driven in JSON mode.
    pub binary: String,
    /// Number of results fetched for a search.
    pub search_limit: usize,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            search_limit: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Transport poll period in milliseconds.
    pub tick_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self { tick_ms: 50 }
    }
}
