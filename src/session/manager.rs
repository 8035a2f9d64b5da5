//! The playback session manager.
//!
//! Owns at most one live engine handle. Starting a track always tears the
//! prior handle down first, resolves the display title, records the track
//! into the recents ledger and only then launches a replacement handle.

use std::path::Path;

use crate::error::Result;
use crate::library::Track;
use crate::lyrics::{self, LyricLine};
use crate::player::{LaunchConfig, PlayerBackend, PlayerHandle};
use crate::recents::RecentsLedger;
use crate::remote::{self, LyricsProvider, MetadataProvider};

/// Lifecycle of one playback session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Loading,
    Playing,
    Paused,
}

pub struct PlaybackSession {
    backend: Box<dyn PlayerBackend>,
    metadata: Box<dyn MetadataProvider>,
    lyrics_provider: Box<dyn LyricsProvider>,
    recents: RecentsLedger,

    handle: Option<Box<dyn PlayerHandle>>,
    state: SessionState,
    now_playing: Option<String>,
    current_url: Option<String>,
    lyrics: Option<Vec<LyricLine>>,
    lyric_text: Option<String>,

    /// 0 = unknown; re-resolved lazily from the live engine per track.
    known_duration_secs: f64,
    /// Last published (integer-truncated) position.
    position_secs: f64,
    volume: u8,
}

impl PlaybackSession {
    pub fn new(
        backend: Box<dyn PlayerBackend>,
        metadata: Box<dyn MetadataProvider>,
        lyrics_provider: Box<dyn LyricsProvider>,
        recents: RecentsLedger,
        volume: u8,
    ) -> Self {
        Self {
            backend,
            metadata,
            lyrics_provider,
            recents,
            handle: None,
            state: SessionState::Idle,
            now_playing: None,
            current_url: None,
            lyrics: None,
            lyric_text: None,
            known_duration_secs: 0.0,
            position_secs: 0.0,
            volume: volume.min(100),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// The active lyric line, once timed lyrics exist for the current track.
    pub fn lyric_text(&self) -> Option<&str> {
        self.lyric_text.as_deref()
    }

    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }

    pub fn duration_secs(&self) -> f64 {
        self.known_duration_secs
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Start playing `track`, replacing whatever was playing before.
    ///
    /// Title resolution and ledger recording happen even when the launch
    /// itself fails; only a launch failure is surfaced to the caller.
    pub fn play_track(&mut self, track: &Track) -> Result<()> {
        self.teardown_handle();
        self.state = SessionState::Loading;
        self.now_playing = None;
        self.current_url = None;
        self.lyric_text = None;
        self.known_duration_secs = 0.0;
        self.position_secs = 0.0;

        let title = self.resolve_title(track);
        self.lyrics = self.lyrics_provider.lines_for(track);
        if self.lyrics.is_some() {
            self.lyric_text = Some(lyrics::GAP_PLACEHOLDER.to_string());
        }

        let entry = Track::new(title.clone(), track.url.clone());
        if let Err(e) = self.recents.record(&entry) {
            log::warn!("failed to record recents entry: {e}");
        }

        let config = LaunchConfig {
            volume: self.volume,
            ..LaunchConfig::default()
        };
        match self.backend.launch(&track.url, &config) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.now_playing = Some(title);
                self.current_url = Some(track.url.clone());
                self.state = SessionState::Playing;
                log::info!("playing {}", track.url);
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Idle;
                self.lyrics = None;
                self.lyric_text = None;
                Err(e)
            }
        }
    }

    /// Display title for `track`: enriched via the metadata collaborator for
    /// watch URLs (failures fall back silently to the stored title), the
    /// locator's base name otherwise.
    fn resolve_title(&self, track: &Track) -> String {
        if remote::is_watch_url(&track.url) {
            match self.metadata.title_for(&track.url) {
                Ok(title) => title,
                Err(e) => {
                    log::debug!("title enrichment failed, keeping stored title: {e}");
                    track.title.clone()
                }
            }
        } else {
            Path::new(&track.url)
                .file_name()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .unwrap_or_else(|| track.title.clone())
        }
    }

    pub fn stop(&mut self) {
        self.teardown_handle();
        self.state = SessionState::Idle;
        self.now_playing = None;
        self.current_url = None;
        self.lyrics = None;
        self.lyric_text = None;
        self.known_duration_secs = 0.0;
        self.position_secs = 0.0;
    }

    /// Terminate any live handle. Called on every shutdown path.
    pub fn shutdown(&mut self) {
        self.stop();
    }

    pub fn toggle_pause(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };
        let (target, next) = match self.state {
            SessionState::Playing => (true, SessionState::Paused),
            SessionState::Paused => (false, SessionState::Playing),
            SessionState::Idle | SessionState::Loading => return,
        };
        match handle.set_paused(target) {
            Ok(()) => self.state = next,
            Err(e) => log::warn!("pause command failed: {e}"),
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.set_volume(self.volume) {
                log::warn!("volume command failed: {e}");
            }
        }
    }

    pub fn seek_to(&mut self, position_secs: f64) {
        if let Some(handle) = self.handle.as_mut() {
            if let Err(e) = handle.seek_to(position_secs) {
                log::warn!("seek command failed: {e}");
            }
        }
    }

    /// One transport poll.
    ///
    /// Reconciles the pause flag with the engine (the user can pause from
    /// the engine's own controls), lazily captures the duration once the
    /// engine reports one, and, unless paused or the seek control is under
    /// user override, publishes the truncated position and the lyric line
    /// covering it. An unreadable engine means it went away (window closed,
    /// process died): the session returns to idle.
    pub fn sync_tick(&mut self, seek_overridden: bool) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        let engine_paused = match handle.paused() {
            Ok(p) => p,
            Err(e) => {
                log::info!("engine went away: {e}");
                self.stop();
                return;
            }
        };
        match (self.state, engine_paused) {
            (SessionState::Playing, true) => self.state = SessionState::Paused,
            (SessionState::Paused, false) => self.state = SessionState::Playing,
            _ => {}
        }

        if self.state != SessionState::Playing || seek_overridden {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        if self.known_duration_secs == 0.0 {
            if let Ok(Some(duration)) = handle.duration() {
                self.known_duration_secs = duration;
            }
        }

        if let Ok(Some(position)) = handle.position() {
            self.position_secs = position.trunc();
            if let Some(lines) = &self.lyrics {
                let at_ms = (position * 1000.0) as u64;
                self.lyric_text = Some(lyrics::line_at(lines, at_ms).to_string());
            }
        }
    }

    fn teardown_handle(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.terminate() {
                log::warn!("failed to terminate engine handle: {e}");
            }
        }
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.teardown_handle();
    }
}
