use std::sync::{Arc, Mutex};

use tempfile::tempdir;

use crate::error::{Error, Result};
use crate::library::Track;
use crate::lyrics::LyricLine;
use crate::player::{LaunchConfig, PlayerBackend, PlayerHandle};
use crate::recents::RecentsLedger;
use crate::remote::{LyricsProvider, MetadataProvider};

use super::{PlaybackSession, SessionState};

/// Observable log of engine lifecycle events, shared with the fakes.
#[derive(Default)]
struct EngineLog {
    events: Vec<String>,
    live: usize,
    next_id: usize,
}

type SharedLog = Arc<Mutex<EngineLog>>;

struct FakeBackend {
    log: SharedLog,
    fail_launch: bool,
}

impl PlayerBackend for FakeBackend {
    fn launch(&self, url: &str, _config: &LaunchConfig) -> Result<Box<dyn PlayerHandle>> {
        if self.fail_launch {
            return Err(Error::PlayerLaunchFailed("no engine".into()));
        }
        let mut log = self.log.lock().unwrap();
        log.next_id += 1;
        log.live += 1;
        let id = log.next_id;
        log.events.push(format!("launch#{id} {url}"));
        assert!(log.live <= 1, "two engine handles were live at once");
        drop(log);

        Ok(Box::new(FakeHandle {
            log: self.log.clone(),
            id,
            terminated: false,
            paused: false,
            position: Some(12.7),
            duration: Some(180.0),
        }))
    }
}

struct FakeHandle {
    log: SharedLog,
    id: usize,
    terminated: bool,
    paused: bool,
    position: Option<f64>,
    duration: Option<f64>,
}

impl PlayerHandle for FakeHandle {
    fn position(&mut self) -> Result<Option<f64>> {
        Ok(self.position)
    }
    fn duration(&mut self) -> Result<Option<f64>> {
        Ok(self.duration)
    }
    fn paused(&mut self) -> Result<bool> {
        Ok(self.paused)
    }
    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.paused = paused;
        Ok(())
    }
    fn set_volume(&mut self, _volume: u8) -> Result<()> {
        Ok(())
    }
    fn seek_to(&mut self, _position_secs: f64) -> Result<()> {
        Ok(())
    }
    fn terminate(&mut self) -> Result<()> {
        if !self.terminated {
            self.terminated = true;
            let mut log = self.log.lock().unwrap();
            log.live -= 1;
            log.events.push(format!("terminate#{}", self.id));
        }
        Ok(())
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        let _ = self.terminate();
    }
}

struct FakeMetadata {
    title: Option<String>,
}

impl MetadataProvider for FakeMetadata {
    fn title_for(&self, _url: &str) -> Result<String> {
        self.title
            .clone()
            .ok_or_else(|| Error::MetadataLookupFailed("upstream rejected".into()))
    }
}

struct FakeLyrics {
    lines: Option<Vec<LyricLine>>,
}

impl LyricsProvider for FakeLyrics {
    fn lines_for(&self, _track: &Track) -> Option<Vec<LyricLine>> {
        self.lines.clone()
    }
}

struct Fixture {
    session: PlaybackSession,
    log: SharedLog,
    recents: RecentsLedger,
    _dir: tempfile::TempDir,
}

fn fixture(fail_launch: bool, meta_title: Option<&str>, lines: Option<Vec<LyricLine>>) -> Fixture {
    let dir = tempdir().unwrap();
    let log: SharedLog = Arc::default();
    let recents = RecentsLedger::new(dir.path().join("recents.json"), 10);
    let session = PlaybackSession::new(
        Box::new(FakeBackend {
            log: log.clone(),
            fail_launch,
        }),
        Box::new(FakeMetadata {
            title: meta_title.map(str::to_string),
        }),
        Box::new(FakeLyrics { lines }),
        recents.clone(),
        100,
    );
    Fixture {
        session,
        log,
        recents,
        _dir: dir,
    }
}

fn watch_track(title: &str) -> Track {
    Track::new(title, "https://music.youtube.com/watch?v=abc123")
}

fn timed_lines() -> Vec<LyricLine> {
    vec![
        LyricLine {
            start_ms: 0,
            end_ms: 1000,
            text: "a".into(),
        },
        LyricLine {
            start_ms: 1000,
            end_ms: 2000,
            text: "b".into(),
        },
    ]
}

#[test]
fn switching_tracks_terminates_the_prior_handle_first() {
    let mut fx = fixture(false, None, None);
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();
    fx.session.play_track(&Track::new("two", "/music/two.mp3")).unwrap();

    let log = fx.log.lock().unwrap();
    assert_eq!(
        log.events,
        vec![
            "launch#1 /music/one.mp3",
            "terminate#1",
            "launch#2 /music/two.mp3",
        ]
    );
    assert_eq!(log.live, 1);
}

#[test]
fn watch_urls_are_enriched_via_metadata() {
    let mut fx = fixture(false, Some("Enriched Title"), None);
    fx.session.play_track(&watch_track("stored")).unwrap();

    assert_eq!(fx.session.now_playing(), Some("Enriched Title"));
    // The ledger records the resolved title too.
    assert_eq!(fx.recents.read(1)[0].title, "Enriched Title");
}

#[test]
fn metadata_failure_falls_back_to_the_stored_title() {
    let mut fx = fixture(false, None, None);
    fx.session.play_track(&watch_track("stored")).unwrap();

    assert_eq!(fx.session.now_playing(), Some("stored"));
    assert_eq!(fx.session.state(), SessionState::Playing);
}

#[test]
fn local_tracks_display_the_base_name() {
    let mut fx = fixture(false, Some("must not be used"), None);
    fx.session
        .play_track(&Track::new("whatever", "/music/demo/a.mp3"))
        .unwrap();

    assert_eq!(fx.session.now_playing(), Some("a.mp3"));
}

#[test]
fn launch_failure_leaves_session_idle_but_still_records_recents() {
    let mut fx = fixture(true, None, None);
    let err = fx
        .session
        .play_track(&Track::new("one", "/music/one.mp3"))
        .unwrap_err();

    assert!(matches!(err, Error::PlayerLaunchFailed(_)));
    assert_eq!(fx.session.state(), SessionState::Idle);
    assert_eq!(fx.session.now_playing(), None);
    // Steps before the launch still happened.
    assert_eq!(fx.recents.read(1)[0].url, "/music/one.mp3");
}

#[test]
fn stop_clears_title_and_lyrics() {
    let mut fx = fixture(false, None, Some(timed_lines()));
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();
    assert!(fx.session.lyric_text().is_some());

    fx.session.stop();
    assert_eq!(fx.session.state(), SessionState::Idle);
    assert_eq!(fx.session.now_playing(), None);
    assert_eq!(fx.session.lyric_text(), None);
    assert_eq!(fx.log.lock().unwrap().live, 0);
}

#[test]
fn toggle_pause_moves_between_playing_and_paused() {
    let mut fx = fixture(false, None, None);
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();

    fx.session.toggle_pause();
    assert_eq!(fx.session.state(), SessionState::Paused);
    fx.session.toggle_pause();
    assert_eq!(fx.session.state(), SessionState::Playing);
}

#[test]
fn sync_tick_captures_duration_and_truncates_position() {
    let mut fx = fixture(false, None, None);
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();
    assert_eq!(fx.session.duration_secs(), 0.0);

    fx.session.sync_tick(false);
    assert_eq!(fx.session.duration_secs(), 180.0);
    assert_eq!(fx.session.position_secs(), 12.0);
}

#[test]
fn sync_tick_selects_the_lyric_line_covering_the_position() {
    // The fake engine reports 12.7s.
    let covering = vec![LyricLine {
        start_ms: 12_000,
        end_ms: 13_000,
        text: "mid".into(),
    }];
    let mut fx = fixture(false, None, Some(covering));
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();

    fx.session.sync_tick(false);
    assert_eq!(fx.session.lyric_text(), Some("mid"));
}

#[test]
fn sync_tick_shows_the_placeholder_between_lines() {
    // Lines end at 2s, the engine is at 12.7s: a gap.
    let mut fx = fixture(false, None, Some(timed_lines()));
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();

    fx.session.sync_tick(false);
    assert_eq!(fx.session.lyric_text(), Some("..."));
}

#[test]
fn sync_tick_does_not_publish_position_while_seek_is_overridden() {
    let mut fx = fixture(false, None, None);
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();

    fx.session.sync_tick(true);
    assert_eq!(fx.session.position_secs(), 0.0);
}

#[test]
fn shutdown_terminates_the_live_handle() {
    let mut fx = fixture(false, None, None);
    fx.session.play_track(&Track::new("one", "/music/one.mp3")).unwrap();
    fx.session.shutdown();

    assert_eq!(fx.log.lock().unwrap().live, 0);
}
