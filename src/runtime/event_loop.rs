//! Main terminal event loop: input handling, UI drawing, the transport sync
//! tick and synchronization with the resolver worker and MPRIS.

use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Pane};
use crate::config;
use crate::error::Error;
use crate::library::{SourceKind, SourceRegistry};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::session::{PlaybackSession, SeekSync, SessionState};
use crate::theme::Theme;
use crate::ui;

use super::resolver::{ResolveJob, ResolverWorker};

/// Seconds moved per seek-adjust keypress.
const SEEK_STEP_SECS: f64 = 5.0;
const VOLUME_STEP: u8 = 5;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Seek-control ownership: the sync tick writes positions only while
    /// this is `Tracking`.
    pub seek: SeekSync,
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    /// Last-known now-playing title as emitted to MPRIS.
    last_mpris_title: Option<String>,
    /// Last-known session state as emitted to MPRIS.
    last_mpris_state: SessionState,
    last_mpris_duration: f64,
}

impl EventLoopState {
    pub fn new(session: &PlaybackSession) -> Self {
        Self {
            seek: SeekSync::new(),
            pending_gg: false,
            last_mpris_title: None,
            last_mpris_state: session.state(),
            last_mpris_duration: 0.0,
        }
    }
}

/// Run the loop until quit is requested. The caller tears down the session,
/// the worker and the terminal.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    theme: &'static Theme,
    registry: &SourceRegistry,
    app: &mut App,
    session: &mut PlaybackSession,
    worker: &ResolverWorker,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        drain_worker(app, worker);

        // Transport poll: reconcile displayed state with the live engine.
        session.sync_tick(state.seek.is_overriding());
        sync_mpris(mpris, session, state);

        let display = app.display_indices();
        terminal.draw(|f| ui::draw(f, app, session, &state.seek, &display, theme, &settings.ui))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app, session) {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(settings.sync.tick_ms))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, registry, app, session, worker, control_tx, state) {
                    return Ok(());
                }
            }
        }
    }
}

/// Install finished resolutions, dropping stale generations and degrading
/// recoverable failures to empty lists.
fn drain_worker(app: &mut App, worker: &ResolverWorker) {
    while let Some(outcome) = worker.try_recv() {
        match outcome.result {
            Ok(tracks) => {
                app.finish_resolution(outcome.generation, tracks);
            }
            Err(e @ Error::SourceNotFound(_)) | Err(e @ Error::PersistedStateCorrupt { .. }) => {
                log::warn!("resolution degraded to an empty list: {e}");
                app.finish_resolution(outcome.generation, Vec::new());
            }
            Err(e) => {
                log::warn!("resolution failed: {e}");
                app.fail_resolution(outcome.generation, e.to_string());
            }
        }
    }
}

/// Keep MPRIS in sync even when playback changes come from the engine's own
/// controls or media keys.
fn sync_mpris(mpris: &MprisHandle, session: &PlaybackSession, state: &mut EventLoopState) {
    let title = session.now_playing().map(str::to_string);
    if title != state.last_mpris_title {
        mpris.set_now_playing(session.now_playing(), session.current_url());
        state.last_mpris_title = title;
    }
    if session.state() != state.last_mpris_state {
        mpris.set_playback(session.state());
        state.last_mpris_state = session.state();
    }
    if session.duration_secs() != state.last_mpris_duration {
        mpris.set_length_secs(session.duration_secs());
        state.last_mpris_duration = session.duration_secs();
    }
}

fn play_selected(app: &mut App, session: &mut PlaybackSession) {
    let Some(track) = app.selected_track().cloned() else {
        return;
    };
    if let Err(e) = session.play_track(&track) {
        app.notice = Some(e.to_string());
    }
}

fn play_neighbor(app: &mut App, session: &mut PlaybackSession, forward: bool) {
    if !app.has_tracks() {
        return;
    }
    let target = if forward {
        app.next_in_view_from(app.selected)
    } else {
        app.prev_in_view_from(app.selected)
    };
    if let Some(i) = target {
        app.selected = i;
    }
    play_selected(app, session);
}

/// Dispatch the selected source to the resolver worker.
fn activate_selected_source(app: &mut App, worker: &ResolverWorker) {
    let index = app.selected_source;
    let Some(source) = app.sources.get(index).cloned() else {
        return;
    };
    let generation = app.begin_resolution(index);
    let kind = source.kind;
    worker.submit(ResolveJob::Resolve { generation, source });

    // Typing goes straight into a search on the search source.
    if kind == SourceKind::Search {
        app.enter_filter_mode();
    }
}

fn submit_search(app: &mut App, worker: &ResolverWorker) {
    let term = app.filter_query.trim().to_string();
    if term.is_empty() {
        return;
    }
    let Some(index) = app.active_source_index else {
        return;
    };
    app.clear_filter();
    let generation = app.begin_resolution(index);
    worker.submit(ResolveJob::Search { generation, term });
}

/// Returns true when the loop should quit.
fn handle_control_cmd(cmd: ControlCmd, app: &mut App, session: &mut PlaybackSession) -> bool {
    match cmd {
        ControlCmd::Quit => return true,
        ControlCmd::Play => match session.state() {
            SessionState::Paused => session.toggle_pause(),
            SessionState::Idle => play_selected(app, session),
            SessionState::Playing | SessionState::Loading => {}
        },
        ControlCmd::Pause => {
            if session.state() == SessionState::Playing {
                session.toggle_pause();
            }
        }
        ControlCmd::PlayPause => match session.state() {
            SessionState::Playing | SessionState::Paused => session.toggle_pause(),
            SessionState::Idle => play_selected(app, session),
            SessionState::Loading => {}
        },
        ControlCmd::Stop => session.stop(),
        ControlCmd::Next => play_neighbor(app, session, true),
        ControlCmd::Prev => play_neighbor(app, session, false),
    }
    false
}

/// Returns true when the loop should quit.
fn handle_key_event(
    key: KeyEvent,
    registry: &SourceRegistry,
    app: &mut App,
    session: &mut PlaybackSession,
    worker: &ResolverWorker,
    control_tx: &mpsc::Sender<ControlCmd>,
    state: &mut EventLoopState,
) -> bool {
    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Down => {
                app.pane = Pane::Tracks;
                app.next();
            }
            KeyCode::Up => {
                app.pane = Pane::Tracks;
                app.prev();
            }
            KeyCode::Enter => {
                if app.active_kind() == Some(SourceKind::Search) {
                    submit_search(app, worker);
                } else {
                    // If there are no visible results, do nothing.
                    if app.display_indices().is_empty() {
                        return false;
                    }
                    app.exit_filter_mode();
                    play_selected(app, session);
                }
            }
            KeyCode::Char(c) => {
                // Keep it simple: filter on printable characters.
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Tab => {
            state.pending_gg = false;
            app.pane = match app.pane {
                Pane::Sources => Pane::Tracks,
                Pane::Tracks => Pane::Sources,
            };
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            if app.pane == Pane::Tracks {
                app.enter_filter_mode();
            }
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                match app.pane {
                    Pane::Sources => app.selected_source = 0,
                    Pane::Tracks => app.select_first_visible(),
                }
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            match app.pane {
                Pane::Sources => {
                    app.selected_source = app.sources.len().saturating_sub(1);
                }
                Pane::Tracks => app.select_last_visible(),
            }
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev();
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            if state.seek.is_overriding() {
                // Commit the pending seek and hand the control back to the
                // sync tick.
                if let Some(target) = state.seek.commit() {
                    session.seek_to(target);
                }
            } else {
                match app.pane {
                    Pane::Sources => activate_selected_source(app, worker),
                    Pane::Tracks => play_selected(app, session),
                }
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            state.pending_gg = false;
            // Behave like MPRIS PlayPause.
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('l') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Next);
        }
        KeyCode::Char('h') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Prev);
        }
        KeyCode::Char('x') => {
            state.pending_gg = false;
            let _ = control_tx.send(ControlCmd::Stop);
        }
        KeyCode::Right => {
            state.pending_gg = false;
            if session.state() != SessionState::Idle {
                state
                    .seek
                    .adjust(SEEK_STEP_SECS, session.position_secs(), session.duration_secs());
            }
        }
        KeyCode::Left => {
            state.pending_gg = false;
            if session.state() != SessionState::Idle {
                state
                    .seek
                    .adjust(-SEEK_STEP_SECS, session.position_secs(), session.duration_secs());
            }
        }
        KeyCode::Esc => {
            state.pending_gg = false;
            if state.seek.is_overriding() {
                state.seek.cancel();
            } else if !app.filter_query.is_empty() {
                app.clear_filter();
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            state.pending_gg = false;
            let vol = session.volume().saturating_add(VOLUME_STEP).min(100);
            session.set_volume(vol);
        }
        KeyCode::Char('-') => {
            state.pending_gg = false;
            session.set_volume(session.volume().saturating_sub(VOLUME_STEP));
        }
        KeyCode::Char('S') => {
            state.pending_gg = false;
            save_cache_of_current_list(registry, app);
        }
        KeyCode::Char('r') => {
            state.pending_gg = false;
            app.refresh_sources(registry.load());
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}

fn save_cache_of_current_list(registry: &SourceRegistry, app: &mut App) {
    if !app.has_tracks() {
        return;
    }
    let Some(source) = app.active_source() else {
        return;
    };
    let name = cache_name_for(&source.name);
    match registry.save_cache(&name, &app.tracks) {
        Ok(path) => {
            log::info!("saved cache {}", path.display());
            app.notice = Some(format!("saved cache {name}"));
            app.refresh_sources(registry.load());
        }
        Err(e) => {
            app.notice = Some(format!("cache save failed: {e}"));
        }
    }
}

/// A file-name-safe cache name derived from a source display name.
fn cache_name_for(source_name: &str) -> String {
    let mut name: String = source_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    while name.contains("--") {
        name = name.replace("--", "-");
    }
    let name = name.trim_matches('-');
    if name.is_empty() {
        "cache".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::cache_name_for;

    #[test]
    fn cache_names_are_file_name_safe() {
        assert_eq!(cache_name_for("YT - Chill Mix"), "yt-chill-mix");
        assert_eq!(cache_name_for("LOCAL - Demo"), "local-demo");
        assert_eq!(cache_name_for("---"), "cache");
    }
}
