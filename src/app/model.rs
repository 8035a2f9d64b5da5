//! Application model types: `App` and `Pane`.
//!
//! The `App` struct holds the registry's source list, the resolved track
//! list for the active source, selection, filter state and the bookkeeping
//! the runtime needs to drop stale resolution results.

use crate::library::{PlaylistSource, SourceKind, Track};

/// Which list the cursor lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pane {
    Sources,
    Tracks,
}

/// The main application model.
pub struct App {
    pub sources: Vec<PlaylistSource>,
    pub selected_source: usize,
    /// Index of the source whose tracks are currently shown, if any.
    pub active_source_index: Option<usize>,

    pub tracks: Vec<Track>,
    pub selected: usize,

    pub pane: Pane,
    pub filter_mode: bool,
    pub filter_query: String,

    /// A resolution or search is in flight for the active source.
    pub loading: bool,
    /// One-line user-visible notice (extraction failures and the like).
    pub notice: Option<String>,

    /// Monotonic resolution generation. Results stamped with an older
    /// generation are stale and dropped.
    generation: u64,
}

impl App {
    pub fn new(sources: Vec<PlaylistSource>) -> Self {
        Self {
            sources,
            selected_source: 0,
            active_source_index: None,
            tracks: Vec::new(),
            selected: 0,
            pane: Pane::Sources,
            filter_mode: false,
            filter_query: String::new(),
            loading: false,
            notice: None,
            generation: 0,
        }
    }

    /// Replace the source list without dropping the resolved tracks; the
    /// active source is re-matched by name since indices may have shifted.
    pub fn refresh_sources(&mut self, sources: Vec<PlaylistSource>) {
        let active_name = self.active_source().map(|s| s.name.clone());
        self.sources = sources;
        if self.selected_source >= self.sources.len() {
            self.selected_source = self.sources.len().saturating_sub(1);
        }
        self.active_source_index = active_name
            .and_then(|name| self.sources.iter().position(|s| s.name == name));
    }

    pub fn active_source(&self) -> Option<&PlaylistSource> {
        self.active_source_index.and_then(|i| self.sources.get(i))
    }

    pub fn active_kind(&self) -> Option<SourceKind> {
        self.active_source().map(|s| s.kind)
    }

    /// Start a new resolution round; older results become stale.
    pub fn begin_resolution(&mut self, source_index: usize) -> u64 {
        self.generation += 1;
        self.active_source_index = Some(source_index);
        self.loading = true;
        self.notice = None;
        self.tracks.clear();
        self.selected = 0;
        self.generation
    }

    /// Install resolved tracks if `generation` is still current.
    /// Returns false for stale results.
    pub fn finish_resolution(&mut self, generation: u64, tracks: Vec<Track>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.tracks = tracks;
        self.selected = 0;
        self.pane = Pane::Tracks;
        true
    }

    /// Record a failed resolution if `generation` is still current: the list
    /// stays empty and the notice becomes visible.
    pub fn fail_resolution(&mut self, generation: u64, notice: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.loading = false;
        self.tracks.clear();
        self.selected = 0;
        self.notice = Some(notice);
        true
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.tracks.get(self.selected)
    }

    /// Indices of tracks currently visible, respecting the fuzzy filter.
    pub fn display_indices(&self) -> Vec<usize> {
        let query = self.filter_query.trim();
        if query.is_empty() {
            return (0..self.tracks.len()).collect();
        }
        (0..self.tracks.len())
            .filter(|&i| Self::fuzzy_match_positions(&self.tracks[i].title, query).is_some())
            .collect()
    }

    /// Case-insensitive fuzzy subsequence match; returns the matched char
    /// positions or None.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        let query = query.trim();
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions = Vec::with_capacity(query.chars().count());
        let mut wanted = query.chars().flat_map(char::to_lowercase);
        let mut current = wanted.next()?;

        for (i, ch) in title.chars().enumerate() {
            if ch.to_lowercase().eq(std::iter::once(current)) {
                positions.push(i);
                match wanted.next() {
                    Some(next) => current = next,
                    None => return Some(positions),
                }
            }
        }
        None
    }

    // Cursor movement. The sources pane moves over the raw source list; the
    // tracks pane moves within the filtered view.

    pub fn next(&mut self) {
        match self.pane {
            Pane::Sources => {
                if !self.sources.is_empty() {
                    self.selected_source = (self.selected_source + 1).min(self.sources.len() - 1);
                }
            }
            Pane::Tracks => {
                if let Some(next) = self.next_in_view_from(self.selected) {
                    self.selected = next;
                }
            }
        }
    }

    pub fn prev(&mut self) {
        match self.pane {
            Pane::Sources => {
                self.selected_source = self.selected_source.saturating_sub(1);
            }
            Pane::Tracks => {
                if let Some(prev) = self.prev_in_view_from(self.selected) {
                    self.selected = prev;
                }
            }
        }
    }

    /// Next visible index after `from`, staying put at the end of the view.
    pub fn next_in_view_from(&self, from: usize) -> Option<usize> {
        let display = self.display_indices();
        display
            .iter()
            .copied()
            .find(|&i| i > from)
            .or_else(|| display.iter().copied().find(|&i| i == from))
            .or_else(|| display.last().copied())
    }

    /// Previous visible index before `from`, staying put at the top.
    pub fn prev_in_view_from(&self, from: usize) -> Option<usize> {
        let display = self.display_indices();
        display
            .iter()
            .copied()
            .rev()
            .find(|&i| i < from)
            .or_else(|| display.iter().copied().find(|&i| i == from))
            .or_else(|| display.first().copied())
    }

    pub fn select_first_visible(&mut self) {
        if let Some(&first) = self.display_indices().first() {
            self.selected = first;
        }
    }

    pub fn select_last_visible(&mut self) {
        if let Some(&last) = self.display_indices().last() {
            self.selected = last;
        }
    }

    // Filter handling.

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
        self.clamp_selection_to_view();
    }

    pub fn clear_filter(&mut self) {
        self.filter_mode = false;
        self.filter_query.clear();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.clamp_selection_to_view();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.clamp_selection_to_view();
    }

    fn clamp_selection_to_view(&mut self) {
        let display = self.display_indices();
        if !display.contains(&self.selected) {
            self.selected = display.first().copied().unwrap_or(0);
        }
    }
}
