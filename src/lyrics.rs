//! Timed lyric lines and the active-line lookup used by the sync loop.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One timed lyric line. Lines are ordered and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

/// Placeholder shown while timed lyrics exist but no line covers the
/// current position (gap between lines).
pub const GAP_PLACEHOLDER: &str = "...";

/// The text of the line whose interval contains `position_ms`, or the gap
/// placeholder if none does.
pub fn line_at(lines: &[LyricLine], position_ms: u64) -> &str {
    lines
        .iter()
        .find(|l| l.start_ms <= position_ms && position_ms <= l.end_ms)
        .map(|l| l.text.as_str())
        .unwrap_or(GAP_PLACEHOLDER)
}

/// Parse a sidecar LRC file into timed lines.
///
/// Timestamps are `[mm:ss.xx]`; each line's interval is closed by the next
/// line's start, the last line stays active to the end of the track.
pub fn parse_lrc<P: AsRef<Path>>(path: P) -> Option<Vec<LyricLine>> {
    let file = File::open(path).ok()?;
    let reader = BufReader::new(file);
    let time_regex = regex::Regex::new(r"\[(\d+):(\d+\.?\d*)\](.*)").ok()?;

    let mut timed: Vec<(u64, String)> = Vec::new();
    for line in reader.lines() {
        let line = line.ok()?;
        if let Some(captures) = time_regex.captures(&line) {
            let minutes: u64 = captures.get(1)?.as_str().parse().ok()?;
            let seconds: f64 = captures.get(2)?.as_str().parse().ok()?;
            let text = captures.get(3)?.as_str().trim().to_string();

            let start_ms = minutes * 60_000 + (seconds * 1000.0) as u64;
            timed.push((start_ms, text));
        }
    }

    if timed.is_empty() {
        return None;
    }
    timed.sort_by_key(|(start, _)| *start);

    let lines = timed
        .iter()
        .enumerate()
        .map(|(i, (start_ms, text))| {
            let end_ms = timed
                .get(i + 1)
                .map(|(next, _)| next.saturating_sub(1))
                .unwrap_or(u64::MAX);
            LyricLine {
                start_ms: *start_ms,
                end_ms,
                text: text.clone(),
            }
        })
        .collect();
    Some(lines)
}

/// The sidecar LRC path for a local media file (`song.mp3` -> `song.lrc`).
pub fn sidecar_path(media: &Path) -> std::path::PathBuf {
    media.with_extension("lrc")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn lines() -> Vec<LyricLine> {
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
    fn line_at_selects_by_interval() {
        let lines = lines();
        assert_eq!(line_at(&lines, 500), "a");
        assert_eq!(line_at(&lines, 1500), "b");
    }

    #[test]
    fn line_at_falls_back_to_placeholder_in_gaps() {
        let lines = lines();
        assert_eq!(line_at(&lines, 2500), GAP_PLACEHOLDER);
    }

    #[test]
    fn parse_lrc_builds_ordered_closed_intervals() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.lrc");
        fs::write(
            &path,
            "[00:10.00]second\n[00:05.50]first\nno timestamp here\n",
        )
        .unwrap();

        let lines = parse_lrc(&path).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "first");
        assert_eq!(lines[0].start_ms, 5500);
        assert_eq!(lines[0].end_ms, 9999);
        assert_eq!(lines[1].text, "second");
        assert_eq!(lines[1].end_ms, u64::MAX);
    }

    #[test]
    fn parse_lrc_without_timestamps_is_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.lrc");
        fs::write(&path, "just words\nmore words\n").unwrap();

        assert!(parse_lrc(&path).is_none());
    }

    #[test]
    fn sidecar_path_swaps_extension() {
        assert_eq!(
            sidecar_path(Path::new("/music/song.mp3")),
            Path::new("/music/song.lrc")
        );
    }
}
