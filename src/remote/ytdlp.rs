//! yt-dlp subprocess binding for extraction, search and title lookup.
//!
//! Every call runs the binary with `-J` and parses one JSON document from
//! stdout. Nothing is downloaded.

use std::io::ErrorKind;
use std::process::Command;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::library::Track;

use super::{MetadataProvider, PlaylistExtractor, SearchProvider};

pub struct YtDlp {
    binary: String,
    search_limit: usize,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>, search_limit: usize) -> Self {
        Self {
            binary: binary.into(),
            search_limit: search_limit.max(1),
        }
    }

    fn run_json(&self, args: &[&str]) -> std::result::Result<Value, String> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    format!("`{}` not found: install yt-dlp or set extractor.binary", self.binary)
                } else {
                    e.to_string()
                }
            })?;

        if !output.status.success() {
            return Err(stderr_excerpt(&output.stderr));
        }
        serde_json::from_slice(&output.stdout).map_err(|e| format!("unparseable output: {e}"))
    }

    fn entries_as_tracks(info: &Value) -> Vec<Track> {
        info.get("entries")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let title = entry.get("title").and_then(Value::as_str)?;
                        let url = entry.get("url").and_then(Value::as_str)?;
                        Some(Track::new(title, url))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl PlaylistExtractor for YtDlp {
    fn extract_flat(&self, url: &str) -> Result<Vec<Track>> {
        let info = self
            .run_json(&["-J", "--flat-playlist", "--skip-download", url])
            .map_err(Error::ExtractionFailed)?;
        Ok(Self::entries_as_tracks(&info))
    }
}

impl SearchProvider for YtDlp {
    fn search(&self, term: &str) -> Result<Vec<Track>> {
        let query = format!("ytsearch{}:{}", self.search_limit, term);
        let info = self
            .run_json(&["-J", "--flat-playlist", "--skip-download", &query])
            .map_err(Error::ExtractionFailed)?;
        Ok(Self::entries_as_tracks(&info))
    }
}

impl MetadataProvider for YtDlp {
    fn title_for(&self, url: &str) -> Result<String> {
        let info = self
            .run_json(&["-J", "--skip-download", "--no-playlist", url])
            .map_err(Error::MetadataLookupFailed)?;
        info.get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::MetadataLookupFailed("no title in metadata".into()))
    }
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let line = text
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("unknown error");
    let mut excerpt = line.trim().to_string();
    if excerpt.len() > 200 {
        excerpt.truncate(200);
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entries_map_to_tracks_in_source_order() {
        let info = json!({
            "entries": [
                { "title": "First", "url": "https://example.com/1" },
                { "title": "Second", "url": "https://example.com/2" },
                { "url": "https://example.com/no-title" },
            ]
        });

        let tracks = YtDlp::entries_as_tracks(&info);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0], Track::new("First", "https://example.com/1"));
        assert_eq!(tracks[1], Track::new("Second", "https://example.com/2"));
    }

    #[test]
    fn missing_entries_is_an_empty_list() {
        assert!(YtDlp::entries_as_tracks(&json!({})).is_empty());
    }

    #[test]
    fn stderr_excerpt_takes_the_last_meaningful_line() {
        let stderr = b"WARNING: something\nERROR: video unavailable\n\n";
        assert_eq!(stderr_excerpt(stderr), "ERROR: video unavailable");
        assert_eq!(stderr_excerpt(b""), "unknown error");
    }
}
