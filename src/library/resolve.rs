//! Per-source track materialization.

use std::path::Path;

use crate::error::{Error, Result};
use crate::recents::RecentsLedger;
use crate::remote::PlaylistExtractor;

use super::model::{PlaylistSource, SourceKind, Track};
use super::snapshot::read_snapshot;

/// Materialize the track list for `source`.
///
/// Local directories are listed non-recursively and sorted by file name;
/// snapshots are deserialized verbatim; remote playlists go through the
/// extraction collaborator. The search sentinel resolves to an empty list
/// (its tracks are populated by the search collaborator instead), and the
/// recents sentinel delegates to the ledger's read path.
pub fn resolve(
    source: &PlaylistSource,
    recents: &RecentsLedger,
    extractor: &dyn PlaylistExtractor,
) -> Result<Vec<Track>> {
    match source.kind {
        SourceKind::LocalDirectory => list_directory(Path::new(&source.locator)),
        SourceKind::CachedSnapshot => read_snapshot(Path::new(&source.locator)),
        SourceKind::RemotePlaylist => extractor.extract_flat(&source.locator),
        SourceKind::Recents => Ok(recents.read(recents.cap())),
        SourceKind::Search => Ok(Vec::new()),
    }
}

fn list_directory(dir: &Path) -> Result<Vec<Track>> {
    // Canonicalize so track urls are absolute even for relative locators.
    let dir = dir
        .canonicalize()
        .map_err(|_| Error::SourceNotFound(dir.to_path_buf()))?;
    if !dir.is_dir() {
        return Err(Error::SourceNotFound(dir));
    }

    let mut tracks: Vec<Track> = walkdir::WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.path().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            Some(Track::new(name, e.path().to_string_lossy().into_owned()))
        })
        .collect();

    tracks.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    struct NoExtractor;

    impl PlaylistExtractor for NoExtractor {
        fn extract_flat(&self, _url: &str) -> Result<Vec<Track>> {
            panic!("extractor must not be called for non-remote sources");
        }
    }

    fn local(dir: &Path) -> PlaylistSource {
        PlaylistSource::new(
            "LOCAL - Demo",
            SourceKind::LocalDirectory,
            dir.to_string_lossy().into_owned(),
        )
    }

    #[test]
    fn local_directory_lists_files_sorted_by_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("c.mp3"), b"x").unwrap();
        fs::write(dir.path().join("a.mp3"), b"x").unwrap();
        fs::write(dir.path().join("b.mp3"), b"x").unwrap();

        let ledger = RecentsLedger::new(dir.path().join("recents.json"), 10);
        let tracks = resolve(&local(dir.path()), &ledger, &NoExtractor).unwrap();

        let titles: Vec<&str> = tracks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a.mp3", "b.mp3", "c.mp3"]);
        assert!(Path::new(&tracks[0].url).is_absolute());
        assert!(tracks[0].url.ends_with("/a.mp3"));
    }

    #[test]
    fn local_directory_is_not_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("top.mp3"), b"x").unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join("nested.mp3"), b"x").unwrap();

        let ledger = RecentsLedger::new(dir.path().join("recents.json"), 10);
        let tracks = resolve(&local(dir.path()), &ledger, &NoExtractor).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "top.mp3");
    }

    #[test]
    fn vanished_directory_is_source_not_found() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("gone");
        let ledger = RecentsLedger::new(dir.path().join("recents.json"), 10);

        let err = resolve(&local(&gone), &ledger, &NoExtractor).unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }

    #[test]
    fn search_sentinel_resolves_empty() {
        let dir = tempdir().unwrap();
        let ledger = RecentsLedger::new(dir.path().join("recents.json"), 10);
        let source = PlaylistSource::new("SEARCH YT", SourceKind::Search, "");

        assert!(resolve(&source, &ledger, &NoExtractor).unwrap().is_empty());
    }

    #[test]
    fn recents_sentinel_delegates_to_ledger() {
        let dir = tempdir().unwrap();
        let ledger = RecentsLedger::new(dir.path().join("recents.json"), 10);
        ledger.record(&Track::new("one", "u1")).unwrap();
        ledger.record(&Track::new("two", "u2")).unwrap();

        let source = PlaylistSource::new("RECENTS", SourceKind::Recents, "");
        let tracks = resolve(&source, &ledger, &NoExtractor).unwrap();

        assert_eq!(tracks[0].title, "two");
        assert_eq!(tracks[1].title, "one");
    }
}
