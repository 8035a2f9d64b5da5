use std::fs;

use tempfile::tempdir;

use crate::error::Error;
use crate::paths::StoragePaths;

use super::catalog::SourceRegistry;
use super::model::{SourceKind, Track};
use super::snapshot::{read_snapshot, write_snapshot};

fn registry_at(dir: &std::path::Path) -> SourceRegistry {
    SourceRegistry::new(StoragePaths::at(dir.to_path_buf()))
}

#[test]
fn registry_merges_catalogs_and_appends_sentinels_in_order() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("playlists_remote.json"),
        r#"{ "Chill": "PL123" }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("playlists_local.json"),
        r#"{ "Demo": "/music/demo" }"#,
    )
    .unwrap();

    let sources = registry_at(dir.path()).load();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["YT - Chill", "LOCAL - Demo", "RECENTS", "SEARCH YT"]);

    assert_eq!(sources[0].kind, SourceKind::RemotePlaylist);
    assert_eq!(sources[0].locator, "PL123");
    assert_eq!(sources[1].kind, SourceKind::LocalDirectory);
    assert_eq!(sources[1].locator, "/music/demo");
    assert_eq!(sources[2].kind, SourceKind::Recents);
    assert_eq!(sources[3].kind, SourceKind::Search);
}

#[test]
fn registry_preserves_catalog_entry_order() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("playlists_remote.json"),
        r#"{ "Zeta": "PLz", "Alpha": "PLa", "Mid": "PLm" }"#,
    )
    .unwrap();

    let sources = registry_at(dir.path()).load();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["YT - Zeta", "YT - Alpha", "YT - Mid", "RECENTS", "SEARCH YT"]
    );
}

#[test]
fn registry_lists_cache_snapshots_sorted_by_name() {
    let dir = tempdir().unwrap();
    let caches = dir.path().join("caches");
    fs::create_dir_all(&caches).unwrap();
    fs::write(caches.join("zebra.json"), "[]").unwrap();
    fs::write(caches.join("alpha.json"), "[]").unwrap();
    fs::write(caches.join("notes.txt"), "ignored").unwrap();

    let sources = registry_at(dir.path()).load();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["CACHE - alpha", "CACHE - zebra", "RECENTS", "SEARCH YT"]
    );
    assert_eq!(sources[0].kind, SourceKind::CachedSnapshot);
}

#[test]
fn corrupt_catalog_degrades_to_empty_without_failing_the_load() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("playlists_remote.json"), "{broken").unwrap();
    fs::write(
        dir.path().join("playlists_local.json"),
        r#"{ "Demo": "/music/demo" }"#,
    )
    .unwrap();

    let sources = registry_at(dir.path()).load();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["LOCAL - Demo", "RECENTS", "SEARCH YT"]);
}

#[test]
fn missing_catalogs_still_yield_the_sentinels() {
    let dir = tempdir().unwrap();
    let sources = registry_at(dir.path()).load();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["RECENTS", "SEARCH YT"]);
}

#[test]
fn add_remote_persists_and_shows_up_after_reload() {
    let dir = tempdir().unwrap();
    let registry = registry_at(dir.path());

    registry.add_remote("Chill", "PL123").unwrap();
    registry.add_local("Demo", "/music/demo").unwrap();

    let names: Vec<String> = registry.load().iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["YT - Chill", "LOCAL - Demo", "RECENTS", "SEARCH YT"]);
}

#[test]
fn add_remote_overwrites_an_existing_name_in_place() {
    let dir = tempdir().unwrap();
    let registry = registry_at(dir.path());
    registry.add_remote("First", "PL1").unwrap();
    registry.add_remote("Second", "PL2").unwrap();
    registry.add_remote("First", "PL1-new").unwrap();

    let sources = registry.load();
    assert_eq!(sources[0].name, "YT - First");
    assert_eq!(sources[0].locator, "PL1-new");
    assert_eq!(sources[1].name, "YT - Second");
}

#[test]
fn snapshot_round_trip_preserves_tracks_verbatim() {
    let dir = tempdir().unwrap();
    let tracks = vec![
        Track::new("First", "https://example.com/1"),
        Track::new("Second", "/music/second.mp3"),
    ];

    let path = write_snapshot(&dir.path().join("caches"), "mix", &tracks).unwrap();
    assert_eq!(read_snapshot(&path).unwrap(), tracks);
}

#[test]
fn corrupt_snapshot_reports_corrupt_state() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "[{broken").unwrap();

    let err = read_snapshot(&path).unwrap_err();
    assert!(matches!(err, Error::PersistedStateCorrupt { .. }));
}

#[test]
fn missing_snapshot_is_source_not_found() {
    let dir = tempdir().unwrap();
    let err = read_snapshot(&dir.path().join("gone.json")).unwrap_err();
    assert!(matches!(err, Error::SourceNotFound(_)));
}
