//! Library module: playlist sources, the source registry and track
//! resolution.
//!
//! Data types live in `library::model`, the persisted catalog registry in
//! `library::catalog`, per-source track materialization in
//! `library::resolve` and cached snapshot files in `library::snapshot`.

mod catalog;
mod model;
mod resolve;
mod snapshot;

pub use catalog::SourceRegistry;
pub use model::{PlaylistSource, SourceKind, Track};
pub use resolve::resolve;
pub use snapshot::{read_snapshot, write_snapshot};

#[cfg(test)]
mod tests;
