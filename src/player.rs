//! Playback engine abstraction and the mpv subprocess binding.
//!
//! The session manager only sees the capability traits in `player::engine`;
//! the concrete binding in `player::mpv` drives an external mpv process over
//! its JSON IPC socket.

mod engine;
mod mpv;

pub use engine::{LaunchConfig, PlayerBackend, PlayerHandle};
pub use mpv::MpvBackend;
