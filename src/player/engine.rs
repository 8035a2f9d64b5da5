use crate::error::Result;

/// Playback options applied when a handle is launched.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Loop the current file indefinitely.
    pub loop_forever: bool,
    /// Create an output surface even for audio-only media.
    pub force_window: bool,
    /// Enable the engine's on-screen controls.
    pub osc: bool,
    /// Let the engine resolve streaming URLs through its extractor.
    pub streaming_extract: bool,
    /// Initial volume, 0-100.
    pub volume: u8,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            loop_forever: true,
            force_window: true,
            osc: true,
            streaming_extract: true,
            volume: 100,
        }
    }
}

/// Launches playback engine instances.
///
/// One implementation spawns an external process; a fake satisfies the
/// session manager in tests. The session never knows which is in use.
pub trait PlayerBackend {
    fn launch(&self, url: &str, config: &LaunchConfig) -> Result<Box<dyn PlayerHandle>>;
}

/// The live, exclusively-owned reference to one engine instance.
///
/// Transport properties may be unknown while the engine is still starting or
/// probing a streamed source; those reads return `Ok(None)` rather than an
/// error. Implementations must also release the underlying engine on Drop so
/// no exit path leaks an external process.
pub trait PlayerHandle {
    /// Current playback position in seconds, if the engine reports one yet.
    fn position(&mut self) -> Result<Option<f64>>;

    /// Total duration in seconds, once the engine has resolved it.
    fn duration(&mut self) -> Result<Option<f64>>;

    fn paused(&mut self) -> Result<bool>;

    fn set_paused(&mut self, paused: bool) -> Result<()>;

    /// Volume 0-100.
    fn set_volume(&mut self, volume: u8) -> Result<()>;

    /// Absolute seek, in seconds.
    fn seek_to(&mut self, position_secs: f64) -> Result<()>;

    /// Tear the engine instance down. Idempotent.
    fn terminate(&mut self) -> Result<()>;
}
