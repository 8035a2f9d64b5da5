//! mpv subprocess binding.
//!
//! Spawns one mpv process per track and drives it over the JSON IPC socket:
//! newline-delimited request/response pairs matched by `request_id`, with
//! asynchronous event lines skipped. The process is killed on terminate and
//! on Drop.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use serde_json::{Value, json};

use crate::error::{Error, Result};

use super::engine::{LaunchConfig, PlayerBackend, PlayerHandle};

/// How long to wait for mpv to create its IPC socket after spawn.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Per-reply read timeout. Property reads are answered immediately once the
/// socket is up; a longer stall means the process is gone.
const REPLY_TIMEOUT: Duration = Duration::from_millis(500);

pub struct MpvBackend {
    binary: String,
}

impl MpvBackend {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl PlayerBackend for MpvBackend {
    fn launch(&self, url: &str, config: &LaunchConfig) -> Result<Box<dyn PlayerHandle>> {
        let socket_path =
            std::env::temp_dir().join(format!("vivace-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket_path);

        let mut cmd = Command::new(&self.binary);
        cmd.arg(format!("--input-ipc-server={}", socket_path.display()))
            .arg("--no-terminal")
            .arg(format!("--volume={}", config.volume));
        if config.loop_forever {
            cmd.arg("--loop-file=inf");
        }
        cmd.arg(flag("--force-window", config.force_window))
            .arg(flag("--osc", config.osc))
            .arg(flag("--ytdl", config.streaming_extract))
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                Error::PlayerLaunchFailed(format!(
                    "`{}` not found: install mpv or set player.binary",
                    self.binary
                ))
            } else {
                Error::PlayerLaunchFailed(e.to_string())
            }
        })?;

        let stream = match connect_with_retry(&socket_path, &mut child) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                let _ = std::fs::remove_file(&socket_path);
                return Err(e);
            }
        };
        stream
            .set_read_timeout(Some(REPLY_TIMEOUT))
            .map_err(|e| Error::PlayerLaunchFailed(e.to_string()))?;
        let reader = stream
            .try_clone()
            .map_err(|e| Error::PlayerLaunchFailed(e.to_string()))?;

        log::debug!("mpv launched for {url}");
        Ok(Box::new(MpvHandle {
            child,
            stream,
            reader: BufReader::new(reader),
            socket_path,
            next_request_id: 1,
            terminated: false,
        }))
    }
}

fn flag(name: &str, on: bool) -> String {
    format!("{name}={}", if on { "yes" } else { "no" })
}

fn connect_with_retry(socket_path: &PathBuf, child: &mut Child) -> Result<UnixStream> {
    let deadline = Instant::now() + CONNECT_TIMEOUT;
    loop {
        match UnixStream::connect(socket_path) {
            Ok(stream) => return Ok(stream),
            Err(_) if Instant::now() < deadline => {
                if let Ok(Some(status)) = child.try_wait() {
                    return Err(Error::PlayerLaunchFailed(format!(
                        "mpv exited during startup ({status})"
                    )));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                return Err(Error::PlayerLaunchFailed(format!(
                    "mpv IPC socket never came up: {e}"
                )));
            }
        }
    }
}

struct MpvHandle {
    child: Child,
    stream: UnixStream,
    reader: BufReader<UnixStream>,
    socket_path: PathBuf,
    next_request_id: u64,
    terminated: bool,
}

impl MpvHandle {
    /// Issue one command and wait for its reply, skipping event lines.
    fn request(&mut self, command: Value) -> Result<Option<Value>> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let payload = json!({ "command": command, "request_id": request_id });
        self.stream.write_all(payload.to_string().as_bytes())?;
        self.stream.write_all(b"\n")?;

        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(Error::Io(ErrorKind::UnexpectedEof.into()));
            }
            let Ok(reply) = serde_json::from_str::<Value>(&line) else {
                continue;
            };
            if reply.get("event").is_some() {
                continue;
            }
            if reply.get("request_id").and_then(Value::as_u64) != Some(request_id) {
                continue;
            }

            let status = reply.get("error").and_then(Value::as_str).unwrap_or("");
            if status == "success" {
                return Ok(reply.get("data").cloned());
            }
            // "property unavailable" is normal during startup and for
            // streamed sources that have no duration yet.
            return Ok(None);
        }
    }

    fn get_f64(&mut self, property: &str) -> Result<Option<f64>> {
        Ok(self
            .request(json!(["get_property", property]))?
            .and_then(|v| v.as_f64()))
    }
}

impl PlayerHandle for MpvHandle {
    fn position(&mut self) -> Result<Option<f64>> {
        self.get_f64("time-pos")
    }

    fn duration(&mut self) -> Result<Option<f64>> {
        self.get_f64("duration")
    }

    fn paused(&mut self) -> Result<bool> {
        Ok(self
            .request(json!(["get_property", "pause"]))?
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }

    fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.request(json!(["set_property", "pause", paused]))?;
        Ok(())
    }

    fn set_volume(&mut self, volume: u8) -> Result<()> {
        self.request(json!(["set_property", "volume", volume.min(100)]))?;
        Ok(())
    }

    fn seek_to(&mut self, position_secs: f64) -> Result<()> {
        self.request(json!(["seek", position_secs, "absolute"]))?;
        Ok(())
    }

    fn terminate(&mut self) -> Result<()> {
        if self.terminated {
            return Ok(());
        }
        self.terminated = true;

        // Ask nicely first, then make sure the process is gone.
        let _ = self.request(json!(["quit"]));
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.socket_path);
        log::debug!("mpv terminated");
        Ok(())
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        let _ = self.terminate();
    }
}
