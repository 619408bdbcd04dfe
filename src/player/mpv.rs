//! mpv child process controlled over its JSON IPC socket

use super::PlayerEvent;
use anyhow::Context;
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc};

/// Properties followed for the lyric clock. The observe id is the index + 1.
const OBSERVED: [&str; 4] = ["time-pos", "duration", "pause", "eof-reached"];

const CONNECT_ATTEMPTS: u32 = 100;
const CONNECT_BACKOFF: Duration = Duration::from_millis(50);

/// One line read from the IPC socket: either a command reply or an event.
#[derive(Debug, Deserialize)]
struct IpcMessage {
    event: Option<String>,
    name: Option<String>,
    #[serde(default)]
    data: Value,
    reason: Option<String>,
    error: Option<String>,
    request_id: Option<u64>,
    level: Option<String>,
    text: Option<String>,
}

#[derive(Debug)]
pub struct Mpv {
    child: Child,
    socket: PathBuf,
    writer: Mutex<OwnedWriteHalf>,
    next_id: AtomicU64,
}

impl Mpv {
    /// Start an idle mpv and subscribe to the playback properties.
    pub async fn spawn(
        events: mpsc::Sender<PlayerEvent>,
        audio_device: Option<&str>,
    ) -> anyhow::Result<Self> {
        let socket = std::env::temp_dir().join(format!("lyrica-mpv-{}.sock", std::process::id()));
        let _ = std::fs::remove_file(&socket);

        let mut cmd = Command::new("mpv");
        cmd.args(["--no-video", "--idle=yes", "--input-terminal=no", "--really-quiet"])
            .arg(format!("--input-ipc-server={}", socket.display()));
        if let Some(dev) = audio_device {
            cmd.arg(format!("--audio-device={dev}"));
        }
        let child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .context("spawn mpv (is it installed?)")?;

        let (reader, writer) = connect(&socket, CONNECT_ATTEMPTS).await?.into_split();
        tokio::spawn(pump_events(reader, events));

        let mpv = Self {
            child,
            socket,
            writer: Mutex::new(writer),
            next_id: AtomicU64::new(1),
        };
        mpv.send(json!(["request_log_messages", "warn"])).await?;
        for (i, prop) in OBSERVED.iter().enumerate() {
            mpv.send(json!(["observe_property", i + 1, prop])).await?;
        }
        tracing::debug!(socket = %mpv.socket.display(), "mpv ready");
        Ok(mpv)
    }

    pub async fn load_file(&self, path: &Path) -> anyhow::Result<()> {
        self.send(json!(["loadfile", path.to_string_lossy(), "replace"]))
            .await
    }

    pub async fn toggle_pause(&self) -> anyhow::Result<()> {
        self.send(json!(["cycle", "pause"])).await
    }

    pub async fn seek_relative(&self, seconds: f64) -> anyhow::Result<()> {
        self.send(json!(["seek", seconds, "relative"])).await
    }

    /// Write one command. Replies (and failures) come back through the event pump.
    async fn send(&self, args: Value) -> anyhow::Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_vec(&json!({ "command": args, "request_id": id }))
            .context("encode mpv command")?;
        line.push(b'\n');

        let mut w = self.writer.lock().await;
        w.write_all(&line).await.context("write mpv ipc")?;
        w.flush().await.context("flush mpv ipc")
    }
}

impl Drop for Mpv {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
        let _ = std::fs::remove_file(&self.socket);
    }
}

// The socket appears a little after the process starts. On failure the
// caller's `Child` is dropped, and `kill_on_drop` takes mpv down with it.
async fn connect(socket: &Path, attempts: u32) -> anyhow::Result<UnixStream> {
    let mut attempt = 0;
    loop {
        match UnixStream::connect(socket).await {
            Ok(stream) => return Ok(stream),
            Err(e) if attempt >= attempts => {
                return Err(e)
                    .with_context(|| format!("connect to mpv ipc {}", socket.display()));
            }
            Err(_) => {
                attempt += 1;
                tokio::time::sleep(CONNECT_BACKOFF).await;
            }
        }
    }
}

async fn pump_events(reader: OwnedReadHalf, events: mpsc::Sender<PlayerEvent>) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let Some(ev) = parse_line(&line) else {
            continue;
        };
        if events.send(ev).await.is_err() {
            break;
        }
    }
}

fn parse_line(line: &str) -> Option<PlayerEvent> {
    let msg: IpcMessage = serde_json::from_str(line).ok()?;
    to_player_event(msg)
}

fn to_player_event(msg: IpcMessage) -> Option<PlayerEvent> {
    if msg.event.is_none() {
        // Command reply.
        return match (msg.request_id, msg.error.as_deref()) {
            (Some(_), Some(err)) if err != "success" => {
                Some(PlayerEvent::Error(format!("mpv ipc error: {err}")))
            }
            _ => None,
        };
    }

    match msg.event.as_deref()? {
        "property-change" => match msg.name.as_deref()? {
            "time-pos" => Some(PlayerEvent::Position {
                seconds: msg.data.as_f64().unwrap_or(0.0),
            }),
            "duration" => Some(PlayerEvent::Duration {
                seconds: msg.data.as_f64().unwrap_or(0.0),
            }),
            "pause" => Some(match msg.data.as_bool() {
                Some(true) => PlayerEvent::Paused,
                _ => PlayerEvent::Started,
            }),
            "eof-reached" => msg
                .data
                .as_bool()
                .filter(|eof| *eof)
                .map(|_| PlayerEvent::Ended),
            _ => None,
        },
        "end-file" => match msg.reason.as_deref() {
            Some("error") => Some(PlayerEvent::Error(format!(
                "mpv could not play the file: {}",
                msg.error.as_deref().unwrap_or("unknown")
            ))),
            // "replace"/"redirect" fire while a new file is being loaded.
            Some("eof" | "stop" | "quit") => Some(PlayerEvent::Ended),
            _ => None,
        },
        "log-message" => {
            let level = msg.level.as_deref().unwrap_or("info");
            let text = msg.text.as_deref().unwrap_or("").trim();
            (matches!(level, "warn" | "error") && !text.is_empty())
                .then(|| PlayerEvent::Error(format!("mpv {level}: {text}")))
        }
        _ => None,
    }
}
