//! Lyric player: local audio through mpv, lyrics following the playback clock
//!
//! mpv reports its position as events; the player samples the latest one on
//! a fixed interval and asks the timeline which line is active.

pub mod input;
pub mod mpv;

use crate::config::PlayerConfig;
use crate::lyrics::{LyricsPayload, Timeline};
use crate::theme::Palette;
use crossterm::style::Stylize;
use input::{PlayerCommand, RawModeGuard};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

const NO_LYRICS: &str = "No lyrics available";

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Started,
    Paused,
    Position { seconds: f64 },
    Duration { seconds: f64 },
    Ended,
    Error(String),
}

/// Playback state the loop keeps between clock samples
#[derive(Debug, Clone)]
pub struct PlayerState {
    timeline: Timeline,
    synced: bool,
    has_text: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    pub playing: bool,
    pub ended: bool,
}

impl PlayerState {
    pub fn new(payload: &LyricsPayload) -> Self {
        Self {
            timeline: Timeline::new(payload.lines().into_owned()),
            synced: payload.has_timestamps(),
            has_text: payload.has_text(),
            position_secs: 0.0,
            duration_secs: 0.0,
            playing: false,
            ended: false,
        }
    }

    pub fn apply(&mut self, ev: PlayerEvent) {
        match ev {
            PlayerEvent::Started => self.playing = true,
            PlayerEvent::Paused => self.playing = false,
            PlayerEvent::Position { seconds } => self.position_secs = seconds.max(0.0),
            PlayerEvent::Duration { seconds } => self.duration_secs = seconds,
            PlayerEvent::Ended => {
                self.playing = false;
                self.ended = true;
            }
            PlayerEvent::Error(e) => tracing::debug!("{e}"),
        }
    }

    /// Sample the clock. Returns true when the displayed line changed.
    pub fn poll(&mut self) -> bool {
        if !self.synced {
            return false;
        }
        self.timeline.update(self.position_secs * 1000.0).is_some()
    }

    pub fn current_text(&self) -> &str {
        if !self.has_text {
            return NO_LYRICS;
        }
        self.timeline
            .active_line()
            .map(|l| l.text.as_str())
            .unwrap_or(NO_LYRICS)
    }
}

/// `m:ss`; zero for unknown values.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

pub struct PlayerView {
    palette: Palette,
}

impl PlayerView {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn header(&self, artist: &str, song: &str) -> String {
        format!(
            "{}\n{}",
            song.with(self.palette.accent).bold(),
            artist.with(self.palette.fg_secondary)
        )
    }

    pub fn error(&self, message: &str) -> String {
        message.with(self.palette.error).to_string()
    }

    pub fn line(&self, state: &PlayerState) -> String {
        let clock = format!(
            "[{} / {}]",
            format_time(state.position_secs),
            format_time(state.duration_secs)
        );
        format!(
            "{} {}",
            clock.with(self.palette.fg_secondary),
            state.current_text().with(self.palette.fg_primary).bold()
        )
    }
}

/// Play `audio` and print the active lyric line until playback ends or the
/// user quits. Space pauses, left/right seek when stdin is a terminal.
pub async fn play(
    payload: &LyricsPayload,
    artist: &str,
    song: &str,
    audio: &Path,
    cfg: &PlayerConfig,
    palette: Palette,
) -> anyhow::Result<()> {
    if !audio.is_file() {
        anyhow::bail!("audio file not found: {}", audio.display());
    }

    let (tx, mut rx) = mpsc::channel::<PlayerEvent>(256);
    let mpv = mpv::Mpv::spawn(tx, cfg.audio_device.as_deref()).await?;
    mpv.load_file(audio).await?;

    let (key_tx, mut keys) = mpsc::channel::<PlayerCommand>(16);
    let raw = match RawModeGuard::enter() {
        Ok(guard) => {
            input::spawn_key_task(key_tx);
            Some(guard)
        }
        Err(e) => {
            tracing::debug!(error = %e, "no keyboard controls");
            None
        }
    };

    let view = PlayerView::new(palette);
    let mut state = PlayerState::new(payload);
    emit(&format!("{}\n", view.header(artist, song)));
    if raw.is_some() {
        emit(&input::HELP.with(palette.fg_secondary).to_string());
    }
    emit(&view.line(&state));

    let mut ticker = tokio::time::interval(Duration::from_millis(cfg.poll_interval_ms.max(10)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            ev = rx.recv() => {
                let Some(ev) = ev else { break };
                if let PlayerEvent::Error(msg) = &ev {
                    emit(&view.error(msg));
                }
                state.apply(ev);
                if state.ended {
                    break;
                }
            }
            Some(cmd) = keys.recv() => match cmd {
                PlayerCommand::TogglePause => mpv.toggle_pause().await?,
                PlayerCommand::Seek(secs) => mpv.seek_relative(secs).await?,
                PlayerCommand::Quit => break,
            },
            _ = ticker.tick() => {
                if state.poll() {
                    emit(&view.line(&state));
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    drop(raw);
    tracing::debug!(position = state.position_secs, "player stopped");
    Ok(())
}

// Raw mode does not translate "\n" into a carriage return.
fn emit(text: &str) {
    let mut out = std::io::stdout().lock();
    let _ = write!(out, "{}\r\n", text.replace('\n', "\r\n"));
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lyrics::LyricLine;

    fn timed() -> LyricsPayload {
        LyricsPayload::Timed(vec![
            LyricLine::timed("00:12", "Hello"),
            LyricLine::timed("00:18", "World"),
        ])
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(7.9), "0:07");
        assert_eq!(format_time(185.2), "3:05");
    }

    #[test]
    fn test_poll_follows_position() {
        let mut state = PlayerState::new(&timed());
        assert_eq!(state.current_text(), "Hello");

        state.apply(PlayerEvent::Started);
        state.apply(PlayerEvent::Position { seconds: 5.0 });
        assert!(!state.poll());

        state.apply(PlayerEvent::Position { seconds: 18.5 });
        assert!(state.poll());
        assert_eq!(state.current_text(), "World");
        assert!(!state.poll());

        // Seek back before the first line: stays on "World".
        state.apply(PlayerEvent::Position { seconds: 1.0 });
        assert!(!state.poll());
        assert_eq!(state.current_text(), "World");

        state.apply(PlayerEvent::Ended);
        assert!(state.ended && !state.playing);
    }

    #[test]
    fn test_backward_seek_moves_to_earlier_line() {
        let mut state = PlayerState::new(&LyricsPayload::Timed(vec![
            LyricLine::timed("00:05", "one"),
            LyricLine::timed("00:10", "two"),
            LyricLine::timed("00:15", "three"),
        ]));
        state.apply(PlayerEvent::Position { seconds: 16.0 });
        assert!(state.poll());
        assert_eq!(state.current_text(), "three");

        // Seek back 5 s lands on the middle line.
        state.apply(PlayerEvent::Position { seconds: 11.0 });
        assert!(state.poll());
        assert_eq!(state.current_text(), "two");

        // Pausing does not move the line.
        state.apply(PlayerEvent::Paused);
        assert!(!state.playing);
        assert!(!state.poll());
        assert_eq!(state.current_text(), "two");
    }

    #[test]
    fn test_plain_text_shows_first_line() {
        let mut state = PlayerState::new(&LyricsPayload::PlainText("first\nsecond".into()));
        state.apply(PlayerEvent::Position { seconds: 60.0 });
        assert!(!state.poll());
        assert_eq!(state.current_text(), "first");

        let empty = PlayerState::new(&LyricsPayload::PlainText(String::new()));
        assert_eq!(empty.current_text(), NO_LYRICS);
    }
}
