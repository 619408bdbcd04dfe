//! Keyboard controls for the player: pause, seek and quit

use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc;

pub const SEEK_STEP_SECS: f64 = 5.0;

pub const HELP: &str = "[space] play/pause  [left/right] seek 5s  [q] quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    TogglePause,
    /// Relative seek in seconds.
    Seek(f64),
    Quit,
}

pub fn map_key(k: KeyEvent) -> Option<PlayerCommand> {
    match k.code {
        // Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
        KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(PlayerCommand::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(PlayerCommand::Quit),
        KeyCode::Char(' ') => Some(PlayerCommand::TogglePause),
        KeyCode::Left | KeyCode::Char('h') => Some(PlayerCommand::Seek(-SEEK_STEP_SECS)),
        KeyCode::Right | KeyCode::Char('l') => Some(PlayerCommand::Seek(SEEK_STEP_SECS)),
        _ => None,
    }
}

/// Keeps the terminal in raw mode while alive.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

/// Read key presses on a blocking thread until the receiver goes away.
pub fn spawn_key_task(tx: mpsc::Sender<PlayerCommand>) {
    tokio::task::spawn_blocking(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(250)) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(_) => break,
            }
            let Ok(Event::Key(k)) = event::read() else {
                continue;
            };
            if k.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(cmd) = map_key(k)
                && tx.blocking_send(cmd).is_err()
            {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_map_key() {
        assert_eq!(map_key(key(KeyCode::Char(' '))), Some(PlayerCommand::TogglePause));
        assert_eq!(map_key(key(KeyCode::Left)), Some(PlayerCommand::Seek(-5.0)));
        assert_eq!(map_key(key(KeyCode::Right)), Some(PlayerCommand::Seek(5.0)));
        assert_eq!(map_key(key(KeyCode::Char('q'))), Some(PlayerCommand::Quit));
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(PlayerCommand::Quit)
        );
        assert_eq!(map_key(key(KeyCode::Char('c'))), None);
        assert_eq!(map_key(key(KeyCode::Enter)), None);
    }
}
