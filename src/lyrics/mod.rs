//! Lyrics data model shared by the display, player and export paths
//!
//! This module provides:
//! - `LyricLine` and the `LyricsPayload` variant (plain text or timed lines)
//! - The `/api/lyrics` response shape and the policy that turns it into a payload
//! - The timeline resolver used by the player

pub mod timeline;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;

pub use timeline::Timeline;

/// A single line of lyrics, optionally anchored to a `mm:ss` timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub text: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl LyricLine {
    #[cfg(test)]
    pub fn timed(timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp: Some(timestamp.into()),
            text: text.into(),
        }
    }

    pub fn untimed(text: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            text: text.into(),
        }
    }

    /// Timestamp string, treating an empty one as absent.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref().filter(|t| !t.is_empty())
    }
}

/// Lyrics as delivered by the lyrics service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LyricsPayload {
    /// Newline-delimited text with no timing.
    PlainText(String),
    /// Ordered lines; sequence order is playback order.
    Timed(Vec<LyricLine>),
}

impl LyricsPayload {
    /// Whether any line carries timestamp data (gates LRC export and sync).
    pub fn has_timestamps(&self) -> bool {
        match self {
            LyricsPayload::PlainText(_) => false,
            LyricsPayload::Timed(lines) => lines.iter().any(|l| l.timestamp().is_some()),
        }
    }

    /// Lines for display; plain text is split on newlines into untimed lines.
    pub fn lines(&self) -> Cow<'_, [LyricLine]> {
        match self {
            LyricsPayload::Timed(lines) => Cow::Borrowed(lines.as_slice()),
            LyricsPayload::PlainText(text) => {
                Cow::Owned(text.split('\n').map(LyricLine::untimed).collect())
            }
        }
    }

    /// The unsynced view: timed lines collapsed to their text.
    pub fn unsynced(&self) -> LyricsPayload {
        match self {
            LyricsPayload::PlainText(text) => LyricsPayload::PlainText(text.clone()),
            LyricsPayload::Timed(lines) => LyricsPayload::PlainText(
                lines
                    .iter()
                    .map(|l| l.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }

    /// Text placed on the clipboard by "copy lyrics".
    pub fn copy_text(&self) -> String {
        match self {
            LyricsPayload::PlainText(text) => text.clone(),
            LyricsPayload::Timed(lines) => lines
                .iter()
                .map(|l| match l.timestamp() {
                    Some(ts) => format!("[{ts}] {}", l.text),
                    None => l.text.clone(),
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn has_text(&self) -> bool {
        self.lines().iter().any(|l| !l.text.trim().is_empty())
    }
}

/// `lyrics` is normally a string, but some upstream records carry lines there.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LyricsField {
    Text(String),
    Lines(Vec<LyricLine>),
}

/// Body of `/api/lyrics` (the upstream JSON, passed through by the proxy)
///
/// Decoding never fails on a malformed field: a `timed_lyrics` that is not an
/// array, or a `lyrics` of the wrong type, reads as absent, and array entries
/// that are not line objects are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LyricsResponse {
    #[serde(default, deserialize_with = "lenient_lines")]
    pub timed_lyrics: Option<Vec<LyricLine>>,
    #[serde(default, deserialize_with = "lenient_field")]
    pub lyrics: Option<LyricsField>,
    #[serde(default)]
    pub error: Option<Value>,
}

fn lenient_lines<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<LyricLine>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_field<'de, D: Deserializer<'de>>(d: D) -> Result<Option<LyricsField>, D::Error> {
    Ok(LyricsField::deserialize(Value::deserialize(d)?).ok())
}

impl LyricsResponse {
    /// Prefer timed lines when present and non-empty, else the plain text.
    pub fn into_payload(self) -> Option<LyricsPayload> {
        if let Some(timed) = self.timed_lyrics
            && !timed.is_empty()
        {
            return Some(LyricsPayload::Timed(timed));
        }
        match self.lyrics? {
            LyricsField::Text(text) if !text.is_empty() => Some(LyricsPayload::PlainText(text)),
            LyricsField::Lines(lines) if !lines.is_empty() => Some(LyricsPayload::Timed(lines)),
            _ => None,
        }
    }

    /// Error reported inside a successful body, either a string or `{message}`.
    pub fn error_message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(
                other
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("Unknown error")
                    .to_string(),
            ),
        }
    }
}
