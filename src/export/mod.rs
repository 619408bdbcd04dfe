//! Export formatter
//!
//! Renders a `LyricsPayload` plus artist/title metadata into one of the
//! download formats. Rendering is pure: identical inputs give identical output.

pub mod transformed;

use crate::lyrics::{LyricLine, LyricsPayload};
use anyhow::Context;
use serde::Serialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

pub use transformed::{ResultFormat, render_transformed, transformed_filename};

const SOURCE: &str = "Lyrica";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Synchronized lyrics (`.lrc`)
    Lrc,
    /// Plain text (`.txt`)
    Txt,
    /// Structured JSON (`.json`)
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Lrc => "lrc",
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Lrc | ExportFormat::Txt => "text/plain",
            ExportFormat::Json => "application/json",
        }
    }

    /// Formats a caller may offer for this payload. LRC needs timestamp data.
    pub fn available_for(payload: &LyricsPayload) -> Vec<ExportFormat> {
        let mut formats = Vec::with_capacity(3);
        if payload.has_timestamps() {
            formats.push(ExportFormat::Lrc);
        }
        formats.push(ExportFormat::Txt);
        formats.push(ExportFormat::Json);
        formats
    }
}

/// Render `payload` in `format`.
///
/// LRC on a payload without timestamps is a caller error; it still renders,
/// just without timestamp columns.
pub fn render(format: ExportFormat, payload: &LyricsPayload, artist: &str, song: &str) -> String {
    match format {
        ExportFormat::Lrc => render_lrc(payload, artist, song),
        ExportFormat::Txt => render_txt(payload, artist, song),
        ExportFormat::Json => render_json(payload, artist, song),
    }
}

fn render_lrc(payload: &LyricsPayload, artist: &str, song: &str) -> String {
    let mut lines = vec![
        format!("[ar:{artist}]"),
        format!("[ti:{song}]"),
        format!("[al:{SOURCE}]"),
        format!("[by:{SOURCE}]"),
    ];

    match payload {
        LyricsPayload::Timed(entries) => {
            for entry in entries.iter().filter(|e| !e.text.is_empty()) {
                // Timestamps arrive with their own delimiters, so no separator here.
                match entry.timestamp() {
                    Some(ts) => lines.push(format!("{ts}{}", entry.text)),
                    None => lines.push(entry.text.clone()),
                }
            }
        }
        LyricsPayload::PlainText(text) => {
            lines.extend(
                text.split('\n')
                    .filter(|l| !l.trim().is_empty())
                    .map(str::to_string),
            );
        }
    }

    lines.join("\n")
}

fn render_txt(payload: &LyricsPayload, artist: &str, song: &str) -> String {
    let mut content = format!("{song}\nBy {artist}\n\n---\n\n");

    match payload {
        LyricsPayload::Timed(entries) => {
            for entry in entries.iter().filter(|e| !e.text.is_empty()) {
                match entry.timestamp() {
                    Some(ts) => content.push_str(&format!("[{ts}] {}\n", entry.text)),
                    None => {
                        content.push_str(&entry.text);
                        content.push('\n');
                    }
                }
            }
        }
        LyricsPayload::PlainText(text) => content.push_str(text),
    }

    content
}

#[derive(Serialize)]
struct JsonExport<'a> {
    title: &'a str,
    artist: &'a str,
    source: &'static str,
    lyrics: Cow<'a, [LyricLine]>,
}

fn render_json(payload: &LyricsPayload, artist: &str, song: &str) -> String {
    let doc = JsonExport {
        title: song,
        artist,
        source: SOURCE,
        lyrics: payload.lines(),
    };
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".into())
}

/// Replace every non-alphanumeric character with `-` and lower-case the rest.
pub(crate) fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

/// `<artist>-<song>` sanitized, plus the format's extension.
pub fn export_filename(artist: &str, song: &str, format: ExportFormat) -> String {
    format!(
        "{}.{}",
        sanitize_stem(&format!("{artist}-{song}")),
        format.extension()
    )
}

/// A rendered export, ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub mime: &'static str,
    pub content: String,
}

impl ExportFile {
    pub fn new(format: ExportFormat, payload: &LyricsPayload, artist: &str, song: &str) -> Self {
        Self {
            filename: export_filename(artist, song, format),
            mime: format.mime(),
            content: render(format, payload, artist, song),
        }
    }

    pub fn write_to(&self, dir: &Path) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir).with_context(|| format!("create dir {}", dir.display()))?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.content)
            .with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
