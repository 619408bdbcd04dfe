//! Downloads of translation / transliteration results.

use super::sanitize_stem;
use crate::transform::TransformKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ResultFormat {
    Txt,
    Json,
}

impl ResultFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ResultFormat::Txt => "txt",
            ResultFormat::Json => "json",
        }
    }
}

#[derive(Serialize)]
struct TransformedJson<'a> {
    title: &'a str,
    artist: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    source: String,
    lyrics: &'a str,
}

/// Render a translated/transliterated text block. `target` is the code the
/// user picked; its display name is used where one is known.
pub fn render_transformed(
    kind: TransformKind,
    format: ResultFormat,
    text: &str,
    artist: &str,
    song: &str,
    target: &str,
) -> String {
    let target_name = kind.target_name(target);
    match format {
        ResultFormat::Txt => format!(
            "{song} ({} to {target_name})\nBy {artist}\n\n---\n\n{text}",
            kind.past()
        ),
        ResultFormat::Json => {
            let (language, system) = match kind {
                TransformKind::Translation => (Some(target_name), None),
                TransformKind::Transliteration => (None, Some(target_name)),
            };
            let doc = TransformedJson {
                title: song,
                artist,
                language,
                system,
                source: format!("Lyrica {}", kind.noun()),
                lyrics: text,
            };
            serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".into())
        }
    }
}

pub fn transformed_filename(
    kind: TransformKind,
    artist: &str,
    song: &str,
    format: ResultFormat,
) -> String {
    let suffix = kind.past().to_ascii_lowercase();
    format!(
        "{}.{}",
        sanitize_stem(&format!("{artist}-{song}-{suffix}")),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_txt() {
        let out = render_transformed(
            TransformKind::Translation,
            ResultFormat::Txt,
            "Hola",
            "A",
            "S",
            "spanish",
        );
        assert_eq!(out, "S (Translated to Spanish)\nBy A\n\n---\n\nHola");
    }

    #[test]
    fn test_transliteration_json() {
        let out = render_transformed(
            TransformKind::Transliteration,
            ResultFormat::Json,
            "annyeong",
            "A",
            "S",
            "roman",
        );
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["system"], "Roman");
        assert_eq!(v["source"], "Lyrica Transliteration");
        assert_eq!(v["lyrics"], "annyeong");
        assert!(v.get("language").is_none());
    }

    #[test]
    fn test_filenames() {
        assert_eq!(
            transformed_filename(TransformKind::Translation, "A B", "S", ResultFormat::Txt),
            "a-b-s-translated.txt"
        );
        assert_eq!(
            transformed_filename(TransformKind::Transliteration, "A", "S", ResultFormat::Json),
            "a-s-transliterated.json"
        );
    }
}
