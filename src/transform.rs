//! Translation and transliteration share one request shape; `TransformKind`
//! carries everything that differs between the two flows.

use serde::Serialize;

/// A selectable target (language or script system)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub code: &'static str,
    pub name: &'static str,
}

pub const LANGUAGES: &[Choice] = &[
    Choice { code: "english", name: "English" },
    Choice { code: "spanish", name: "Spanish" },
    Choice { code: "french", name: "French" },
    Choice { code: "german", name: "German" },
    Choice { code: "italian", name: "Italian" },
    Choice { code: "portuguese", name: "Portuguese" },
    Choice { code: "russian", name: "Russian" },
    Choice { code: "japanese", name: "Japanese" },
    Choice { code: "korean", name: "Korean" },
    Choice { code: "chinese", name: "Chinese" },
];

pub const SYSTEMS: &[Choice] = &[
    Choice { code: "latin", name: "Latin (Most Common)" },
    Choice { code: "roman", name: "Roman" },
    Choice { code: "iso", name: "ISO Standard" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    Translation,
    Transliteration,
}

impl TransformKind {
    /// Path segment used both by the proxy (`/api/<seg>`) and upstream.
    pub fn path(self) -> &'static str {
        match self {
            TransformKind::Translation => "translate",
            TransformKind::Transliteration => "transliterate",
        }
    }

    /// Query parameter naming the target.
    pub fn param(self) -> &'static str {
        match self {
            TransformKind::Translation => "language",
            TransformKind::Transliteration => "system",
        }
    }

    pub fn default_target(self) -> &'static str {
        self.choices()[0].code
    }

    pub fn choices(self) -> &'static [Choice] {
        match self {
            TransformKind::Translation => LANGUAGES,
            TransformKind::Transliteration => SYSTEMS,
        }
    }

    pub fn find(self, code: &str) -> Option<&'static Choice> {
        self.choices().iter().find(|c| c.code == code)
    }

    /// Display name for a target code, falling back to the code itself.
    pub fn target_name(self, code: &str) -> &str {
        self.find(code).map(|c| c.name).unwrap_or(code)
    }

    pub fn noun(self) -> &'static str {
        match self {
            TransformKind::Translation => "Translation",
            TransformKind::Transliteration => "Transliteration",
        }
    }

    pub fn past(self) -> &'static str {
        match self {
            TransformKind::Translation => "Translated",
            TransformKind::Transliteration => "Transliterated",
        }
    }

    /// Field holding the result besides `lyrics`.
    pub fn result_field(self) -> &'static str {
        match self {
            TransformKind::Translation => "translation",
            TransformKind::Transliteration => "transliteration",
        }
    }

    pub fn not_available_message(self) -> &'static str {
        match self {
            TransformKind::Translation => {
                "Translation not available for this song. Try another language or song."
            }
            TransformKind::Transliteration => {
                "Transliteration not available for this song. Try another system or song."
            }
        }
    }

    pub fn unavailable_message(self) -> &'static str {
        match self {
            TransformKind::Translation => {
                "Translation service is temporarily unavailable. Please try again later."
            }
            TransformKind::Transliteration => {
                "Transliteration service is temporarily unavailable. Please try again later."
            }
        }
    }

    pub fn failed_message(self) -> &'static str {
        match self {
            TransformKind::Translation => "Translation failed. Please try again.",
            TransformKind::Transliteration => "Transliteration failed. Please try again.",
        }
    }

    /// Proxy-side transport failure.
    pub fn transport_message(self) -> &'static str {
        match self {
            TransformKind::Translation => {
                "Failed to translate lyrics. The service may be experiencing delays."
            }
            TransformKind::Transliteration => {
                "Failed to transliterate lyrics. The service may be experiencing delays."
            }
        }
    }

    /// Client-side failure before any response arrived.
    pub fn retry_message(self) -> &'static str {
        match self {
            TransformKind::Translation => "Failed to translate lyrics. Please try again.",
            TransformKind::Transliteration => "Failed to transliterate lyrics. Please try again.",
        }
    }

    pub fn timeout_message(self) -> &'static str {
        match self {
            TransformKind::Translation => {
                "Translation took too long (3+ minutes). The service may be experiencing delays. Please try again later."
            }
            TransformKind::Transliteration => {
                "Transliteration took too long (3+ minutes). The service may be experiencing delays. Please try again later."
            }
        }
    }

    pub fn still_processing_message(self) -> &'static str {
        match self {
            TransformKind::Translation => {
                "Translation is taking longer than expected. Please keep waiting..."
            }
            TransformKind::Transliteration => {
                "Transliteration is taking longer than expected. Please keep waiting..."
            }
        }
    }

    pub fn no_data_message(self) -> &'static str {
        match self {
            TransformKind::Translation => {
                "No translation data received. The song may not be supported."
            }
            TransformKind::Transliteration => {
                "No transliteration data received. The song may not be supported."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_names() {
        assert_eq!(TransformKind::Translation.default_target(), "english");
        assert_eq!(TransformKind::Transliteration.default_target(), "latin");
        assert_eq!(TransformKind::Translation.target_name("korean"), "Korean");
        assert_eq!(TransformKind::Transliteration.target_name("iso"), "ISO Standard");
        assert_eq!(TransformKind::Translation.target_name("klingon"), "klingon");
        assert!(TransformKind::Transliteration.find("english").is_none());
    }
}
