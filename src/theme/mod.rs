//! Dark / light theme, held in an explicit context
//!
//! The context is created once at startup from the stored preference (or the
//! system preference when nothing is stored) and handed to whatever renders.

pub mod palette;

use crate::config::Config;
use serde::{Deserialize, Serialize};

pub use palette::Palette;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeContext {
    theme: Theme,
}

impl ThemeContext {
    /// Stored preference first, then the terminal's background hint.
    pub fn init(stored: Option<Theme>) -> Self {
        let hint = std::env::var("COLORFGBG").ok();
        Self::init_with(stored, hint.as_deref())
    }

    pub fn init_with(stored: Option<Theme>, colorfgbg: Option<&str>) -> Self {
        let theme = stored.unwrap_or_else(|| system_preference(colorfgbg));
        Self { theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> Palette {
        Palette::for_theme(self.theme)
    }

    /// Flip the theme and record it in `cfg` (the caller saves the file).
    pub fn toggle(&mut self, cfg: &mut Config) -> Theme {
        self.theme = self.theme.toggled();
        cfg.ui.theme = Some(self.theme);
        self.theme
    }
}

/// `COLORFGBG` is "fg;bg" (sometimes "fg;default;bg"); a light background is
/// colour 7 or 15. Anything else, or no hint, means dark.
fn system_preference(colorfgbg: Option<&str>) -> Theme {
    let bg = colorfgbg
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match bg {
        Some(7) | Some(15) => Theme::Light,
        _ => Theme::Dark,
    }
}
