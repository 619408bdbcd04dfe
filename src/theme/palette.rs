//! Terminal colours per theme

use super::Theme;
use crossterm::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub accent: Color,
    pub error: Color,
}

const fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb { r, g, b }
}

impl Palette {
    pub const DARK: Self = Self {
        fg_primary: rgb(255, 255, 255),   // #ffffff
        fg_secondary: rgb(136, 136, 136), // #888888
        accent: rgb(167, 139, 250),       // #a78bfa
        error: rgb(248, 113, 113),        // #f87171
    };

    pub const LIGHT: Self = Self {
        fg_primary: rgb(17, 17, 17),      // #111111
        fg_secondary: rgb(102, 102, 102), // #666666
        accent: rgb(109, 40, 217),        // #6d28d9
        error: rgb(185, 28, 28),          // #b91c1c
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::DARK,
            Theme::Light => Self::LIGHT,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DARK
    }
}
