// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Domscope-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of domscope and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::env;

use ratatui::style::{Color, Modifier, Style};

/// Environment variable holding an 18-color palette override.
pub const PALETTE_ENV_VAR: &str = "DOMSCOPE_TUI_PALETTE";

/// Styles for both panes. Without a palette the terminal's own colors are used.
#[derive(Debug, Clone, Default)]
pub struct TuiTheme {
    palette: Option<TuiPalette>,
}

impl TuiTheme {
    pub fn from_env() -> Result<Self, ThemeError> {
        let value = match env::var(PALETTE_ENV_VAR) {
            Ok(value) => value,
            Err(env::VarError::NotPresent) => return Ok(Self::default()),
            Err(env::VarError::NotUnicode(_)) => {
                return Err(ThemeError::InvalidEnv {
                    name: PALETTE_ENV_VAR,
                    reason: "value is not valid unicode".to_owned(),
                })
            }
        };
        Self::from_palette_csv(&value)
    }

    /// Parses `fg,bg,` followed by the sixteen ANSI colors. A blank value means no
    /// override.
    pub fn from_palette_csv(value: &str) -> Result<Self, ThemeError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Self::default());
        }
        let palette = TuiPalette::parse_csv(value).map_err(|reason| ThemeError::InvalidEnv {
            name: PALETTE_ENV_VAR,
            reason,
        })?;
        Ok(Self {
            palette: Some(palette),
        })
    }

    pub(crate) fn base_style(&self) -> Style {
        match &self.palette {
            Some(palette) => Style::default().fg(palette.fg).bg(palette.bg),
            None => Style::default(),
        }
    }

    fn color(&self, color: Ansi16) -> Color {
        match &self.palette {
            Some(palette) => palette.ansi[color as usize],
            None => color.into(),
        }
    }

    pub(crate) fn border_style(&self, focused: bool) -> Style {
        if focused {
            self.base_style().fg(self.color(Ansi16::Yellow))
        } else {
            self.base_style().fg(self.color(Ansi16::BrightBlack))
        }
    }

    /// The keyboard cursor row.
    pub(crate) fn cursor_style(&self) -> Style {
        self.base_style()
            .add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    /// Rows and document lines of the selected node.
    pub(crate) fn selected_style(&self) -> Style {
        self.base_style()
            .fg(self.color(Ansi16::Black))
            .bg(self.color(Ansi16::Cyan))
            .add_modifier(Modifier::BOLD)
    }

    pub(crate) fn tag_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi16::BrightBlue))
    }

    pub(crate) fn attribute_style(&self) -> Style {
        self.base_style()
            .fg(self.color(Ansi16::BrightBlack))
            .add_modifier(Modifier::ITALIC)
    }

    pub(crate) fn guide_style(&self) -> Style {
        self.base_style()
            .fg(self.color(Ansi16::BrightBlack))
            .add_modifier(Modifier::DIM)
    }

    pub(crate) fn marker_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi16::Yellow))
    }

    pub(crate) fn search_hit_style(&self) -> Style {
        self.base_style()
            .fg(self.color(Ansi16::Black))
            .bg(self.color(Ansi16::Yellow))
    }

    pub(crate) fn error_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi16::Red))
    }

    pub(crate) fn hint_style(&self) -> Style {
        self.base_style().fg(self.color(Ansi16::White))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TuiPalette {
    fg: Color,
    bg: Color,
    ansi: [Color; 16],
}

impl TuiPalette {
    const COLOR_COUNT: usize = 18;

    fn parse_csv(value: &str) -> Result<Self, String> {
        let colors = value
            .split(',')
            .map(parse_color)
            .collect::<Result<Vec<_>, _>>()?;
        let [fg, bg, ansi @ ..] = colors.as_slice() else {
            return Err(Self::count_error(colors.len()));
        };
        let ansi: [Color; 16] = ansi
            .try_into()
            .map_err(|_| Self::count_error(colors.len()))?;
        Ok(Self {
            fg: *fg,
            bg: *bg,
            ansi,
        })
    }

    fn count_error(found: usize) -> String {
        format!(
            "expected {} comma-separated colors (fg, bg, then the 16 ANSI colors), got {found}",
            Self::COLOR_COUNT
        )
    }
}

/// Accepts `#RRGGBB`, `0xRRGGBB`, `RRGGBB` and X11 `rgb:RR/GG/BB` (2 or 4 hex
/// digits per channel).
fn parse_color(raw: &str) -> Result<Color, String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err("empty color".to_owned());
    }

    if let Some(channels) = value
        .get(..4)
        .filter(|prefix| prefix.eq_ignore_ascii_case("rgb:"))
        .map(|_| &value[4..])
    {
        let parts: Vec<&str> = channels.split('/').collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(format!("invalid color {value}: expected rgb:RR/GG/BB"));
        };
        return Ok(Color::Rgb(channel(r)?, channel(g)?, channel(b)?));
    }

    let hex = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("0x"))
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid color {value}: expected #RRGGBB"));
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| format!("invalid color {value}"))?;
    let [_, r, g, b] = rgb.to_be_bytes();
    Ok(Color::Rgb(r, g, b))
}

fn channel(raw: &str) -> Result<u8, String> {
    let digits = raw.trim();
    if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return Err(format!("invalid rgb channel {digits}"));
    }
    let parsed = match digits.len() {
        2 => u8::from_str_radix(digits, 16).ok(),
        4 => u16::from_str_radix(digits, 16)
            .ok()
            .map(|wide| wide.to_be_bytes()[0]),
        _ => None,
    };
    parsed.ok_or_else(|| format!("invalid rgb channel {digits}: expected 2 or 4 hex digits"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
enum Ansi16 {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl From<Ansi16> for Color {
    fn from(value: Ansi16) -> Self {
        match value {
            Ansi16::Black => Color::Black,
            Ansi16::Red => Color::Red,
            Ansi16::Green => Color::Green,
            Ansi16::Yellow => Color::Yellow,
            Ansi16::Blue => Color::Blue,
            Ansi16::Magenta => Color::Magenta,
            Ansi16::Cyan => Color::Cyan,
            Ansi16::White => Color::Gray,
            Ansi16::BrightBlack => Color::DarkGray,
            Ansi16::BrightRed => Color::LightRed,
            Ansi16::BrightGreen => Color::LightGreen,
            Ansi16::BrightYellow => Color::LightYellow,
            Ansi16::BrightBlue => Color::LightBlue,
            Ansi16::BrightMagenta => Color::LightMagenta,
            Ansi16::BrightCyan => Color::LightCyan,
            Ansi16::BrightWhite => Color::White,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ThemeError {
    #[error("invalid env {name}: {reason}")]
    InvalidEnv { name: &'static str, reason: String },
}
