//! Named color themes, selected by the `ui.theme` setting.

use ratatui::style::Color;

pub struct Theme {
    pub name: &'static str,
    pub border: Color,
    pub accent: Color,
    pub notice: Color,
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "slate",
        border: Color::DarkGray,
        accent: Color::Cyan,
        notice: Color::Yellow,
    },
    Theme {
        name: "ember",
        border: Color::Red,
        accent: Color::LightRed,
        notice: Color::Yellow,
    },
    Theme {
        name: "moss",
        border: Color::Green,
        accent: Color::LightGreen,
        notice: Color::Yellow,
    },
];

/// Look a theme up by name; unknown names fall back to the first theme.
pub fn by_name(name: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or(&THEMES[0])
}
