//! Maps semantic emphasis onto terminal styles.

use std::str::FromStr;

use console::Style;

use super::{Emphasis, Level, Line, Outcome};
use crate::error::ConsoleError;

/// When to emit ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Style only when the terminal supports it.
    #[default]
    Auto,
    /// Always style.
    Always,
    /// Never style.
    Never,
}

impl FromStr for ColorMode {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "auto" => Ok(Self::Auto),
            "always" | "on" => Ok(Self::Always),
            "never" | "off" => Ok(Self::Never),
            other => Err(ConsoleError::Config(format!("unknown color mode {other:?}"))),
        }
    }
}

/// Terminal palette for console lines.
#[derive(Debug, Clone)]
pub struct Theme {
    mode: ColorMode,
}

impl Theme {
    /// Creates a theme with the given color mode.
    #[must_use]
    pub const fn new(mode: ColorMode) -> Self {
        Self { mode }
    }

    /// A theme that never emits escapes.
    #[must_use]
    pub const fn plain() -> Self {
        Self::new(ColorMode::Never)
    }

    /// Styles the prompt's label, leaving a trailing `> ` separator plain.
    #[must_use]
    pub fn prompt(&self, text: &str) -> String {
        let label = text.trim_end_matches([' ', '>']);
        let separator = text.strip_prefix(label).unwrap_or_default();
        format!(
            "{}{separator}",
            self.apply(Style::new().magenta().bright(), label)
        )
    }

    /// Renders a line to a string, without the trailing newline.
    #[must_use]
    pub fn render(&self, line: &Line) -> String {
        line.tokens()
            .iter()
            .map(|t| match style_for(t.emphasis) {
                Some(style) => self.apply(style, &t.text),
                None => t.text.clone(),
            })
            .collect()
    }

    fn apply(&self, style: Style, text: &str) -> String {
        let style = match self.mode {
            ColorMode::Auto => style,
            ColorMode::Always => style.force_styling(true),
            ColorMode::Never => return text.to_string(),
        };
        style.apply_to(text).to_string()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ColorMode::default())
    }
}

fn style_for(emphasis: Emphasis) -> Option<Style> {
    let style = match emphasis {
        Emphasis::Plain => return None,
        Emphasis::Tag => Style::new().green().bright(),
        Emphasis::Handle | Emphasis::Serial => Style::new().blue().bright(),
        Emphasis::Object => Style::new().yellow().bright(),
        Emphasis::Key(Level::Elevated) => Style::new().cyan().bright(),
        Emphasis::Key(Level::Baseline) => Style::new().cyan(),
        Emphasis::Value(Level::Elevated) => Style::new().white().bright(),
        Emphasis::Value(Level::Baseline) => Style::new().white(),
        Emphasis::Status(Outcome::Success) => Style::new().green().bright(),
        Emphasis::Status(Outcome::Alarm) => Style::new().red().bright(),
    };
    Some(style)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn sample() -> Line {
        Line::new()
            .with("RES", Emphasis::Tag)
            .with(" ", Emphasis::Plain)
            .with("00000123", Emphasis::Status(Outcome::Alarm))
    }

    #[test]
    fn never_mode_emits_no_escapes() {
        let out = Theme::plain().render(&sample());
        assert_eq!(out, "RES 00000123");
    }

    #[test]
    fn always_mode_emits_escapes() {
        let out = Theme::new(ColorMode::Always).render(&sample());
        assert!(out.contains('\u{1b}'));
        assert_eq!(console::strip_ansi_codes(&out), "RES 00000123");
    }

    #[test]
    fn elevated_and_baseline_differ() {
        let theme = Theme::new(ColorMode::Always);
        let hi = theme.render(&Line::new().with("k", Emphasis::Key(Level::Elevated)));
        let lo = theme.render(&Line::new().with("k", Emphasis::Key(Level::Baseline)));
        assert_ne!(hi, lo);
    }

    #[test]
    fn prompt_styles_only_the_label() {
        let out = Theme::new(ColorMode::Always).prompt("flex> ");
        assert!(out.ends_with("m> "));
        assert_eq!(console::strip_ansi_codes(&out), "flex> ");
        assert_eq!(Theme::plain().prompt("flex> "), "flex> ");
    }

    #[test]
    fn color_mode_parses() {
        let Ok(mode) = "ALWAYS".parse::<ColorMode>() else {
            panic!("valid mode");
        };
        assert_eq!(mode, ColorMode::Always);
        assert!("sometimes".parse::<ColorMode>().is_err());
    }
}
