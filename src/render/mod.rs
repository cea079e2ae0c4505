//! Presentation layer: console lines as emphasis-tagged tokens.
//!
//! Relays and the command loop never touch terminal escapes. They build a
//! [`Line`] of [`Token`]s, each carrying an [`Emphasis`], and hand it to an
//! output sink. The sink decides how emphasis looks (see [`Theme`]).

pub mod lines;
pub mod theme;

pub use lines::{exit_notice, failure_line, message_line, response_line, update_line};
pub use theme::{ColorMode, Theme};

/// Two-level emphasis for state-update pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Attribute unchanged in this delta.
    Baseline,
    /// Attribute changed in this delta.
    Elevated,
}

/// Two-level emphasis for command outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Zero status code.
    Success,
    /// Nonzero status code or local failure.
    Alarm,
}

/// Semantic role of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emphasis {
    /// Unstyled text: separators, free-form payloads.
    Plain,
    /// Line tag such as `MSG`, `UPD` or `RES`.
    Tag,
    /// Client handle that sent an update.
    Handle,
    /// Object path of an update.
    Object,
    /// Serial number of a command response.
    Serial,
    /// Attribute name in an update.
    Key(Level),
    /// Attribute value in an update.
    Value(Level),
    /// Status code or failure text.
    Status(Outcome),
}

/// A run of text with one emphasis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Literal text.
    pub text: String,
    /// How the text should be emphasized.
    pub emphasis: Emphasis,
}

impl Token {
    /// Creates a token.
    #[must_use]
    pub fn new(text: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            text: text.into(),
            emphasis,
        }
    }
}

/// One complete output line. Sinks write a line atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    tokens: Vec<Token>,
}

impl Line {
    /// Creates an empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token, returning the line for chaining.
    #[must_use]
    pub fn with(mut self, text: impl Into<String>, emphasis: Emphasis) -> Self {
        self.push(text, emphasis);
        self
    }

    /// Appends a token in place.
    pub fn push(&mut self, text: impl Into<String>, emphasis: Emphasis) {
        self.tokens.push(Token::new(text, emphasis));
    }

    /// Tokens in display order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Concatenated text with all emphasis stripped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Emphasis of the first token whose text equals `text`.
    #[must_use]
    pub fn emphasis_of(&self, text: &str) -> Option<Emphasis> {
        self.tokens
            .iter()
            .find(|t| t.text == text)
            .map(|t| t.emphasis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_concatenates_tokens() {
        let line = Line::new()
            .with("MSG", Emphasis::Tag)
            .with(" ", Emphasis::Plain)
            .with("hello", Emphasis::Plain);
        assert_eq!(line.plain_text(), "MSG hello");
        assert_eq!(line.tokens().len(), 3);
    }

    #[test]
    fn emphasis_lookup_by_text() {
        let line = Line::new()
            .with("a", Emphasis::Key(Level::Baseline))
            .with("b", Emphasis::Key(Level::Elevated));
        assert_eq!(line.emphasis_of("b"), Some(Emphasis::Key(Level::Elevated)));
        assert_eq!(line.emphasis_of("c"), None);
    }
}
