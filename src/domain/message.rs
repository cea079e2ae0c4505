//! Free-form notices pushed by the radio.

use std::fmt;

/// A single notice from the radio, rendered once and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Notice text as sent by the radio.
    pub text: String,
}

impl Message {
    /// Creates a message from any string-like value.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
