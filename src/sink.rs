//! Output sinks shared by the relays and the command loop.
//!
//! A sink is the only resource shared between tasks. Each call to
//! [`LineSink::write_line`] must emit the whole line in one write so two
//! relays never interleave partial lines.
//!
//! On an interactive terminal the [`Prompt`] is shared with the stdin
//! reader: output lines are written above it and the prompt is redrawn
//! below each one.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use console::Term;

use crate::error::ConsoleError;
use crate::render::{Line, Theme};

/// Destination for rendered console lines.
pub trait LineSink: fmt::Debug + Send + Sync + 'static {
    /// Writes one complete line atomically.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the write fails.
    fn write_line(&self, line: &Line) -> io::Result<()>;
}

/// Writes `line`, logging instead of propagating a failure.
///
/// A broken sink must not take a relay down with it: the line is lost and
/// the task keeps draining its source.
pub fn emit(sink: &dyn LineSink, line: &Line) {
    if let Err(e) = sink.write_line(line) {
        let err = ConsoleError::from(e);
        tracing::warn!(error = %err, "dropping console line");
    }
}

/// Styled sink writing to the process's standard output.
#[derive(Debug, Clone, Default)]
pub struct TerminalSink {
    theme: Theme,
    prompt: Option<Arc<Prompt>>,
}

impl TerminalSink {
    /// Creates a sink rendering with `theme`.
    #[must_use]
    pub const fn new(theme: Theme) -> Self {
        Self {
            theme,
            prompt: None,
        }
    }

    /// Writes every line above `prompt` and redraws it afterwards.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Arc<Prompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }
}

impl LineSink for TerminalSink {
    fn write_line(&self, line: &Line) -> io::Result<()> {
        let text = self.theme.render(line);
        if let Some(prompt) = &self.prompt {
            return prompt.write_above(&text);
        }
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

/// Input prompt on standard output, shared by the stdin reader and
/// [`TerminalSink`].
///
/// Only drawn when standard output is a terminal. All drawing happens
/// under one lock, so a line and the prompt redraw never interleave with
/// the reader's own prompt.
#[derive(Debug)]
pub struct Prompt {
    text: String,
    term: Term,
    interactive: bool,
    state: Mutex<PromptState>,
}

impl Prompt {
    /// Creates a prompt showing `text` (already styled).
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let term = Term::stdout();
        let interactive = term.is_term();
        Self {
            text: text.into(),
            term,
            interactive,
            state: Mutex::new(PromptState::default()),
        }
    }

    /// Draws the prompt unless it is already on screen.
    ///
    /// # Errors
    ///
    /// Returns the terminal write error.
    pub fn show(&self) -> io::Result<()> {
        let mut state = self.state();
        if !self.interactive || !state.needs_prompt() {
            return Ok(());
        }
        self.term.write_str(&self.text)?;
        self.term.flush()
    }

    /// Records that the user submitted a line, which moved the cursor off
    /// the prompt.
    pub fn submitted(&self) {
        self.state().submitted();
    }

    /// Clears the prompt for good, once the session is over.
    ///
    /// # Errors
    ///
    /// Returns the terminal write error.
    pub fn dismiss(&self) -> io::Result<()> {
        if self.interactive && self.state().dismiss() {
            self.term.clear_line()?;
        }
        Ok(())
    }

    /// Writes `text` as a full line above the prompt, then redraws it.
    ///
    /// # Errors
    ///
    /// Returns the terminal write error.
    pub fn write_above(&self, text: &str) -> io::Result<()> {
        let mut state = self.state();
        if !self.interactive {
            return self.term.write_line(text);
        }
        if state.before_line() {
            self.term.clear_line()?;
        }
        self.term.write_line(text)?;
        self.term.write_str(&self.text)?;
        self.term.flush()
    }

    fn state(&self) -> MutexGuard<'_, PromptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether the prompt is currently on screen.
#[derive(Debug, Default)]
struct PromptState {
    shown: bool,
}

impl PromptState {
    /// Returns `true` if the prompt must be drawn now.
    fn needs_prompt(&mut self) -> bool {
        let draw = !self.shown;
        self.shown = true;
        draw
    }

    /// Returns `true` if the prompt line must be cleared before a line is
    /// written. The prompt is redrawn after the line.
    fn before_line(&mut self) -> bool {
        let clear = self.shown;
        self.shown = true;
        clear
    }

    fn submitted(&mut self) {
        self.shown = false;
    }

    fn dismiss(&mut self) -> bool {
        std::mem::replace(&mut self.shown, false)
    }
}

/// Sink that records lines in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<Line>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every line written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<Line> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the plain text of every line written so far.
    #[must_use]
    pub fn texts(&self) -> Vec<String> {
        self.lines().iter().map(Line::plain_text).collect()
    }
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &Line) -> io::Result<()> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.clone());
        Ok(())
    }
}
