//! Line input sources for the command loop.
//!
//! The interactive source reads stdin on a dedicated OS thread and forwards
//! lines over a channel, so the async command loop only ever awaits a
//! channel receive. End of input and read failures both surface as
//! [`ConsoleError::Input`].

use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{ConsoleError, Result};
use crate::sink::Prompt;

/// Source of user command lines.
#[async_trait]
pub trait InputSource: Send + 'static {
    /// Waits for the next line, already trimmed of surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Input`] when the source fails or is
    /// exhausted.
    async fn read_line(&mut self) -> Result<String>;
}

/// Input fed by a channel of lines. Closing the sender ends input.
#[derive(Debug)]
pub struct ChannelInput {
    rx: mpsc::Receiver<String>,
}

impl ChannelInput {
    /// Wraps a receiver.
    #[must_use]
    pub const fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { rx }
    }

    /// Creates a connected sender/input pair.
    #[must_use]
    pub fn pair(capacity: usize) -> (mpsc::Sender<String>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self::new(rx))
    }
}

#[async_trait]
impl InputSource for ChannelInput {
    async fn read_line(&mut self) -> Result<String> {
        match self.rx.recv().await {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(ConsoleError::Input("end of input".to_string())),
        }
    }
}

/// Input that replays a fixed list of lines, then reports end of input.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
}

impl ScriptedInput {
    /// Creates a script from the given lines.
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl InputSource for ScriptedInput {
    async fn read_line(&mut self) -> Result<String> {
        self.lines
            .pop_front()
            .map(|l| l.trim().to_string())
            .ok_or_else(|| ConsoleError::Input("end of script".to_string()))
    }
}

/// Starts reading standard input on a background thread.
///
/// `prompt` is drawn before every read unless output already redrew it.
/// The thread exits on end of input, on a read error, or once the returned
/// source is dropped; it is never joined, since a blocked stdin read cannot
/// be cancelled.
#[must_use]
pub fn stdin_input(prompt: Arc<Prompt>) -> ChannelInput {
    let (tx, input) = ChannelInput::pair(1);
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            loop {
                if let Err(e) = prompt.show() {
                    tracing::warn!(error = %e, "cannot draw prompt");
                }
                let mut line = String::new();
                match stdin.lock().read_line(&mut line) {
                    Ok(0) => {
                        tracing::debug!("stdin reached end of input");
                        break;
                    }
                    Ok(_) => {
                        prompt.submitted();
                        if tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "cannot start stdin reader");
    }
    input
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_input_trims_and_ends() {
        let mut input = ScriptedInput::new(["  ping \n", ""]);
        let Ok(first) = input.read_line().await else {
            panic!("first line");
        };
        assert_eq!(first, "ping");
        let Ok(second) = input.read_line().await else {
            panic!("second line");
        };
        assert!(second.is_empty());
        let Err(ConsoleError::Input(_)) = input.read_line().await else {
            panic!("expected end of input");
        };
    }

    #[tokio::test]
    async fn channel_input_ends_when_sender_dropped() {
        let (tx, mut input) = ChannelInput::pair(2);
        let sent = tx.send("info\r\n".to_string()).await;
        assert!(sent.is_ok());
        drop(tx);

        let Ok(line) = input.read_line().await else {
            panic!("queued line");
        };
        assert_eq!(line, "info");
        assert!(matches!(
            input.read_line().await,
            Err(ConsoleError::Input(_))
        ));
    }
}
