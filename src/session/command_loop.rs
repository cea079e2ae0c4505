//! Reads user lines and runs each as a synchronous radio command.
//!
//! ```text
//! AwaitingLine ──non-empty──▶ Sending ──▶ AwaitingResponse ──▶ AwaitingLine
//!      │  └──empty line──┘                       │
//!      └──input error / stop──▶ Terminated ◀──client closed──┘
//! ```
//!
//! While waiting for a line the loop also watches the shutdown flag, so an
//! interrupt ends it even though the blocked stdin read cannot be
//! cancelled. While waiting for a response it only stops when the client
//! fails the call. Either way an interrupt is reported as
//! [`ConsoleError::Interrupted`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use super::shutdown::{ShutdownCoordinator, ShutdownReason, wait_stopping};
use crate::client::ProtocolClient;
use crate::domain::CommandResponse;
use crate::error::{ConsoleError, Result};
use crate::input::InputSource;
use crate::render::{failure_line, response_line};
use crate::sink::{LineSink, emit};

/// How the command loop ended.
#[derive(Debug)]
pub struct LoopExit {
    /// Commands handed to the client, including startup commands.
    pub commands_sent: usize,
    /// Error that moved the loop to Terminated.
    pub cause: ConsoleError,
}

/// The interactive command loop.
#[derive(Debug)]
pub struct CommandLoop<C: ?Sized, I> {
    client: Arc<C>,
    input: I,
    sink: Arc<dyn LineSink>,
    shutdown: ShutdownCoordinator<C>,
    stopping: watch::Receiver<Option<ShutdownReason>>,
    timeout: Option<Duration>,
    startup: Vec<String>,
}

impl<C, I> CommandLoop<C, I>
where
    C: ProtocolClient + ?Sized,
    I: InputSource,
{
    /// Creates a loop reading from `input` and writing to `sink`.
    #[must_use]
    pub fn new(
        client: Arc<C>,
        input: I,
        sink: Arc<dyn LineSink>,
        shutdown: ShutdownCoordinator<C>,
    ) -> Self {
        let stopping = shutdown.subscribe();
        Self {
            client,
            input,
            sink,
            shutdown,
            stopping,
            timeout: None,
            startup: Vec::new(),
        }
    }

    /// Bounds every round trip; `None` waits forever.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Commands to send before the first input line is read.
    #[must_use]
    pub fn with_startup_commands(mut self, commands: Vec<String>) -> Self {
        self.startup = commands;
        self
    }

    /// Runs until input ends, shutdown is triggered, or the client fails a
    /// command because it closed. Always triggers shutdown on the way out.
    pub async fn run(mut self) -> LoopExit {
        let mut sent = 0usize;
        let startup = std::mem::take(&mut self.startup);

        let cause = 'session: {
            for command in startup {
                sent = sent.saturating_add(1);
                if let Err(e) = self.send(&command).await {
                    break 'session e;
                }
            }
            loop {
                let line = tokio::select! {
                    biased;
                    () = wait_stopping(&mut self.stopping) => break ConsoleError::ClientClosed,
                    line = self.input.read_line() => match line {
                        Ok(line) => line,
                        Err(e) => break e,
                    },
                };
                if line.is_empty() {
                    continue;
                }
                sent = sent.saturating_add(1);
                if let Err(e) = self.send(&line).await {
                    break e;
                }
            }
        };

        let cause = match (cause, self.shutdown.reason()) {
            (ConsoleError::ClientClosed, Some(ShutdownReason::Interrupt)) => {
                ConsoleError::Interrupted
            }
            (cause, _) => cause,
        };
        tracing::info!(reason = %cause, commands = sent, "command loop terminated");
        let reason = match &cause {
            ConsoleError::Input(_) => ShutdownReason::InputClosed,
            ConsoleError::Interrupted => ShutdownReason::Interrupt,
            _ => ShutdownReason::ClientStopped,
        };
        self.shutdown.trigger(reason);
        LoopExit {
            commands_sent: sent,
            cause,
        }
    }

    // Borrows only the `Sync` fields so the input source need not be `Sync`.
    fn send<'a>(&'a self, command: &'a str) -> impl Future<Output = Result<()>> + Send + 'a {
        dispatch(self.client.as_ref(), self.sink.as_ref(), self.timeout, command)
    }
}

/// Sends one command and renders the outcome. Only session-ending errors
/// are returned.
async fn dispatch<C: ProtocolClient + ?Sized>(
    client: &C,
    sink: &dyn LineSink,
    timeout: Option<Duration>,
    command: &str,
) -> Result<()> {
    match send_command(client, command, timeout).await {
        Ok(res) => {
            emit(sink, &response_line(&res));
            Ok(())
        }
        Err(e) if e.ends_session() => Err(e),
        Err(e) => {
            emit(sink, &failure_line(command, &e.to_string()));
            Ok(())
        }
    }
}

/// Sends `command`, optionally bounding the wait.
///
/// # Errors
///
/// Returns [`ConsoleError::CommandTimeout`] when the bound elapses and
/// whatever the client reports otherwise.
pub async fn send_command<C: ProtocolClient + ?Sized>(
    client: &C,
    command: &str,
    timeout: Option<Duration>,
) -> Result<CommandResponse> {
    match timeout {
        None => client.send_and_wait(command).await,
        Some(limit) => tokio::time::timeout(limit, client.send_and_wait(command))
            .await
            .map_err(|_| ConsoleError::CommandTimeout(limit))?,
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::client::LoopbackClient;
    use crate::client::device::{SimulatedRadio, UNKNOWN_COMMAND};
    use crate::domain::ClientHandle;
    use crate::input::{ChannelInput, ScriptedInput};
    use crate::render::{Emphasis, Outcome};
    use crate::sink::MemorySink;

    struct Harness {
        client: Arc<LoopbackClient>,
        sink: Arc<MemorySink>,
        shutdown: ShutdownCoordinator<LoopbackClient>,
        main: tokio::task::JoinHandle<()>,
    }

    fn harness() -> Harness {
        let client = Arc::new(LoopbackClient::with_radio(SimulatedRadio::new(
            ClientHandle::new(7),
        )));
        let sink = Arc::new(MemorySink::new());
        let shutdown =
            ShutdownCoordinator::new(Arc::clone(&client), Arc::clone(&sink) as Arc<dyn LineSink>);
        let runner = Arc::clone(&client);
        let main = tokio::spawn(async move { runner.run().await });
        Harness {
            client,
            sink,
            shutdown,
            main,
        }
    }

    fn command_loop<I: InputSource>(h: &Harness, input: I) -> CommandLoop<LoopbackClient, I> {
        CommandLoop::new(
            Arc::clone(&h.client),
            input,
            Arc::clone(&h.sink) as Arc<dyn LineSink>,
            h.shutdown.clone(),
        )
    }

    #[tokio::test]
    async fn renders_responses_and_closes_on_end_of_input() {
        let h = harness();
        let exit = command_loop(&h, ScriptedInput::new(["ping", "frobnicate"]))
            .run()
            .await;

        assert_eq!(exit.commands_sent, 2);
        assert!(matches!(exit.cause, ConsoleError::Input(_)));
        assert!(h.client.is_closed());
        assert!(h.main.await.is_ok());

        let lines = h.sink.lines();
        let texts: Vec<String> = lines.iter().map(|l| l.plain_text()).collect();
        assert_eq!(
            texts,
            vec![
                "RES 1 00000000".to_string(),
                format!("RES 2 {UNKNOWN_COMMAND:08X} unknown command"),
            ]
        );
        let Some(alarm) = lines.get(1) else {
            panic!("second line");
        };
        assert_eq!(
            alarm.emphasis_of(&format!("{UNKNOWN_COMMAND:08X}")),
            Some(Emphasis::Status(Outcome::Alarm))
        );
    }

    #[tokio::test]
    async fn empty_lines_send_nothing() {
        let h = harness();
        let exit = command_loop(&h, ScriptedInput::new(["", "   ", ""]))
            .run()
            .await;
        assert_eq!(exit.commands_sent, 0);
        assert!(h.sink.lines().is_empty());
    }

    #[tokio::test]
    async fn startup_commands_run_before_input() {
        let h = harness();
        let exit = command_loop(&h, ScriptedInput::new(["ping"]))
            .with_startup_commands(vec!["get radio".to_string()])
            .run()
            .await;
        assert_eq!(exit.commands_sent, 2);
        assert_eq!(
            h.sink.texts(),
            vec![
                "RES 1 00000000 model=LOOPBACK slices=2".to_string(),
                "RES 2 00000000".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn timeout_is_reported_and_loop_continues() {
        let h = harness();
        let exit = command_loop(&h, ScriptedInput::new(["sleep 5000", "ping"]))
            .with_timeout(Some(Duration::from_millis(20)))
            .run()
            .await;
        assert_eq!(exit.commands_sent, 2);
        assert_eq!(
            h.sink.texts(),
            vec![
                "ERR sleep 5000: no response after 20 ms".to_string(),
                "RES 2 00000000".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn stop_while_awaiting_line_ends_loop() {
        let h = harness();
        let (_keep_open, input) = ChannelInput::pair(1);
        let task = tokio::spawn(command_loop(&h, input).run());
        tokio::task::yield_now().await;

        h.shutdown.trigger(ShutdownReason::Interrupt);
        let Ok(exit) = task.await else {
            panic!("loop panicked");
        };
        assert!(matches!(exit.cause, ConsoleError::Interrupted));
        assert_eq!(exit.commands_sent, 0);
    }

    #[tokio::test]
    async fn client_stop_while_awaiting_line_is_not_an_interrupt() {
        let h = harness();
        let (_keep_open, input) = ChannelInput::pair(1);
        let task = tokio::spawn(command_loop(&h, input).run());
        tokio::task::yield_now().await;

        h.shutdown.trigger(ShutdownReason::ClientStopped);
        let Ok(exit) = task.await else {
            panic!("loop panicked");
        };
        assert!(matches!(exit.cause, ConsoleError::ClientClosed));
    }

    #[tokio::test]
    async fn interrupt_while_awaiting_response_unblocks() {
        let h = harness();
        let (tx, input) = ChannelInput::pair(1);
        let task = tokio::spawn(command_loop(&h, input).run());
        assert!(tx.send("sleep 600000".to_string()).await.is_ok());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(!task.is_finished());

        h.shutdown.trigger(ShutdownReason::Interrupt);
        let Ok(exit) = task.await else {
            panic!("loop panicked");
        };
        assert_eq!(exit.commands_sent, 1);
        assert!(matches!(exit.cause, ConsoleError::Interrupted));
        assert!(h.sink.lines().is_empty());
        assert!(h.main.await.is_ok());
    }
}
