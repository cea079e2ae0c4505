//! Console session: wires the client, relays, command loop and shutdown
//! coordinator together and joins them.
//!
//! ```text
//!              ┌──────────── ProtocolClient::run ────────────┐
//!   notices ──▶ NotificationRelay ──┐                        │
//!   deltas  ──▶ StateUpdateRelay  ──┼──▶ LineSink            │
//!   input   ──▶ CommandLoop ────────┘     ▲                  │
//!   Ctrl-C  ──▶ ShutdownCoordinator ──────┘ (exit notice)    │
//!                     └──────────── close() ─────────────────┘
//! ```

pub mod command_loop;
pub mod shutdown;

use std::future::Future;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::client::{self, ProtocolClient};
use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::input::InputSource;
use crate::relay::{NotificationRelay, StateUpdateRelay};
use crate::sink::LineSink;

pub use command_loop::{CommandLoop, LoopExit, send_command};
pub use shutdown::{ShutdownCoordinator, ShutdownReason};

/// What happened during a session, collected once every task has ended.
#[derive(Debug)]
pub struct SessionReport {
    /// Commands sent, including startup commands.
    pub commands_sent: usize,
    /// `MSG` lines written.
    pub notices_rendered: usize,
    /// `UPD` lines written.
    pub updates_rendered: usize,
    /// Whether the interrupt listener performed the teardown.
    pub interrupted: bool,
    /// Why the command loop stopped, if it stopped cleanly.
    pub cause: Option<ConsoleError>,
}

/// Connects to the configured radio and runs the console until it shuts
/// down, listening for Ctrl-C.
///
/// # Errors
///
/// Returns [`ConsoleError::Connection`] if the radio cannot be reached.
/// Every later failure is handled inside the session.
pub async fn start<I: InputSource>(
    config: &ConsoleConfig,
    sink: Arc<dyn LineSink>,
    input: I,
) -> Result<SessionReport> {
    let client = Arc::new(client::connect(&config.radio)?);
    tracing::info!(radio = %config.radio, handle = %client.handle(), "connected");
    Ok(Session::new(client, config.clone())
        .run(sink, input, shutdown::ctrl_c())
        .await)
}

/// A console session over an already-constructed client.
#[derive(Debug)]
pub struct Session<C: ?Sized> {
    client: Arc<C>,
    config: ConsoleConfig,
}

impl<C: ProtocolClient + ?Sized> Session<C> {
    /// Creates a session. Nothing runs until [`Session::run`].
    #[must_use]
    pub const fn new(client: Arc<C>, config: ConsoleConfig) -> Self {
        Self { client, config }
    }

    /// Runs the session until the client task, the command loop, both
    /// relays and the interrupt listener have all returned.
    pub async fn run<I, F>(self, sink: Arc<dyn LineSink>, input: I, interrupt: F) -> SessionReport
    where
        I: InputSource,
        F: Future<Output = ()> + Send + 'static,
    {
        let Self { client, config } = self;
        let shutdown = ShutdownCoordinator::new(Arc::clone(&client), Arc::clone(&sink));

        let main = {
            let client = Arc::clone(&client);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                client.run().await;
                shutdown.trigger(ShutdownReason::ClientStopped);
            })
        };

        // Both relays register before any command is sent so no early
        // notice or delta is missed.
        let notices = NotificationRelay::attach(client.as_ref()).await;
        let notices = tokio::spawn(notices.run(Arc::clone(&sink)));

        let updates = match StateUpdateRelay::attach(
            Arc::clone(&client),
            &config.subscription_prefix,
            config.update_capacity,
        )
        .await
        {
            Ok(relay) => {
                tracing::debug!(id = %relay.subscription_id(), "update relay attached");
                Some(tokio::spawn(relay.run(Arc::clone(&sink))))
            }
            Err(e) => {
                tracing::warn!(error = %e, "state updates unavailable");
                None
            }
        };

        let listener = shutdown.on_interrupt(interrupt);

        let command_loop = CommandLoop::new(Arc::clone(&client), input, Arc::clone(&sink), shutdown)
            .with_timeout(config.command_timeout)
            .with_startup_commands(config.startup_commands.clone());
        let command_loop = tokio::spawn(command_loop.run());

        // Process exit waits on every task, relays included, so no line is
        // cut off mid-render.
        let _ = joined("client", main).await;
        let exit = joined("command loop", command_loop).await;
        let notices_rendered = joined("notification relay", notices).await.unwrap_or(0);
        let updates_rendered = match updates {
            Some(task) => joined("state update relay", task).await.unwrap_or(0),
            None => 0,
        };
        let interrupted = joined("interrupt listener", listener)
            .await
            .unwrap_or(false);

        tracing::info!(notices_rendered, updates_rendered, interrupted, "session ended");
        SessionReport {
            commands_sent: exit.as_ref().map_or(0, |e| e.commands_sent),
            notices_rendered,
            updates_rendered,
            interrupted,
            cause: exit.map(|e| e.cause),
        }
    }
}

async fn joined<T>(task: &'static str, handle: JoinHandle<T>) -> Option<T> {
    match handle.await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(task, error = %e, "task failed");
            None
        }
    }
}
