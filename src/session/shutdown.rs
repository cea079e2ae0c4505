//! Single idempotent teardown shared by every termination trigger.
//!
//! The interrupt listener, the command loop (on end of input) and the
//! client task (when `run` returns) all call
//! [`ShutdownCoordinator::trigger`]. The first call records its reason in
//! the stopping flag and closes the client; later calls only log.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::client::ProtocolClient;
use crate::render::exit_notice;
use crate::sink::{LineSink, emit};

/// What asked for the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The process received an interrupt.
    Interrupt,
    /// The input source failed or ended.
    InputClosed,
    /// The client's main task returned.
    ClientStopped,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "interrupt",
            Self::InputClosed => "input closed",
            Self::ClientStopped => "client stopped",
        })
    }
}

/// Ties termination triggers to one client close.
#[derive(Debug)]
pub struct ShutdownCoordinator<C: ?Sized> {
    client: Arc<C>,
    sink: Arc<dyn LineSink>,
    stopping: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl<C: ?Sized> Clone for ShutdownCoordinator<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            sink: Arc::clone(&self.sink),
            stopping: Arc::clone(&self.stopping),
        }
    }
}

impl<C: ProtocolClient + ?Sized> ShutdownCoordinator<C> {
    /// Creates a coordinator for `client`. The exit notice goes to `sink`.
    #[must_use]
    pub fn new(client: Arc<C>, sink: Arc<dyn LineSink>) -> Self {
        let (stopping, _) = watch::channel(None);
        Self {
            client,
            sink,
            stopping: Arc::new(stopping),
        }
    }

    /// Starts teardown. Returns `true` only for the call that actually
    /// closed the client.
    pub fn trigger(&self, reason: ShutdownReason) -> bool {
        self.stopping.send_if_modified(|stopping| {
            if stopping.is_some() {
                return false;
            }
            *stopping = Some(reason);
            true
        });
        let closed = self.client.close();
        if closed {
            tracing::info!(%reason, "shutting down");
        } else {
            tracing::debug!(%reason, "shutdown already in progress");
        }
        closed
    }

    /// Returns `true` once any trigger has fired.
    #[must_use]
    pub fn is_stopping(&self) -> bool {
        self.stopping.borrow().is_some()
    }

    /// Reason given by the first trigger, if any has fired.
    #[must_use]
    pub fn reason(&self) -> Option<ShutdownReason> {
        *self.stopping.borrow()
    }

    /// Receiver that observes the stopping flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<ShutdownReason>> {
        self.stopping.subscribe()
    }

    /// Spawns the one-shot interrupt listener.
    ///
    /// When `interrupt` resolves the listener writes the exit notice and
    /// triggers shutdown. If another trigger fires first it returns without
    /// doing either. The task yields `true` if it performed the teardown.
    pub fn on_interrupt<F>(&self, interrupt: F) -> JoinHandle<bool>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let coordinator = self.clone();
        let mut stopping = self.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                () = interrupt => {
                    emit(coordinator.sink.as_ref(), &exit_notice());
                    coordinator.trigger(ShutdownReason::Interrupt)
                }
                () = wait_stopping(&mut stopping) => false,
            }
        })
    }
}

/// Resolves once the stopping flag is set.
pub async fn wait_stopping(stopping: &mut watch::Receiver<Option<ShutdownReason>>) {
    let _ = stopping.wait_for(Option::is_some).await;
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never
/// resolves, leaving the other triggers in charge.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for interrupt");
        std::future::pending::<()>().await;
    }
}
