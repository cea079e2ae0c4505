//! In-process [`ProtocolClient`] backed by a [`SimulatedRadio`].
//!
//! All client state lives in an engine owned by the task running
//! [`ProtocolClient::run`]. Callers talk to it over a request channel, so
//! subscriptions, the notice channel and the command serial counter are
//! never shared. Close flips a `watch` flag; the engine observes it, drops
//! every outbound channel and returns.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};

use super::ProtocolClient;
use super::device::SimulatedRadio;
use crate::domain::{
    ClientHandle, CommandResponse, Message, StateUpdate, Subscription, SubscriptionId,
    SubscriptionSet,
};
use crate::error::{ConsoleError, Result};

#[derive(Debug)]
enum Request {
    Command {
        text: String,
        reply: oneshot::Sender<CommandResponse>,
    },
    Subscribe {
        subscription: Subscription,
        reply: oneshot::Sender<SubscriptionId>,
    },
    Unsubscribe(SubscriptionId),
    SetMessages(mpsc::UnboundedSender<Message>),
}

/// Loopback radio client.
#[derive(Debug)]
pub struct LoopbackClient {
    handle: ClientHandle,
    requests: mpsc::UnboundedSender<Request>,
    engine: Mutex<Option<Engine>>,
    closed: watch::Sender<bool>,
}

impl LoopbackClient {
    /// Creates a client for a radio with the default object table.
    #[must_use]
    pub fn new() -> Self {
        Self::with_radio(SimulatedRadio::new(ClientHandle::random()))
    }

    /// Creates a client for the given radio.
    #[must_use]
    pub fn with_radio(radio: SimulatedRadio) -> Self {
        let handle = radio.handle();
        let (requests, inbox) = mpsc::unbounded_channel();
        let (closed, _) = watch::channel(false);
        Self {
            handle,
            requests,
            engine: Mutex::new(Some(Engine {
                inbox,
                radio,
                subscriptions: SubscriptionSet::new(),
                messages: None,
                serial: 0,
            })),
            closed,
        }
    }

    /// Handle the radio assigned to this client.
    #[must_use]
    pub const fn handle(&self) -> ClientHandle {
        self.handle
    }

    /// Returns `true` once [`ProtocolClient::close`] has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    fn take_engine(&self) -> Option<Engine> {
        self.engine
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Default for LoopbackClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProtocolClient for LoopbackClient {
    async fn subscribe(&self, subscription: Subscription) -> Result<SubscriptionId> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::Subscribe {
                subscription,
                reply,
            })
            .map_err(|_| ConsoleError::ClientClosed)?;
        rx.await.map_err(|_| ConsoleError::ClientClosed)
    }

    async fn unsubscribe(&self, id: SubscriptionId) {
        if self.requests.send(Request::Unsubscribe(id)).is_err() {
            tracing::debug!(%id, "unsubscribe after close ignored");
        }
    }

    async fn set_message_channel(&self, sender: mpsc::UnboundedSender<Message>) {
        if self.requests.send(Request::SetMessages(sender)).is_err() {
            tracing::debug!("message channel set after close; dropped");
        }
    }

    async fn send_and_wait(&self, command: &str) -> Result<CommandResponse> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(Request::Command {
                text: command.to_string(),
                reply,
            })
            .map_err(|_| ConsoleError::ClientClosed)?;
        rx.await.map_err(|_| ConsoleError::ClientClosed)
    }

    async fn run(&self) {
        let Some(engine) = self.take_engine() else {
            if !self.is_closed() {
                tracing::warn!(handle = %self.handle, "client is already running");
            }
            return;
        };
        engine.run(self.closed.subscribe()).await;
    }

    fn close(&self) -> bool {
        let first = self.closed.send_if_modified(|closed| {
            if *closed {
                false
            } else {
                *closed = true;
                true
            }
        });
        if first {
            tracing::info!(handle = %self.handle, "closing client");
            // Never started: tear the engine down here so its channels close.
            drop(self.take_engine());
        }
        first
    }
}

/// State owned by the client's main processing task.
#[derive(Debug)]
struct Engine {
    inbox: mpsc::UnboundedReceiver<Request>,
    radio: SimulatedRadio,
    subscriptions: SubscriptionSet,
    messages: Option<mpsc::UnboundedSender<Message>>,
    serial: u32,
}

impl Engine {
    async fn run(mut self, mut closed: watch::Receiver<bool>) {
        tracing::info!(handle = %self.radio.handle(), "client running");
        loop {
            tokio::select! {
                biased;
                () = wait_closed(&mut closed) => break,
                req = self.inbox.recv() => match req {
                    Some(req) => {
                        if !self.handle(req, &mut closed).await {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
        self.subscriptions.clear();
        self.messages = None;
        tracing::info!(handle = %self.radio.handle(), "client stopped");
    }

    /// Returns `false` if the client closed while delivering.
    async fn handle(&mut self, req: Request, closed: &mut watch::Receiver<bool>) -> bool {
        match req {
            Request::Subscribe {
                subscription,
                reply,
            } => {
                let prefix = subscription.filter_prefix.clone();
                let id = self.subscriptions.insert(subscription);
                tracing::debug!(%id, prefix = %prefix, "subscription added");
                let _ = reply.send(id);
            }
            Request::Unsubscribe(id) => {
                if self.subscriptions.remove(id) {
                    tracing::debug!(%id, "subscription removed");
                }
            }
            Request::SetMessages(sender) => self.messages = Some(sender),
            Request::Command { text, reply } => {
                self.serial = self.serial.wrapping_add(1);
                let serial = self.serial;
                tracing::debug!(serial, command = %text, "executing command");

                let exec = self.radio.execute(serial, &text);
                if let Some(notice) = exec.notice
                    && let Some(messages) = &self.messages
                    && messages.send(notice).is_err()
                {
                    tracing::debug!("message receiver gone");
                }
                for upd in exec.updates {
                    if !self.publish(upd, closed).await {
                        return false;
                    }
                }

                match exec.delay {
                    None => {
                        let _ = reply.send(exec.response);
                    }
                    Some(delay) => {
                        let mut closed = closed.clone();
                        let response = exec.response;
                        tokio::spawn(async move {
                            tokio::select! {
                                () = tokio::time::sleep(delay) => {
                                    let _ = reply.send(response);
                                }
                                // Dropping `reply` fails the waiting caller.
                                () = wait_closed(&mut closed) => {}
                            }
                        });
                    }
                }
            }
        }
        true
    }

    /// Delivers `upd` to every matching subscriber, awaiting channel
    /// capacity. Returns `false` if the client closed first.
    async fn publish(&self, upd: StateUpdate, closed: &mut watch::Receiver<bool>) -> bool {
        for sender in self.subscriptions.matching(upd.object()) {
            tokio::select! {
                biased;
                () = wait_closed(closed) => return false,
                sent = sender.send(upd.clone()) => {
                    if sent.is_err() {
                        tracing::debug!(object = upd.object(), "subscriber went away");
                    }
                }
            }
        }
        true
    }
}

async fn wait_closed(closed: &mut watch::Receiver<bool>) {
    let _ = closed.wait_for(|c| *c).await;
}
