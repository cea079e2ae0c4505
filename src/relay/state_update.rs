//! Relay for per-object state deltas.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::ProtocolClient;
use crate::domain::{StateUpdate, Subscription, SubscriptionId};
use crate::error::Result;
use crate::render::update_line;
use crate::sink::{LineSink, emit};

/// Default capacity of the delta channel.
pub const DEFAULT_UPDATE_CAPACITY: usize = 10;

/// Largest delta channel capacity accepted; larger requests are clamped.
pub const MAX_UPDATE_CAPACITY: usize = 65_536;

/// Holds one subscription and writes an `UPD` line per delta, in arrival
/// order.
///
/// The delta channel is bounded; the client waits for capacity rather than
/// dropping deltas. When the channel closes the relay unsubscribes before
/// returning.
#[derive(Debug)]
pub struct StateUpdateRelay<C: ?Sized> {
    client: Arc<C>,
    id: SubscriptionId,
    rx: mpsc::Receiver<StateUpdate>,
}

impl<C: ProtocolClient + ?Sized> StateUpdateRelay<C> {
    /// Subscribes to objects starting with `prefix` (empty = all).
    ///
    /// `capacity` is clamped to `1..=MAX_UPDATE_CAPACITY`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConsoleError::ClientClosed`] if the client
    /// is already closed.
    pub async fn attach(client: Arc<C>, prefix: &str, capacity: usize) -> Result<Self> {
        let capacity = capacity.clamp(1, MAX_UPDATE_CAPACITY);
        let (tx, rx) = mpsc::channel(capacity);
        let id = client.subscribe(Subscription::new(prefix, tx)).await?;
        tracing::debug!(%id, prefix, capacity, "state update relay subscribed");
        Ok(Self { client, id, rx })
    }

    /// Subscription this relay holds.
    #[must_use]
    pub const fn subscription_id(&self) -> SubscriptionId {
        self.id
    }

    /// Runs until the channel closes. Returns the number of lines written.
    pub async fn run(mut self, sink: Arc<dyn LineSink>) -> usize {
        let mut rendered = 0usize;
        while let Some(upd) = self.rx.recv().await {
            emit(sink.as_ref(), &update_line(&upd));
            rendered = rendered.saturating_add(1);
        }
        self.client.unsubscribe(self.id).await;
        tracing::debug!(id = %self.id, rendered, "update channel closed; relay finished");
        rendered
    }
}
