//! Protocol client seam.
//!
//! The console never speaks a wire protocol itself. Everything it needs
//! from a radio goes through [`ProtocolClient`]: subscriptions for state
//! deltas, a notice channel, synchronous command exchange, the client's
//! main processing loop, and an idempotent close that unwinds all of them.
//!
//! [`LoopbackClient`] is the bundled implementation: an in-process
//! simulated radio reachable through [`connect`].

pub mod device;
pub mod loopback;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{CommandResponse, Message, RadioAddress, Subscription, SubscriptionId};
use crate::error::{ConsoleError, Result};

pub use loopback::LoopbackClient;

/// Name under which the loopback radio answers discovery.
pub const LOOPBACK_NAME: &str = "loopback";

/// Operations the console consumes from a radio client.
///
/// Implementations must make [`close`](Self::close) idempotent and safe to
/// call concurrently. After close, the message channel and every
/// subscription channel are dropped, [`run`](Self::run) returns, and any
/// outstanding [`send_and_wait`](Self::send_and_wait) fails with
/// [`ConsoleError::ClientClosed`].
#[async_trait]
pub trait ProtocolClient: Send + Sync + 'static {
    /// Registers a subscription for state deltas.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::ClientClosed`] if the client is closed.
    async fn subscribe(&self, subscription: Subscription) -> Result<SubscriptionId>;

    /// Removes a subscription. Unknown ids and closed clients are ignored.
    async fn unsubscribe(&self, id: SubscriptionId);

    /// Installs the channel notices are delivered on, replacing any
    /// previous one.
    async fn set_message_channel(&self, sender: mpsc::UnboundedSender<Message>);

    /// Sends one command and waits for its correlated response.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::ClientClosed`] if the client closes before
    /// the response arrives.
    async fn send_and_wait(&self, command: &str) -> Result<CommandResponse>;

    /// Runs the client's main processing loop until [`close`](Self::close).
    async fn run(&self);

    /// Tears the client down. Returns `true` only for the call that
    /// performed the teardown.
    fn close(&self) -> bool;
}

/// Resolves `address` to a client.
///
/// Discovery finds the loopback radio; the only named radio is
/// [`LOOPBACK_NAME`].
///
/// # Errors
///
/// Returns [`ConsoleError::Connection`] for any other address.
pub fn connect(address: &RadioAddress) -> Result<LoopbackClient> {
    match address {
        RadioAddress::Discover => {
            tracing::info!(radio = LOOPBACK_NAME, "discovered radio");
            Ok(LoopbackClient::new())
        }
        RadioAddress::Named(name) if name.eq_ignore_ascii_case(LOOPBACK_NAME) => {
            Ok(LoopbackClient::new())
        }
        RadioAddress::Named(name) => Err(ConsoleError::Connection {
            address: name.clone(),
            reason: format!("no transport available; only {LOOPBACK_NAME:?} is reachable"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn discover_finds_loopback() {
        assert!(connect(&RadioAddress::Discover).is_ok());
    }

    #[test]
    fn loopback_by_name() {
        assert!(connect(&RadioAddress::Named("LOOPBACK".to_string())).is_ok());
    }

    #[test]
    fn unknown_radio_is_connection_error() {
        let Err(err) = connect(&RadioAddress::Named("10.0.0.7".to_string())) else {
            panic!("expected connection failure");
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("10.0.0.7"));
    }
}
