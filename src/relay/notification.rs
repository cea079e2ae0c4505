//! Relay for free-form radio notices.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::client::ProtocolClient;
use crate::domain::Message;
use crate::render::message_line;
use crate::sink::{LineSink, emit};

/// Drains the notice channel, writing one `MSG` line per notice.
///
/// The channel is unbounded: the client never waits on this relay and no
/// notice is dropped.
#[derive(Debug)]
pub struct NotificationRelay {
    rx: mpsc::UnboundedReceiver<Message>,
}

impl NotificationRelay {
    /// Wraps an existing receiver.
    #[must_use]
    pub const fn new(rx: mpsc::UnboundedReceiver<Message>) -> Self {
        Self { rx }
    }

    /// Installs a fresh notice channel on `client` and returns the relay
    /// draining it.
    pub async fn attach<C: ProtocolClient + ?Sized>(client: &C) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        client.set_message_channel(tx).await;
        Self::new(rx)
    }

    /// Runs until the channel closes. Returns the number of lines written.
    pub async fn run(mut self, sink: Arc<dyn LineSink>) -> usize {
        let mut rendered = 0usize;
        while let Some(msg) = self.rx.recv().await {
            emit(sink.as_ref(), &message_line(&msg));
            rendered = rendered.saturating_add(1);
        }
        tracing::debug!(rendered, "notice channel closed; relay finished");
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[tokio::test]
    async fn renders_each_notice_then_ends_on_close() {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = Arc::new(MemorySink::new());
        let relay = tokio::spawn(NotificationRelay::new(rx).run(Arc::clone(&sink) as Arc<dyn LineSink>));

        assert!(tx.send(Message::new("Slice A created")).is_ok());
        assert!(tx.send(Message::new("Transmit inhibited")).is_ok());
        drop(tx);

        let rendered = relay.await.unwrap_or_default();
        assert_eq!(rendered, 2);
        assert_eq!(
            sink.texts(),
            vec![
                "MSG Slice A created".to_string(),
                "MSG Transmit inhibited".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn closed_channel_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel::<Message>();
        drop(tx);
        let sink = Arc::new(MemorySink::new());
        let rendered = NotificationRelay::new(rx)
            .run(Arc::clone(&sink) as Arc<dyn LineSink>)
            .await;
        assert_eq!(rendered, 0);
        assert!(sink.lines().is_empty());
    }
}
