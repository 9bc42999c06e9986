//! HMR notification hub.
//!
//! Fans published messages out to every connected event stream.

use std::sync::Arc;
use std::time::Duration;

use gweb_hmr::Message;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::debouncer::MessageDebouncer;

/// How often the debounce task checks for a releasable message.
const DRAIN_INTERVAL: Duration = Duration::from_millis(20);

/// Broadcasts HMR messages to subscribed event streams.
///
/// Cheap to clone; clones publish into the same channel. Hand one to the
/// change detector and give another to the server.
#[derive(Clone)]
pub struct HmrHub {
    broadcaster: broadcast::Sender<Message>,
    debouncer: Option<Arc<MessageDebouncer>>,
}

impl HmrHub {
    /// Create a hub buffering up to `capacity` messages per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (broadcaster, _rx) = broadcast::channel(capacity);
        Self {
            broadcaster,
            debouncer: None,
        }
    }

    /// Coalesce bursts of messages published within `window`.
    ///
    /// A zero window publishes immediately. Coalesced messages are only
    /// released once [`HmrHub::start`] has been called.
    #[must_use]
    pub fn with_debounce(mut self, window: Duration) -> Self {
        self.debouncer = (!window.is_zero()).then(|| Arc::new(MessageDebouncer::new(window)));
        self
    }

    /// Spawn the task that releases coalesced messages.
    ///
    /// Returns `None` when debouncing is off. Must be called from within a
    /// tokio runtime.
    pub fn start(&self) -> Option<JoinHandle<()>> {
        let debouncer = Arc::clone(self.debouncer.as_ref()?);
        let broadcaster = self.broadcaster.clone();

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(DRAIN_INTERVAL);
            loop {
                interval.tick().await;
                if let Some(message) = debouncer.drain_ready() {
                    Self::broadcast(&broadcaster, message);
                }
            }
        }))
    }

    /// Publish a message to all current subscribers.
    ///
    /// Returns the number of subscribers at the time of the call. Messages
    /// published with no subscribers are dropped.
    pub fn publish(&self, message: Message) -> usize {
        match &self.debouncer {
            Some(debouncer) => {
                debouncer.record(message);
                tracing::debug!(%message, "HMR message queued");
                self.subscriber_count()
            }
            None => Self::broadcast(&self.broadcaster, message),
        }
    }

    /// Get a receiver for published messages.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.broadcaster.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.receiver_count()
    }

    fn broadcast(broadcaster: &broadcast::Sender<Message>, message: Message) -> usize {
        // Err only means nobody is listening
        let delivered = broadcaster.send(message).unwrap_or(0);
        tracing::info!(%message, subscribers = delivered, "HMR message published");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let hub = HmrHub::new(4);
        assert_eq!(hub.publish(Message::Reload), 0);
    }

    #[tokio::test]
    async fn test_publish_fans_out() {
        let hub = HmrHub::new(4);
        let mut first = hub.subscribe();
        let mut second = hub.subscribe();

        assert_eq!(hub.publish(Message::Reload), 2);

        assert_eq!(first.recv().await.unwrap(), Message::Reload);
        assert_eq!(second.recv().await.unwrap(), Message::Reload);
    }

    #[tokio::test]
    async fn test_subscriber_count_tracks_drops() {
        let hub = HmrHub::new(4);
        let rx = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);
        drop(rx);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_channel() {
        let hub = HmrHub::new(4);
        let mut rx = hub.subscribe();

        hub.clone().publish(Message::Error);

        assert_eq!(rx.recv().await.unwrap(), Message::Error);
    }

    #[tokio::test]
    async fn test_zero_window_disables_debounce() {
        let hub = HmrHub::new(4).with_debounce(Duration::ZERO);
        assert!(hub.start().is_none());
    }

    #[tokio::test]
    async fn test_debounced_burst_delivers_once() {
        let hub = HmrHub::new(4).with_debounce(Duration::from_millis(30));
        let task = hub.start().unwrap();
        let mut rx = hub.subscribe();

        hub.publish(Message::Noop);
        hub.publish(Message::Reload);
        hub.publish(Message::Noop);

        let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message, Message::Reload);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());

        task.abort();
    }
}
