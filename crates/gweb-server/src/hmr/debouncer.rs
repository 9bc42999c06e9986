//! Message coalescing for HMR publishing.
//!
//! Change detectors tend to fire in bursts (an editor save touches several
//! files). The debouncer folds a burst into one message that is released
//! once no new message has arrived for the debounce window.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use gweb_hmr::Message;

/// Message waiting to be released.
struct PendingMessage {
    message: Message,
    deadline: Instant,
}

/// Thread-safe single-slot message debouncer.
pub(crate) struct MessageDebouncer {
    pending: Mutex<Option<PendingMessage>>,
    debounce_duration: Duration,
}

impl MessageDebouncer {
    pub(crate) fn new(debounce_duration: Duration) -> Self {
        Self {
            pending: Mutex::new(None),
            debounce_duration,
        }
    }

    /// Record a published message, pushing the release deadline out.
    pub(crate) fn record(&self, message: Message) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let deadline = Instant::now() + self.debounce_duration;

        let message = match pending.as_ref() {
            Some(existing) => Self::coalesce(existing.message, message),
            None => message,
        };
        *pending = Some(PendingMessage { message, deadline });
    }

    /// Coalesce two message kinds.
    ///
    /// `Reload` absorbs everything, `Error` absorbs `Noop`.
    fn coalesce(existing: Message, new: Message) -> Message {
        fn rank(message: Message) -> u8 {
            match message {
                Message::Noop => 0,
                Message::Error => 1,
                Message::Reload => 2,
            }
        }

        if rank(new) >= rank(existing) {
            new
        } else {
            existing
        }
    }

    /// Take the pending message if its deadline has passed.
    pub(crate) fn drain_ready(&self) -> Option<Message> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        if pending.as_ref().is_some_and(|p| p.deadline <= now) {
            pending.take().map(|p| p.message)
        } else {
            None
        }
    }

    /// Deadline of the pending message, if any.
    #[cfg(test)]
    fn next_deadline(&self) -> Option<Instant> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.as_ref().map(|p| p.deadline)
    }
}
