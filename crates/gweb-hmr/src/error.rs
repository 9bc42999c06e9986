//! Error types for the HMR core.

/// Error from HMR listener and client operations.
#[derive(Debug, thiserror::Error)]
pub enum HmrError {
    /// Endpoint is not an absolute `http://` or `https://` URL.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint {
        /// Endpoint as given.
        endpoint: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The listener already holds a live subscription.
    #[error("listener is already connected to {0}")]
    AlreadyConnected(String),

    /// Text is not one of the recognized message kinds.
    #[error("unknown message kind: {0:?}")]
    UnknownMessage(String),

    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Server answered with a non-success status.
    #[error("event stream returned HTTP {0}")]
    Status(u16),

    /// Server answered with something other than an event stream.
    #[error("unexpected content type {0:?}, expected text/event-stream")]
    ContentType(String),

    /// I/O error while reading the stream.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reconnect attempts ran out.
    #[error("event stream lost after {0} reconnect attempts")]
    RetriesExhausted(u32),
}

impl HmrError {
    /// Whether the transport should stop instead of reconnecting.
    ///
    /// Bad endpoints and wrong responses will not fix themselves on retry;
    /// network and read failures might.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Http(_) | Self::Io(_))
    }
}
