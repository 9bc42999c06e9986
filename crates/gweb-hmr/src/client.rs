//! Blocking event stream client.
//!
//! Plays the part a browser's `EventSource` plays for the page script: it
//! owns the HTTP connection, reconnects when the stream drops and feeds every
//! `message` event to a [`Listener`].

use std::io::Read;
use std::time::Duration;

use ureq::Agent;
use ureq::http::header;

use crate::sse::{DEFAULT_EVENT, SseDecoder};
use crate::{HmrError, Listener, ReloadSink};

/// Reconnect delay used until the server sends `retry:`.
pub const DEFAULT_RETRY: Duration = Duration::from_millis(3000);

/// Connect timeout for each attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const READ_BUFFER_SIZE: usize = 4096;

/// Event stream client with `EventSource`-style reconnection.
pub struct EventSourceClient {
    agent: Agent,
    retry: Duration,
    max_retries: Option<u32>,
    decoder: SseDecoder,
}

impl Default for EventSourceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSourceClient {
    /// Create a client that reconnects forever.
    #[must_use]
    pub fn new() -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_connect(Some(CONNECT_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            retry: DEFAULT_RETRY,
            max_retries: None,
            decoder: SseDecoder::new(),
        }
    }

    /// Set the initial reconnect delay.
    #[must_use]
    pub fn retry(mut self, retry: Duration) -> Self {
        self.retry = retry;
        self
    }

    /// Give up after `max_retries` consecutive reconnects (`None` = never).
    #[must_use]
    pub fn max_retries(mut self, max_retries: Option<u32>) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Connect `listener` to `endpoint` and pump messages until the stream
    /// is lost for good.
    ///
    /// The listener is connected exactly once; reconnects happen below it.
    /// A connection that delivered a response resets the retry count.
    ///
    /// # Errors
    ///
    /// Returns the listener's connect error, a fatal protocol error
    /// (bad status or content type), or `HmrError::RetriesExhausted`.
    pub fn run<S: ReloadSink>(
        &mut self,
        endpoint: &str,
        listener: &mut Listener<S>,
    ) -> Result<(), HmrError> {
        let url = listener.connect(endpoint)?.endpoint().to_string();
        let mut attempts = 0u32;

        loop {
            match self.stream_once(&url, listener) {
                Ok(()) => {
                    tracing::info!(url = %url, "HMR stream ended");
                    attempts = 0;
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => tracing::warn!(url = %url, error = %err, "HMR stream failed"),
            }

            if let Some(max) = self.max_retries
                && attempts >= max
            {
                return Err(HmrError::RetriesExhausted(attempts));
            }
            attempts += 1;

            let delay = self.decoder.retry().unwrap_or(self.retry);
            tracing::debug!(attempt = attempts, ?delay, "Reconnecting");
            std::thread::sleep(delay);
        }
    }

    /// One connection: request, validate, read until the body ends.
    fn stream_once<S: ReloadSink>(
        &mut self,
        url: &str,
        listener: &mut Listener<S>,
    ) -> Result<(), HmrError> {
        self.decoder.reset_frame();

        let mut request = self
            .agent
            .get(url)
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache");
        if let Some(id) = self.decoder.last_event_id() {
            request = request.header("Last-Event-ID", id);
        }

        let response = request.call()?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            return Err(HmrError::Status(status));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.starts_with("text/event-stream") {
            return Err(HmrError::ContentType(content_type.to_owned()));
        }

        tracing::debug!(url, "HMR stream open");

        let mut reader = response.into_body().into_reader();
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                return Ok(());
            }
            for event in self.decoder.feed(&buf[..n]) {
                if event.event == DEFAULT_EVENT {
                    listener.on_message(&event.data);
                } else {
                    tracing::debug!(event = %event.event, "Skipping named event");
                }
            }
        }
    }
}
