//! Client listener state machine.
//!
//! A listener starts `Disconnected`, moves to `Connected` on the first
//! successful [`Listener::connect`] and stays there until it is dropped.
//! The subscription it holds is the only live channel for that listener.

use ureq::http::Uri;

use crate::{Action, DispatchTable, HmrError, Message};

/// Receiver of the side effects a listener dispatches.
pub trait ReloadSink {
    /// Discard client state and reload.
    fn reload(&mut self);

    /// Apply a partial update. Nothing is patched unless a sink says how.
    fn patch(&mut self, message: Message) {
        tracing::debug!(%message, "No patch handler, ignoring");
    }
}

impl<F: FnMut()> ReloadSink for F {
    fn reload(&mut self) {
        self();
    }
}

/// Connection state of a [`Listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerState {
    Disconnected,
    Connected,
}

/// A live subscription to an event stream endpoint.
///
/// Owned by the listener; released when the listener is dropped.
#[derive(Debug)]
pub struct Subscription {
    endpoint: Uri,
}

impl Subscription {
    #[must_use]
    pub fn endpoint(&self) -> &Uri {
        &self.endpoint
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        tracing::debug!(endpoint = %self.endpoint, "HMR subscription released");
    }
}

/// Reacts to HMR messages received on one endpoint.
pub struct Listener<S> {
    sink: S,
    table: DispatchTable,
    subscription: Option<Subscription>,
}

impl<S: ReloadSink> Listener<S> {
    /// Create a disconnected listener with the default dispatch table.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            table: DispatchTable::default(),
            subscription: None,
        }
    }

    /// Replace the dispatch table.
    #[must_use]
    pub fn with_dispatch_table(mut self, table: DispatchTable) -> Self {
        self.table = table;
        self
    }

    pub fn state(&self) -> ListenerState {
        if self.subscription.is_some() {
            ListenerState::Connected
        } else {
            ListenerState::Disconnected
        }
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Open the subscription to `endpoint`.
    ///
    /// Only checks that the endpoint is an absolute `http(s)` URL. Succeeds
    /// once per listener.
    ///
    /// # Errors
    ///
    /// Returns `HmrError::AlreadyConnected` on a second call and
    /// `HmrError::InvalidEndpoint` for a malformed address.
    pub fn connect(&mut self, endpoint: &str) -> Result<&Subscription, HmrError> {
        if let Some(existing) = &self.subscription {
            return Err(HmrError::AlreadyConnected(existing.endpoint.to_string()));
        }

        let endpoint = parse_endpoint(endpoint)?;
        tracing::info!(%endpoint, "HMR listener connected");

        let subscription: &Subscription = self.subscription.insert(Subscription { endpoint });
        Ok(subscription)
    }

    /// Handle one inbound payload and return the action taken.
    ///
    /// Payloads arriving before `connect` are dropped.
    pub fn on_message(&mut self, payload: &str) -> Action {
        if self.subscription.is_none() {
            tracing::debug!(payload, "Dropping message received while disconnected");
            return Action::Ignore;
        }

        let message = Message::from_payload(payload);
        let action = self.table.action_for(message);

        match action {
            Action::Reload => {
                tracing::info!("[GWeb HMR] Reloading page...");
                self.sink.reload();
            }
            Action::Patch => self.sink.patch(message),
            Action::Ignore => tracing::debug!(payload, %message, "Ignoring HMR message"),
        }

        action
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Uri, HmrError> {
    let invalid = |reason: &str| HmrError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason: reason.to_owned(),
    };

    let uri: Uri = endpoint.parse().map_err(|e| invalid(&format!("{e}")))?;

    match uri.scheme_str() {
        Some("http" | "https") => {}
        Some(other) => return Err(invalid(&format!("unsupported scheme {other}"))),
        None => return Err(invalid("expected an absolute URL")),
    }
    if uri.host().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(uri)
}
