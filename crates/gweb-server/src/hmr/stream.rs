//! Server-sent-events handler for HMR.
//!
//! Each connection gets its own receiver on the hub and sees every message
//! published while it is open.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::Stream;
use gweb_hmr::Message;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::state::AppState;

/// Handle `GET <endpoint>`.
pub(crate) async fn stream_handler(State(state): State<Arc<AppState>>) -> Response {
    let Some(ref hub) = state.hub else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let subscriber = Subscriber {
        receiver: hub.subscribe(),
    };
    tracing::info!(subscribers = hub.subscriber_count(), "HMR client connected");

    let sse = Sse::new(message_stream(subscriber));
    match state.keep_alive {
        Some(interval) => sse
            .keep_alive(KeepAlive::new().interval(interval))
            .into_response(),
        None => sse.into_response(),
    }
}

/// Receiver half of one connection; logs when the client goes away.
struct Subscriber {
    receiver: broadcast::Receiver<Message>,
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        tracing::info!("HMR client disconnected");
    }
}

/// Turn the subscriber into an event stream. Lagging clients skip what
/// they missed instead of being dropped.
fn message_stream(subscriber: Subscriber) -> impl Stream<Item = Result<Event, Infallible>> {
    futures::stream::unfold(subscriber, |mut subscriber| async move {
        loop {
            match subscriber.receiver.recv().await {
                Ok(message) => {
                    let event = Event::default().data(message.as_str());
                    return Some((Ok(event), subscriber));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "HMR client lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}
