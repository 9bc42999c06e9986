//! HTTP trigger for publishing HMR messages.
//!
//! Lets an external change detector (a build script, an editor hook, `gweb
//! notify`) push a message without linking against the server.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gweb_hmr::Message;
use serde::Serialize;

use crate::state::AppState;

/// Response for `POST <endpoint>/notify`.
#[derive(Serialize)]
pub(crate) struct NotifyResponse {
    /// Message that was published.
    message: Message,
    /// Subscribers connected when it was published.
    subscribers: usize,
}

/// Handle `POST <endpoint>/notify` with the message kind as the body.
pub(crate) async fn notify_handler(State(state): State<Arc<AppState>>, body: String) -> Response {
    let Some(ref hub) = state.hub else {
        return StatusCode::NOT_FOUND.into_response();
    };

    match body.trim().parse::<Message>() {
        Ok(message) => {
            let subscribers = hub.publish(message);
            (
                StatusCode::ACCEPTED,
                Json(NotifyResponse {
                    message,
                    subscribers,
                }),
            )
                .into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "Rejected HMR notification");
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
    }
}
