//! Browser listener script.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

const CLIENT_SCRIPT: &str = include_str!("../../assets/hmr.js");

const ENDPOINT_PLACEHOLDER: &str = "__HMR_ENDPOINT__";

/// Render the client script for `endpoint`.
pub(crate) fn render(endpoint: &str) -> String {
    // JSON string literal is a valid JS string literal
    let literal = serde_json::Value::from(endpoint).to_string();
    CLIENT_SCRIPT.replace(ENDPOINT_PLACEHOLDER, &literal)
}

/// Handle `GET <endpoint>/client.js`.
pub(crate) async fn script_handler(State(state): State<Arc<AppState>>) -> Response {
    if state.hub.is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    (
        [
            (header::CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        render(&state.hmr_endpoint),
    )
        .into_response()
}
