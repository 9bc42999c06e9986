//! Router construction.
//!
//! Builds the axum router with all routes and middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::ServerConfig;
use crate::hmr;
use crate::middleware::security;
use crate::page;
use crate::state::AppState;
use crate::static_files;

/// Create the application router.
///
/// HMR routes are only mounted when the state carries a hub.
pub(crate) fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let mut router = Router::new().route("/", get(page::page_handler));

    if state.hub.is_some() {
        let endpoint = state.hmr_endpoint.as_str();
        router = router
            .route(endpoint, get(hmr::stream_handler))
            .route(&format!("{endpoint}/notify"), post(hmr::notify_handler))
            .route(&format!("{endpoint}/client.js"), get(hmr::script_handler));
    }

    router
        .merge(static_files::static_router(
            &config.static_dir,
            &config.static_mount,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security::csp_layer())
                .layer(security::content_type_options_layer())
                .layer(security::frame_options_layer()),
        )
        .with_state(state)
}
