//! GWeb development server.
//!
//! This crate provides an axum HTTP server serving:
//! - A server-sent-events endpoint (`/__hmr`) pushing hot module reload
//!   messages to connected pages
//! - A trigger endpoint (`/__hmr/notify`) for external change detectors
//! - The browser listener script (`/__hmr/client.js`)
//! - The root page (`/`): `index.html` from the static directory with the
//!   listener script injected
//! - Static files from the configured directory (`/static/`)
//!
//! # Quick Start
//!
//! ```ignore
//! use gweb_hmr::Message;
//! use gweb_server::{HmrHub, ServerConfig, run_server_with_hub};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let hub = HmrHub::new(config.channel_capacity);
//!
//!     // Hand a clone to whatever detects changes
//!     let detector = hub.clone();
//!     std::thread::spawn(move || detector.publish(Message::Reload));
//!
//!     run_server_with_hub(config, Some(hub)).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! change detector ──publish / POST notify──► HmrHub (broadcast)
//!                                               │
//! Browser ──GET /__hmr──► axum ◄────────────────┘ one receiver per stream
//!    ▲                      │
//!    └── data: reload ──────┘
//! ```

mod app;
mod error;
mod hmr;
mod middleware;
mod page;
mod state;
mod static_files;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;

pub use error::ServerError;
pub use hmr::HmrHub;
use state::AppState;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory of static files.
    pub static_dir: PathBuf,
    /// URL prefix for static files.
    pub static_mount: String,
    /// Mount the HMR endpoints.
    pub hmr_enabled: bool,
    /// Path of the HMR event stream.
    pub hmr_endpoint: String,
    /// Keep-alive comment interval in seconds (0 disables).
    pub keep_alive_secs: u64,
    /// Coalescing window for published messages in milliseconds.
    pub debounce_ms: u64,
    /// Messages buffered per subscriber.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            static_dir: PathBuf::from("public"),
            static_mount: "/static".to_owned(),
            hmr_enabled: true,
            hmr_endpoint: "/__hmr".to_owned(),
            keep_alive_secs: 15,
            debounce_ms: 0,
            channel_capacity: 16,
        }
    }
}

impl ServerConfig {
    /// Build the hub described by this configuration, if HMR is enabled.
    #[must_use]
    pub fn hub(&self) -> Option<HmrHub> {
        self.hmr_enabled.then(|| {
            HmrHub::new(self.channel_capacity)
                .with_debounce(Duration::from_millis(self.debounce_ms))
        })
    }
}

/// Build the application router.
///
/// HMR routes are mounted only when `hub` is given.
pub fn create_app(config: &ServerConfig, hub: Option<HmrHub>) -> Router {
    let state = Arc::new(AppState {
        hub,
        hmr_endpoint: config.hmr_endpoint.clone(),
        keep_alive: (config.keep_alive_secs > 0)
            .then(|| Duration::from_secs(config.keep_alive_secs)),
        static_dir: config.static_dir.clone(),
    });
    app::create_router(state, config)
}

/// Run the server with the hub described by `config`.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let hub = config.hub();
    run_server_with_hub(config, hub).await
}

/// Run the server publishing through `hub`.
///
/// Keep a clone of the hub to publish messages while the server runs.
/// Stops on Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve.
pub async fn run_server_with_hub(
    config: ServerConfig,
    hub: Option<HmrHub>,
) -> Result<(), ServerError> {
    let _debounce_task = hub.as_ref().and_then(HmrHub::start);

    let app = create_app(&config, hub);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!(address = %addr, hmr = config.hmr_enabled, "Starting server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from GWeb config.
#[must_use]
pub fn server_config_from_gweb_config(config: &gweb_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        static_dir: config.static_resolved.dir.clone(),
        static_mount: config.static_resolved.mount.clone(),
        hmr_enabled: config.hmr.enabled,
        hmr_endpoint: config.hmr.endpoint.clone(),
        keep_alive_secs: config.hmr.keep_alive_secs,
        debounce_ms: config.hmr.debounce_ms,
        channel_capacity: config.hmr.channel_capacity,
    }
}

#[cfg(test)]
mod test_support {
    use axum::Router;
    use axum::body::Body;
    use axum::http::Request;
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::{HmrHub, ServerConfig, create_app};

    /// App with HMR enabled and keep-alive off.
    pub(crate) fn app_with_hub(hub: HmrHub) -> Router {
        let config = ServerConfig {
            keep_alive_secs: 0,
            ..ServerConfig::default()
        };
        create_app(&config, Some(hub))
    }

    pub(crate) async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub(crate) async fn post(app: Router, uri: &str, body: &str) -> Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::from(body.to_owned()))
                .unwrap(),
        )
        .await
        .unwrap()
    }
}
