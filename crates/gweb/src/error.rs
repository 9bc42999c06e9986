//! CLI error types.

use gweb_config::ConfigError;
use gweb_hmr::HmrError;
use gweb_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Hmr(#[from] HmrError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("notify rejected ({status}): {body}")]
    Notify { status: u16, body: String },

    #[error("unexpected response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to create async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
