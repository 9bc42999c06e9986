//! Application state.
//!
//! Shared state for all request handlers.

use std::path::PathBuf;
use std::time::Duration;

use crate::hmr::HmrHub;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// HMR hub (if enabled).
    pub(crate) hub: Option<HmrHub>,
    /// Path of the HMR event stream.
    pub(crate) hmr_endpoint: String,
    /// Keep-alive comment interval for event streams.
    pub(crate) keep_alive: Option<Duration>,
    /// Directory holding `index.html` for the root page.
    pub(crate) static_dir: PathBuf,
}
