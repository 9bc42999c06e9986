//! CLI command implementations.

pub(crate) mod listen;
pub(crate) mod notify;
pub(crate) mod serve;

pub(crate) use listen::ListenArgs;
pub(crate) use notify::NotifyArgs;
pub(crate) use serve::ServeArgs;

use std::path::Path;

use gweb_config::Config;

use crate::error::CliError;

/// Resolve the event stream URL: explicit `--url`, else from config.
fn resolve_hmr_url(url: Option<String>, config: Option<&Path>) -> Result<String, CliError> {
    match url {
        Some(url) => Ok(url),
        None => Ok(Config::load(config, None)?.hmr_url()),
    }
}
