//! `gweb notify` command implementation.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use gweb_hmr::Message;
use serde::Deserialize;
use ureq::Agent;

use super::resolve_hmr_url;
use crate::error::CliError;
use crate::output::Output;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Arguments for the notify command.
#[derive(Args)]
pub(crate) struct NotifyArgs {
    /// Message to publish: reload, noop or error.
    #[arg(default_value = "reload")]
    message: Message,

    /// Event stream URL (default: derived from gweb.toml).
    #[arg(short, long, env = "GWEB_HMR_URL")]
    url: Option<String>,

    /// Path to configuration file (default: auto-discover gweb.toml).
    #[arg(short, long, conflicts_with = "url")]
    config: Option<PathBuf>,
}

/// Body of a successful notify response.
#[derive(Debug, Deserialize)]
struct NotifyReply {
    message: Message,
    subscribers: usize,
}

impl NotifyArgs {
    /// Execute the notify command.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or rejects the message.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let url = notify_url(&resolve_hmr_url(self.url, self.config.as_deref())?);

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(NOTIFY_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .into();

        tracing::debug!(url = %url, message = %self.message, "Publishing HMR message");
        let response = agent.post(&url).send(self.message.as_str())?;

        let status = response.status().as_u16();
        let body = response.into_body().read_to_string()?;
        if status != 202 {
            return Err(CliError::Notify { status, body });
        }

        let reply: NotifyReply = serde_json::from_str(&body)?;
        output.success(&format!(
            "Published {} to {} subscriber(s)",
            reply.message, reply.subscribers
        ));

        Ok(())
    }
}

/// Trigger URL for an event stream URL.
fn notify_url(stream_url: &str) -> String {
    format!("{}/notify", stream_url.trim_end_matches('/'))
}
