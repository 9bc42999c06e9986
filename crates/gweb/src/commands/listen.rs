//! `gweb listen` command implementation.
//!
//! A terminal counterpart of the browser script: subscribes to the event
//! stream and runs a command whenever the server says `reload`.

use std::path::PathBuf;
use std::process::Command;

use clap::Args;
use gweb_hmr::{EventSourceClient, Listener, ReloadSink};

use super::resolve_hmr_url;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the listen command.
#[derive(Args)]
pub(crate) struct ListenArgs {
    /// Event stream URL (default: derived from gweb.toml).
    #[arg(short, long, env = "GWEB_HMR_URL")]
    url: Option<String>,

    /// Path to configuration file (default: auto-discover gweb.toml).
    #[arg(short, long, conflicts_with = "url")]
    config: Option<PathBuf>,

    /// Shell command to run on reload (default: print a line).
    #[arg(short, long)]
    exec: Option<String>,

    /// Give up after this many consecutive reconnects (default: never).
    #[arg(long)]
    max_retries: Option<u32>,
}

impl ListenArgs {
    /// Execute the listen command. Blocks until the stream is lost for good.
    ///
    /// # Errors
    ///
    /// Returns an error for a bad endpoint, a non-stream response, or when
    /// reconnect attempts run out.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let url = resolve_hmr_url(self.url, self.config.as_deref())?;

        let output = Output::new();
        output.info(&format!("Listening for HMR messages on {url}"));

        let mut listener = Listener::new(ReloadCommand {
            command: self.exec,
            output,
        });
        EventSourceClient::new()
            .max_retries(self.max_retries)
            .run(&url, &mut listener)?;

        Ok(())
    }
}

/// Reload sink that runs a shell command or prints a line.
struct ReloadCommand {
    command: Option<String>,
    output: Output,
}

impl ReloadSink for ReloadCommand {
    fn reload(&mut self) {
        let Some(command) = &self.command else {
            self.output.highlight("[GWeb HMR] Reload");
            return;
        };

        match shell(command).status() {
            Ok(status) if status.success() => {
                tracing::info!(command, "Reload command finished");
            }
            Ok(status) => {
                self.output
                    .error(&format!("Reload command exited with {status}: {command}"));
            }
            Err(err) => {
                self.output
                    .error(&format!("Failed to run reload command {command}: {err}"));
            }
        }
    }
}

#[cfg(unix)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}
