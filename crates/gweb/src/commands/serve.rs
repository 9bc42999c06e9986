//! `gweb serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use gweb_config::{CliSettings, Config};
use gweb_server::{run_server, server_config_from_gweb_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover gweb.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Static files directory (overrides config).
    #[arg(short, long)]
    static_dir: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// HMR event stream path (overrides config).
    #[arg(long)]
    hmr_endpoint: Option<String>,

    /// Enable verbose output (request and HMR logs).
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable hot module reload (default: enabled).
    #[arg(long)]
    hmr: Option<bool>,

    /// Disable hot module reload.
    #[arg(long, conflicts_with = "hmr")]
    no_hmr: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let hmr_enabled = self.resolve_hmr_enabled();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            static_dir: self.static_dir,
            hmr_enabled,
            hmr_endpoint: self.hmr_endpoint,
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        output.info(&format!(
            "Starting GWeb dev server on http://{}:{}",
            config.server.host, config.server.port
        ));
        output.info(&format!(
            "Static files: {} -> {}/",
            config.static_resolved.dir.display(),
            config.static_resolved.mount
        ));

        if config.hmr.enabled {
            output.info(&format!("HMR: enabled at {}", config.hmr.endpoint));
            output.info(&format!(
                "HMR client: <script src=\"{}/client.js\"></script>",
                config.hmr.endpoint
            ));
        } else {
            output.info("HMR: disabled");
        }

        let server_config = server_config_from_gweb_config(&config);
        run_server(server_config).await?;

        Ok(())
    }

    /// Resolve `hmr_enabled` from --hmr/--no-hmr flags.
    fn resolve_hmr_enabled(&self) -> Option<bool> {
        self.no_hmr.then_some(false).or(self.hmr)
    }
}
