//! GWeb CLI - Development server with hot module reload.
//!
//! Provides commands for:
//! - `serve`: Start the development server
//! - `notify`: Publish an HMR message to a running server
//! - `listen`: Follow the HMR stream and run a command on reload

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ListenArgs, NotifyArgs, ServeArgs};
use error::CliError;
use output::Output;

/// GWeb - Development server with hot module reload.
#[derive(Parser)]
#[command(name = "gweb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the development server.
    Serve(ServeArgs),
    /// Publish a message to connected pages.
    Notify(NotifyArgs),
    /// Listen for messages and react to reloads.
    Listen(ListenArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve(args) => tokio::runtime::Runtime::new()
            .map_err(CliError::Runtime)
            .and_then(|rt| rt.block_on(args.execute())),
        Commands::Notify(args) => args.execute(),
        Commands::Listen(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
