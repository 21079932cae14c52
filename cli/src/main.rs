//! pvw - view and terminate processes with open network ports
//!
//! Lists the sockets reported by `lsof`, grouped by process, either as an
//! interactive table or as plain text/JSON for scripts.

mod commands;
mod settings;
mod tui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use pvw_core::{Config, ConfigStore, LsofCapture, SystemSession};
use tracing::Level;
use tracing_subscriber::{prelude::*, EnvFilter};

use settings::ViewArgs;

#[derive(Parser)]
#[command(name = "pvw")]
#[command(author, version, about = "View and terminate processes with open network ports")]
struct Cli {
    #[command(flatten)]
    view: ViewArgs,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Disable interactive TUI mode
    #[arg(long)]
    no_tui: bool,

    /// Write the effective options to the config file and exit
    #[arg(long)]
    save_config: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/pvw.log")]
    log_file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cfg!(not(unix)) {
        bail!("pvw is UNIX only right now");
    }

    // Log to a file, stdout belongs to the table
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let log_file = File::create(&cli.log_file)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(false),
        )
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    tracing::info!("Starting pvw");

    let store = ConfigStore::new()?;
    let config = store.load().await?;
    let view = cli.view.resolve(&config);

    if cli.save_config {
        store
            .save(&Config::from_settings(&view.settings, view.read_only))
            .await?;
        println!("Saved configuration to {}", store.path().display());
        return Ok(());
    }

    if !LsofCapture::new().is_available().await {
        bail!("lsof command does not exist. Please install lsof with your package manager.");
    }

    let session = Arc::new(SystemSession::system(view.settings));

    if cli.no_tui || cli.json || !atty::is(atty::Stream::Stdout) {
        commands::list::run(&session, cli.json).await?;
    } else {
        tui::run(session, view.read_only).await?;
    }

    tracing::info!("Goodbye!");
    Ok(())
}
