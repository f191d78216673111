//! pa-raw
//!
//! Record raw float samples from the default input, play them back, or run a
//! continuous record/play loop to check the audio path.

use anyhow::{Context, Result};
use clap::Parser;

use pa_raw::{
    audio::PulseServer,
    cli::{self, Cli, Command},
    config::AppConfig,
    workflow::StopSignal,
};

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    let server = match &cli.stream.server {
        Some(address) => PulseServer::with_server(address.clone()),
        None => PulseServer::new(),
    };

    let stop = StopSignal::new();
    if matches!(cli.command, Command::Check { .. }) {
        let handle = stop.clone();
        ctrlc::set_handler(move || {
            tracing::info!("Interrupted, finishing current pass");
            handle.stop();
        })
        .context("Failed to install Ctrl-C handler")?;
    }

    let action = match &cli.command {
        Command::Record { .. } => "record",
        Command::Play { .. } => "play",
        Command::Check { .. } => "check",
    };
    cli::run(&cli, &config, &server, &stop).with_context(|| format!("{} failed", action))
}
