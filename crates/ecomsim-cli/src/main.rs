use std::io::IsTerminal;
use std::process;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ecomsim_cli::cli::{build_cli_command, Cli, Commands};
use ecomsim_cli::config::{load_config, EcomsimConfig};

mod commands;

fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let level = resolve_level(&cli, config.as_ref().ok());
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {err}");
    }

    let result = config.and_then(|config| run(&cli, &config));
    if let Err(err) = result {
        error!("{err:#}");
        process::exit(1);
    }
}

/// `--log-level` wins over the config file; an unparsable config level
/// falls back to `info`.
fn resolve_level(cli: &Cli, config: Option<&EcomsimConfig>) -> Level {
    if let Some(level) = cli.log_level {
        return level;
    }
    match config {
        Some(config) => Level::from_str(&config.logging.level).unwrap_or(Level::INFO),
        None => Level::INFO,
    }
}

fn run(cli: &Cli, config: &EcomsimConfig) -> Result<()> {
    if Level::from_str(&config.logging.level).is_err() {
        warn!(level = %config.logging.level, "unknown log level in config, using info");
    }
    match &cli.command {
        Some(Commands::Metrics { command }) => commands::metrics::handle(command, config),
        Some(Commands::Catalog { command }) => commands::catalog::handle(command, config),
        Some(Commands::Scenarios { command }) => commands::scenarios::handle(command, config),
        Some(Commands::Completions { shell, out }) => {
            commands::completions::handle(*shell, out.as_deref())
        }
        None => build_cli_command()
            .print_help()
            .context("printing help"),
    }
}
