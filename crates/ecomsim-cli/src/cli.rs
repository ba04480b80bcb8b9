use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::common::OutputFormat;

/// Unit economics calculator and decision scenarios for online shops
#[derive(Parser, Debug)]
#[command(name = "ecomsim", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides the config file)
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file (defaults to <config dir>/ecomsim/config.toml)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive KPIs from business inputs
    Metrics {
        #[command(subcommand)]
        command: MetricsCommands,
    },
    /// Browse the metric catalogue
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Decision scenarios
    Scenarios {
        #[command(subcommand)]
        command: ScenariosCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// The six business inputs. Unset flags fall back to the config file, then
/// to the worked example.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Visits per period
    #[arg(long)]
    pub traffic: Option<u64>,
    /// Share of visits that convert, in percent
    #[arg(long)]
    pub conversion_rate: Option<f64>,
    /// Average order value
    #[arg(long = "aov")]
    pub average_order_value: Option<f64>,
    /// Advertising spend for the period
    #[arg(long)]
    pub ad_spend: Option<f64>,
    /// Cost of goods as a share of revenue, in percent
    #[arg(long)]
    pub cogs_rate: Option<f64>,
    /// Share of revenue lost to returns, in percent
    #[arg(long)]
    pub return_rate: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum MetricsCommands {
    /// Compute derived metrics
    Compute {
        #[command(flatten)]
        inputs: InputArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Check the results against catalogue benchmarks
        #[arg(long)]
        assess: bool,
    },
    /// Show what drives each KPI and how sensitive profit is to each input
    Drivers {
        #[command(flatten)]
        inputs: InputArgs,
        /// Step applied to each input, in percent of its value
        #[arg(long, default_value_t = 10.0)]
        step: f64,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommands {
    /// List catalogue entries
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Show one metric in full
    Show {
        /// Metric id (e.g. roas)
        id: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScenariosCommands {
    /// Validate a scenario spec
    Validate {
        /// Path to the scenario spec (YAML or JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        spec: PathBuf,
    },
    /// List scenarios
    List {
        /// Scenario spec (defaults to the configured or built-in set)
        #[arg(value_hint = ValueHint::FilePath)]
        spec: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Present a scenario and, with --choice, resolve it
    Play {
        /// Scenario spec (defaults to the configured or built-in set)
        #[arg(long, value_hint = ValueHint::FilePath)]
        spec: Option<PathBuf>,
        /// Scenario id (defaults to the first scenario)
        #[arg(long)]
        scenario: Option<String>,
        /// Choice id to act on
        #[arg(long)]
        choice: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
