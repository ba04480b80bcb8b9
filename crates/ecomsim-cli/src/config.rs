//! User configuration for the `ecomsim` binary.
//!
//! Read from `--config` or `<config dir>/ecomsim/config.toml`. A missing
//! default file is not an error; every table and field has a default.

use anyhow::{Context, Result};
use ecomsim_core::{BusinessInputs, DisplayOptions, MetricCatalog, MetricDefinition, Money, Percent};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::InputArgs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EcomsimConfig {
    /// Business inputs used when a flag is not given
    #[serde(default)]
    pub inputs: InputsConfig,
    /// How numbers are rendered in tables
    #[serde(default)]
    pub display: DisplayOptions,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Replacement catalogue and scenario files
    #[serde(default)]
    pub content: ContentConfig,
}

/// Per-field overrides of the worked-example inputs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct InputsConfig {
    #[serde(default)]
    pub traffic: Option<u64>,
    #[serde(default)]
    pub conversion_rate: Option<f64>,
    #[serde(default)]
    pub average_order_value: Option<f64>,
    #[serde(default)]
    pub ad_spend: Option<f64>,
    #[serde(default)]
    pub cogs_rate: Option<f64>,
    #[serde(default)]
    pub return_rate: Option<f64>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ContentConfig {
    /// Metric catalogue (YAML or JSON list of definitions)
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Scenario spec used when no `--spec` is given
    #[serde(default)]
    pub scenarios: Option<PathBuf>,
}

impl EcomsimConfig {
    /// Inputs from flags, falling back to the config, then to the worked example.
    pub fn resolve_inputs(&self, args: &InputArgs) -> BusinessInputs {
        let base = BusinessInputs::default();
        let cfg = &self.inputs;
        BusinessInputs {
            traffic: args.traffic.or(cfg.traffic).unwrap_or(base.traffic),
            conversion_rate: args
                .conversion_rate
                .or(cfg.conversion_rate)
                .map(Percent::new)
                .unwrap_or(base.conversion_rate),
            average_order_value: args
                .average_order_value
                .or(cfg.average_order_value)
                .map(Money::new)
                .unwrap_or(base.average_order_value),
            ad_spend: args
                .ad_spend
                .or(cfg.ad_spend)
                .map(Money::new)
                .unwrap_or(base.ad_spend),
            cogs_rate: args
                .cogs_rate
                .or(cfg.cogs_rate)
                .map(Percent::new)
                .unwrap_or(base.cogs_rate),
            return_rate: args
                .return_rate
                .or(cfg.return_rate)
                .map(Percent::new)
                .unwrap_or(base.return_rate),
        }
    }

    /// The configured catalogue, or the built-in one.
    pub fn catalog(&self) -> Result<MetricCatalog> {
        match &self.content.catalog {
            Some(path) => load_catalog(path),
            None => Ok(MetricCatalog::builtin().clone()),
        }
    }
}

/// Default location: `<config dir>/ecomsim/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ecomsim").join("config.toml"))
}

/// Load configuration from an explicit path, or from the default location
/// when it exists.
pub fn load_config(path: Option<&Path>) -> Result<EcomsimConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(EcomsimConfig::default()),
        },
    };
    let content = fs::read_to_string(&path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    let config: EcomsimConfig = toml::from_str(&content)
        .with_context(|| format!("parsing config '{}'", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load a catalogue of metric definitions from YAML or JSON.
pub fn load_catalog(path: &Path) -> Result<MetricCatalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading metric catalogue '{}'", path.display()))?;
    let definitions: Vec<MetricDefinition> = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content).context("parsing metric catalogue json")?,
        _ => serde_yaml::from_str(&content).context("parsing metric catalogue yaml")?,
    };
    Ok(MetricCatalog::from_definitions(definitions)?)
}
