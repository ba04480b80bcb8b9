use std::path::Path;

use anyhow::Result;
use ecomsim_scenarios::{builtin_scenario_set, load_spec_from_path, ScenarioSet};

use ecomsim_cli::cli::ScenariosCommands;
use ecomsim_cli::config::EcomsimConfig;

pub mod list;
pub mod play;
pub mod validate;

pub fn handle(command: &ScenariosCommands, config: &EcomsimConfig) -> Result<()> {
    match command {
        ScenariosCommands::Validate { spec } => validate::handle(spec),
        ScenariosCommands::List { spec, format } => {
            list::handle(&load_set(spec.as_deref(), config)?, *format)
        }
        ScenariosCommands::Play {
            spec,
            scenario,
            choice,
            format,
        } => play::handle(
            &load_set(spec.as_deref(), config)?,
            scenario.as_deref(),
            choice.as_deref(),
            *format,
        ),
    }
}

/// An explicit spec, else the configured one, else the built-in set.
fn load_set(spec: Option<&Path>, config: &EcomsimConfig) -> Result<ScenarioSet> {
    match spec.or(config.content.scenarios.as_deref()) {
        Some(path) => load_spec_from_path(path),
        None => builtin_scenario_set(),
    }
}
