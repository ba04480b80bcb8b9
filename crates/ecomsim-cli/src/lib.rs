pub mod cli;
pub mod common;
pub mod config;

pub use cli::{
    build_cli_command, CatalogCommands, Cli, Commands, InputArgs, MetricsCommands,
    ScenariosCommands,
};
