pub mod catalog;
pub mod completions;
pub mod metrics;
pub mod scenarios;
