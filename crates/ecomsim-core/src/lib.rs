//! # ecomsim-core: E-commerce Unit Economics Engine
//!
//! Provides the pure computational core behind EcomSim: the six business
//! inputs an online shop controls, the KPIs derived from them, and the
//! reference material used to teach what those KPIs mean.
//!
//! ## Design Philosophy
//!
//! - **Pure derivation**: [`compute`] is a total, deterministic function of
//!   [`BusinessInputs`]. Nothing is cached and nothing is rounded.
//! - **Explicit undefined values**: ratios whose denominator is zero are
//!   reported as [`Derived::Undefined`] instead of leaking `NaN` or infinity.
//! - **Typed units**: money and percentages are newtypes so a percent can
//!   never be used as a ratio without dividing by 100 first.
//! - **Formatting at the boundary**: rounding for display lives in
//!   [`format`], never inside the engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use ecomsim_core::*;
//!
//! let inputs = BusinessInputs {
//!     traffic: 10_000,
//!     conversion_rate: Percent::new(2.5),
//!     average_order_value: Money::new(150_000.0),
//!     ad_spend: Money::new(5_000_000.0),
//!     cogs_rate: Percent::new(60.0),
//!     return_rate: Percent::new(5.0),
//! };
//!
//! let metrics = compute(&inputs).unwrap();
//! assert!((metrics.revenue.value() - 37_500_000.0).abs() < 1e-6);
//! assert!(metrics.gross_profit.value() > 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`metrics`]: inputs, derived metrics and the derivation engine
//! - [`units`]: `Money` and `Percent` newtypes
//! - [`format`]: display rounding and thousands grouping
//! - [`catalog`]: the built-in metric catalogue
//! - [`benchmarks`]: healthy/unhealthy band checks producing [`Diagnostics`]
//! - [`drivers`]: the input-to-KPI dependency graph and profit sensitivity
//! - [`diagnostics`]: warning/error collection
//! - [`error`]: error types

pub mod benchmarks;
pub mod catalog;
pub mod diagnostics;
pub mod drivers;
pub mod error;
pub mod format;
pub mod metrics;
pub mod units;

pub use benchmarks::assess;
pub use catalog::{Benchmark, BenchmarkBand, MetricCatalog, MetricDefinition, WorkedExample};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use drivers::{DriverGraph, Influence, Sensitivity};
pub use error::{CatalogError, EcomError, EcomResult, MetricsError};
pub use format::{DisplayOptions, FormattedMetrics};
pub use metrics::{compute, compute_strict, BusinessInputs, Derived, DerivedMetrics, MetricField};
pub use units::{Money, Percent};
