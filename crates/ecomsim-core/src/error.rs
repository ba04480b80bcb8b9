//! Error types for the EcomSim engine
//!
//! [`MetricsError`] and [`CatalogError`] are the typed errors raised by the
//! derivation engine and the metric catalogue. [`EcomError`] gathers them,
//! together with definition validation failures, into one type for callers
//! that want uniform handling at an API boundary.
//!
//! # Example
//!
//! ```ignore
//! use ecomsim_core::{EcomResult, compute};
//!
//! fn report(inputs: &BusinessInputs) -> EcomResult<()> {
//!     let metrics = compute(inputs)?;
//!     println!("{}", metrics.revenue);
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::metrics::MetricField;

/// Errors raised by [`crate::compute`] and [`crate::compute_strict`].
///
/// Every variant is a deterministic function of the inputs, so retrying
/// with the same inputs can never succeed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// The caller passed an out-of-domain value. Surfaced before any
    /// computation happens; values are never clamped.
    #[error("invalid input for {field}: {reason}")]
    InvalidInput { field: MetricField, reason: String },

    /// A derived field has no value because its denominator is zero.
    #[error("{0} is undefined for these inputs (division by zero)")]
    DivisionUndefined(MetricField),
}

impl MetricsError {
    pub(crate) fn invalid(field: MetricField, reason: impl Into<String>) -> Self {
        MetricsError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// The field the error refers to.
    pub fn field(&self) -> MetricField {
        match self {
            MetricsError::InvalidInput { field, .. } => *field,
            MetricsError::DivisionUndefined(field) => *field,
        }
    }
}

/// Errors raised when querying the metric catalogue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown metric '{0}'")]
    UnknownMetric(String),
}

/// Unified error type for EcomSim operations.
#[derive(Error, Debug)]
pub enum EcomError {
    /// Definition or configuration validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Derivation engine errors
    #[error(transparent)]
    Metrics(#[from] MetricsError),

    /// Catalogue lookup errors
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Convenience type alias for Results using EcomError.
pub type EcomResult<T> = Result<T, EcomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_error_messages_name_the_field() {
        let err = MetricsError::DivisionUndefined(MetricField::ReturnOnAdSpend);
        assert_eq!(
            err.to_string(),
            "return_on_ad_spend is undefined for these inputs (division by zero)"
        );

        let err = MetricsError::invalid(MetricField::CogsRate, "must lie in [0, 100], got 120");
        assert!(err.to_string().contains("cogs_rate"));
        assert_eq!(err.field(), MetricField::CogsRate);
    }

    #[test]
    fn ecom_error_wraps_typed_errors() {
        let err: EcomError = CatalogError::UnknownMetric("ltv".into()).into();
        assert_eq!(err.to_string(), "unknown metric 'ltv'");

        let err: EcomError = MetricsError::DivisionUndefined(MetricField::Orders).into();
        assert!(matches!(err, EcomError::Metrics(_)));
    }
}
