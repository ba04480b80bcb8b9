//! Compare derived metrics against the catalogue's healthy ranges.

use tracing::debug;

use crate::catalog::{BenchmarkBand, MetricCatalog};
use crate::diagnostics::Diagnostics;
use crate::format::format_count;
use crate::metrics::{field_value, BusinessInputs, Derived, DerivedMetrics, MetricField};

/// Assess a computed scenario.
///
/// Emits a `benchmark` warning for every catalogued KPI that falls in its
/// bad band, an `undefined` warning for each ratio with no value, an
/// `input` warning for zero traffic and a `profitability` error when gross
/// profit is negative.
pub fn assess(
    catalog: &MetricCatalog,
    inputs: &BusinessInputs,
    metrics: &DerivedMetrics,
) -> Diagnostics {
    let mut diag = Diagnostics::new();

    if inputs.traffic == 0 {
        diag.add_warning_with_entity("input", "No visits in the period", "traffic");
    }

    for definition in catalog.iter() {
        let Some(benchmark) = &definition.benchmark else {
            continue;
        };
        let value = match field_value(benchmark.kpi, inputs, metrics) {
            Derived::Defined(value) => value,
            // Reported below as undefined
            Derived::Undefined(_) => continue,
        };
        let band = benchmark.classify(value);
        debug!(metric = %definition.id, value, ?band, "benchmark");
        if band == BenchmarkBand::Bad {
            diag.add_warning_with_entity(
                "benchmark",
                &format!(
                    "{} is {} (unhealthy: {})",
                    definition.name,
                    describe(benchmark.kpi, value),
                    definition.bad_range
                ),
                &definition.id,
            );
        }
    }

    for field in metrics.undefined_fields() {
        diag.add_warning_with_entity(
            "undefined",
            &format!("{field} has no value for these inputs (zero denominator)"),
            field.as_str(),
        );
    }

    if metrics.is_loss_making() {
        diag.add_error_with_entity(
            "profitability",
            &format!(
                "Gross profit is negative: {}",
                format_count(metrics.gross_profit.value())
            ),
            MetricField::GrossProfit.as_str(),
        );
    }

    diag
}

fn describe(field: MetricField, value: f64) -> String {
    match field {
        MetricField::ConversionRate
        | MetricField::CogsRate
        | MetricField::ReturnRate
        | MetricField::ProfitMarginPercent => format!("{value:.1}%"),
        MetricField::ReturnOnAdSpend => format!("{value:.2}x"),
        _ => format_count(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::compute;
    use crate::units::{Money, Percent};

    #[test]
    fn healthy_example_has_no_issues() {
        let inputs = BusinessInputs::default();
        let metrics = compute(&inputs).unwrap();
        let diag = assess(MetricCatalog::builtin(), &inputs, &metrics);
        assert!(!diag.has_issues(), "{diag}");
    }

    #[test]
    fn flags_low_conversion_and_roas() {
        let inputs = BusinessInputs {
            conversion_rate: Percent::new(0.5),
            ..BusinessInputs::default()
        };
        let metrics = compute(&inputs).unwrap();
        let diag = assess(MetricCatalog::builtin(), &inputs, &metrics);
        let flagged: Vec<_> = diag
            .issues_by_category("benchmark")
            .filter_map(|i| i.entity.as_deref())
            .collect();
        assert_eq!(flagged, ["conversion", "roas"]);
        // 50 orders: 7.5M revenue against 9.875M of costs
        assert!(diag.has_errors());
    }

    #[test]
    fn reports_undefined_ratios_and_zero_traffic() {
        let inputs = BusinessInputs {
            traffic: 0,
            ad_spend: Money(0.0),
            ..BusinessInputs::default()
        };
        let metrics = compute(&inputs).unwrap();
        let diag = assess(MetricCatalog::builtin(), &inputs, &metrics);
        assert_eq!(diag.issues_by_category("undefined").count(), 3);
        assert_eq!(diag.issues_by_category("input").count(), 1);
        assert!(!diag.has_errors());
    }
}
