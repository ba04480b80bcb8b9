//! Metrics derivation engine.
//!
//! Six independent inputs drive every KPI the course teaches:
//!
//! ```text
//! orders                    = traffic × conversion_rate / 100
//! revenue                   = orders × average_order_value
//! product_cost              = revenue × cogs_rate / 100
//! returns_loss              = revenue × return_rate / 100
//! gross_profit              = revenue − product_cost − ad_spend − returns_loss
//! return_on_ad_spend        = revenue / ad_spend
//! customer_acquisition_cost = ad_spend / orders
//! profit_margin_percent     = gross_profit / revenue × 100
//! ```
//!
//! [`compute`] never rounds. A negative `gross_profit` is a normal result.
//! Ratios with a zero denominator come back as [`Derived::Undefined`] so the
//! caller can render them distinctly while every other field stays usable.

use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use crate::error::MetricsError;
use crate::units::{Money, Percent};

/// Identifies an input parameter or a derived KPI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Traffic,
    ConversionRate,
    AverageOrderValue,
    AdSpend,
    CogsRate,
    ReturnRate,
    Orders,
    Revenue,
    ProductCost,
    ReturnsLoss,
    GrossProfit,
    ReturnOnAdSpend,
    CustomerAcquisitionCost,
    ProfitMarginPercent,
}

impl MetricField {
    /// The six independent business inputs, in declaration order.
    pub const INPUTS: [MetricField; 6] = [
        MetricField::Traffic,
        MetricField::ConversionRate,
        MetricField::AverageOrderValue,
        MetricField::AdSpend,
        MetricField::CogsRate,
        MetricField::ReturnRate,
    ];

    /// Every derived field, in declaration order.
    pub const DERIVED: [MetricField; 8] = [
        MetricField::Orders,
        MetricField::Revenue,
        MetricField::ProductCost,
        MetricField::ReturnsLoss,
        MetricField::GrossProfit,
        MetricField::ReturnOnAdSpend,
        MetricField::CustomerAcquisitionCost,
        MetricField::ProfitMarginPercent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Traffic => "traffic",
            MetricField::ConversionRate => "conversion_rate",
            MetricField::AverageOrderValue => "average_order_value",
            MetricField::AdSpend => "ad_spend",
            MetricField::CogsRate => "cogs_rate",
            MetricField::ReturnRate => "return_rate",
            MetricField::Orders => "orders",
            MetricField::Revenue => "revenue",
            MetricField::ProductCost => "product_cost",
            MetricField::ReturnsLoss => "returns_loss",
            MetricField::GrossProfit => "gross_profit",
            MetricField::ReturnOnAdSpend => "return_on_ad_spend",
            MetricField::CustomerAcquisitionCost => "customer_acquisition_cost",
            MetricField::ProfitMarginPercent => "profit_margin_percent",
        }
    }

    pub fn is_input(&self) -> bool {
        Self::INPUTS.contains(self)
    }
}

impl std::fmt::Display for MetricField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The six parameters a shop owner controls.
///
/// Rates are percentages on the 0-100 scale. The struct is plain data: it
/// may hold out-of-range values, which [`compute`] rejects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BusinessInputs {
    /// Visits per period
    pub traffic: u64,
    /// Share of visits that place an order
    pub conversion_rate: Percent,
    /// Currency amount per order
    pub average_order_value: Money,
    /// Advertising budget for the period
    pub ad_spend: Money,
    /// Cost of goods as a share of revenue
    pub cogs_rate: Percent,
    /// Share of revenue lost to returns
    pub return_rate: Percent,
}

impl Default for BusinessInputs {
    /// The worked example used throughout the course material.
    fn default() -> Self {
        Self {
            traffic: 10_000,
            conversion_rate: Percent::new(2.5),
            average_order_value: Money(150_000.0),
            ad_spend: Money(5_000_000.0),
            cogs_rate: Percent::new(60.0),
            return_rate: Percent::new(5.0),
        }
    }
}

impl BusinessInputs {
    /// Check every field against its domain.
    ///
    /// Fails on the first offending field in declaration order.
    pub fn validate(&self) -> Result<(), MetricsError> {
        check_percent(MetricField::ConversionRate, self.conversion_rate)?;
        if !self.average_order_value.is_finite() || self.average_order_value.value() <= 0.0 {
            return Err(MetricsError::invalid(
                MetricField::AverageOrderValue,
                format!(
                    "must be a positive amount, got {}",
                    self.average_order_value.value()
                ),
            ));
        }
        if !self.ad_spend.is_finite() || self.ad_spend.value() < 0.0 {
            return Err(MetricsError::invalid(
                MetricField::AdSpend,
                format!("must be zero or positive, got {}", self.ad_spend.value()),
            ));
        }
        check_percent(MetricField::CogsRate, self.cogs_rate)?;
        check_percent(MetricField::ReturnRate, self.return_rate)?;
        Ok(())
    }

    /// The raw value of an input field, or `None` for derived fields.
    pub fn get(&self, field: MetricField) -> Option<f64> {
        match field {
            MetricField::Traffic => Some(self.traffic as f64),
            MetricField::ConversionRate => Some(self.conversion_rate.percent()),
            MetricField::AverageOrderValue => Some(self.average_order_value.value()),
            MetricField::AdSpend => Some(self.ad_spend.value()),
            MetricField::CogsRate => Some(self.cogs_rate.percent()),
            MetricField::ReturnRate => Some(self.return_rate.percent()),
            _ => None,
        }
    }

    /// A copy with one input replaced. Traffic is rounded to whole visits.
    /// Derived fields are ignored and return an unchanged copy.
    pub fn with(&self, field: MetricField, value: f64) -> Self {
        let mut next = *self;
        match field {
            MetricField::Traffic => next.traffic = value.max(0.0).round() as u64,
            MetricField::ConversionRate => next.conversion_rate = Percent::new(value),
            MetricField::AverageOrderValue => next.average_order_value = Money(value),
            MetricField::AdSpend => next.ad_spend = Money(value),
            MetricField::CogsRate => next.cogs_rate = Percent::new(value),
            MetricField::ReturnRate => next.return_rate = Percent::new(value),
            _ => {}
        }
        next
    }
}

/// Reject a percentage outside [0, 100]. Never clamps.
pub fn check_percent(field: MetricField, value: Percent) -> Result<(), MetricsError> {
    if value.is_valid() {
        Ok(())
    } else {
        Err(MetricsError::invalid(
            field,
            format!("must lie in [0, 100], got {}", value.percent()),
        ))
    }
}

/// A derived value that may be undefined for the given inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Derived<T> {
    Defined(T),
    /// The field's denominator is zero.
    Undefined(MetricField),
}

impl<T> Derived<T> {
    pub fn is_defined(&self) -> bool {
        matches!(self, Derived::Defined(_))
    }

    pub fn defined(self) -> Option<T> {
        match self {
            Derived::Defined(value) => Some(value),
            Derived::Undefined(_) => None,
        }
    }

    /// Turn an undefined value into [`MetricsError::DivisionUndefined`].
    pub fn into_result(self) -> Result<T, MetricsError> {
        match self {
            Derived::Defined(value) => Ok(value),
            Derived::Undefined(field) => Err(MetricsError::DivisionUndefined(field)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Derived<U> {
        match self {
            Derived::Defined(value) => Derived::Defined(f(value)),
            Derived::Undefined(field) => Derived::Undefined(field),
        }
    }
}

// Undefined values serialize as `null`.
impl<T: Serialize> Serialize for Derived<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Derived::Defined(value) => serializer.serialize_some(value),
            Derived::Undefined(_) => serializer.serialize_none(),
        }
    }
}

/// KPIs derived from [`BusinessInputs`]. Recomputed on every read, never
/// mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// Unrounded; fractional orders are expected.
    pub orders: f64,
    pub revenue: Money,
    pub product_cost: Money,
    pub returns_loss: Money,
    /// May be negative.
    pub gross_profit: Money,
    pub return_on_ad_spend: Derived<f64>,
    pub customer_acquisition_cost: Derived<Money>,
    pub profit_margin_percent: Derived<f64>,
}

impl DerivedMetrics {
    /// Every field with no defined value, in declaration order.
    pub fn undefined_fields(&self) -> Vec<MetricField> {
        let mut fields = Vec::new();
        if let Derived::Undefined(field) = self.return_on_ad_spend {
            fields.push(field);
        }
        if let Derived::Undefined(field) = self.customer_acquisition_cost {
            fields.push(field);
        }
        if let Derived::Undefined(field) = self.profit_margin_percent {
            fields.push(field);
        }
        fields
    }

    /// True when the business loses money over the period.
    pub fn is_loss_making(&self) -> bool {
        self.gross_profit.value() < 0.0
    }

    /// The value of a derived field, or `None` for input fields.
    pub fn get(&self, field: MetricField) -> Option<Derived<f64>> {
        let value = match field {
            MetricField::Orders => Derived::Defined(self.orders),
            MetricField::Revenue => Derived::Defined(self.revenue.value()),
            MetricField::ProductCost => Derived::Defined(self.product_cost.value()),
            MetricField::ReturnsLoss => Derived::Defined(self.returns_loss.value()),
            MetricField::GrossProfit => Derived::Defined(self.gross_profit.value()),
            MetricField::ReturnOnAdSpend => self.return_on_ad_spend,
            MetricField::CustomerAcquisitionCost => self.customer_acquisition_cost.map(Money::value),
            MetricField::ProfitMarginPercent => self.profit_margin_percent,
            _ => return None,
        };
        Some(value)
    }
}

/// Look up any field, input or derived.
pub fn field_value(
    field: MetricField,
    inputs: &BusinessInputs,
    metrics: &DerivedMetrics,
) -> Derived<f64> {
    match inputs.get(field) {
        Some(value) => Derived::Defined(value),
        None => metrics
            .get(field)
            .unwrap_or(Derived::Undefined(field)),
    }
}

/// Derive every KPI from the inputs.
///
/// Fails only with [`MetricsError::InvalidInput`]; zero denominators are
/// reported per field through [`Derived::Undefined`]. Inputs that are valid
/// on their own but push a result past the `f64` range are rejected with
/// the input blamed for the overflow.
pub fn compute(inputs: &BusinessInputs) -> Result<DerivedMetrics, MetricsError> {
    inputs.validate()?;

    let orders = inputs.traffic as f64 * inputs.conversion_rate.as_fraction();
    let revenue = Money(finite(
        (inputs.average_order_value * orders).value(),
        MetricField::AverageOrderValue,
    )?);
    // Both are bounded by revenue once revenue is finite
    let product_cost = revenue * inputs.cogs_rate.as_fraction();
    let returns_loss = revenue * inputs.return_rate.as_fraction();
    let gross_profit = Money(finite(
        (revenue - product_cost - inputs.ad_spend - returns_loss).value(),
        MetricField::AdSpend,
    )?);

    let return_on_ad_spend = if inputs.ad_spend.is_zero() {
        Derived::Undefined(MetricField::ReturnOnAdSpend)
    } else {
        Derived::Defined(finite(revenue / inputs.ad_spend, MetricField::AdSpend)?)
    };
    let customer_acquisition_cost = if inputs.ad_spend.is_zero() || orders == 0.0 {
        Derived::Undefined(MetricField::CustomerAcquisitionCost)
    } else {
        Derived::Defined(Money(finite(
            (inputs.ad_spend / orders).value(),
            MetricField::ConversionRate,
        )?))
    };
    let profit_margin_percent = if revenue.is_zero() {
        Derived::Undefined(MetricField::ProfitMarginPercent)
    } else {
        Derived::Defined(finite(gross_profit / revenue * 100.0, MetricField::AdSpend)?)
    };

    let metrics = DerivedMetrics {
        orders,
        revenue,
        product_cost,
        returns_loss,
        gross_profit,
        return_on_ad_spend,
        customer_acquisition_cost,
        profit_margin_percent,
    };
    debug!(
        orders,
        revenue = revenue.value(),
        gross_profit = gross_profit.value(),
        undefined = metrics.undefined_fields().len(),
        "derived metrics"
    );
    Ok(metrics)
}

/// Pass a derived value through, or blame `culprit` when it overflowed.
fn finite(value: f64, culprit: MetricField) -> Result<f64, MetricsError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricsError::invalid(culprit, "result overflows"))
    }
}

/// Like [`compute`], but any undefined field is an error.
///
/// The first undefined field in declaration order is reported as
/// [`MetricsError::DivisionUndefined`].
pub fn compute_strict(inputs: &BusinessInputs) -> Result<DerivedMetrics, MetricsError> {
    let metrics = compute(inputs)?;
    match metrics.undefined_fields().first() {
        Some(field) => Err(MetricsError::DivisionUndefined(*field)),
        None => Ok(metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn worked_example() {
        let m = compute(&BusinessInputs::default()).unwrap();
        assert!(close(m.orders, 250.0));
        assert!(close(m.revenue.value(), 37_500_000.0));
        assert!(close(m.product_cost.value(), 22_500_000.0));
        assert!(close(m.returns_loss.value(), 1_875_000.0));
        assert!(close(m.gross_profit.value(), 8_125_000.0));
        assert!(close(m.return_on_ad_spend.defined().unwrap(), 7.5));
        assert!(close(
            m.customer_acquisition_cost.defined().unwrap().value(),
            20_000.0
        ));
        let margin = m.profit_margin_percent.defined().unwrap();
        assert!((margin - 21.666_666_666).abs() < 1e-6);
        assert!(m.undefined_fields().is_empty());
    }

    #[test]
    fn zero_ad_spend_leaves_roas_and_cac_undefined() {
        let inputs = BusinessInputs {
            ad_spend: Money(0.0),
            ..BusinessInputs::default()
        };
        let m = compute(&inputs).unwrap();
        assert_eq!(
            m.undefined_fields(),
            vec![
                MetricField::ReturnOnAdSpend,
                MetricField::CustomerAcquisitionCost
            ]
        );
        assert!(m.profit_margin_percent.is_defined());
        assert!(close(m.gross_profit.value(), 13_125_000.0));
    }

    #[test]
    fn zero_orders_leave_cac_and_margin_undefined() {
        let inputs = BusinessInputs {
            conversion_rate: Percent::new(0.0),
            ..BusinessInputs::default()
        };
        let m = compute(&inputs).unwrap();
        assert_eq!(m.orders, 0.0);
        assert_eq!(m.revenue, Money(0.0));
        assert_eq!(m.return_on_ad_spend, Derived::Defined(0.0));
        assert_eq!(
            m.undefined_fields(),
            vec![
                MetricField::CustomerAcquisitionCost,
                MetricField::ProfitMarginPercent
            ]
        );
        // All spend, no sales
        assert_eq!(m.gross_profit, Money(-5_000_000.0));
    }

    #[test]
    fn zero_traffic_is_accepted() {
        let inputs = BusinessInputs {
            traffic: 0,
            ..BusinessInputs::default()
        };
        let m = compute(&inputs).unwrap();
        assert_eq!(m.orders, 0.0);
        assert!(!m.profit_margin_percent.is_defined());
    }

    #[test]
    fn out_of_range_percentages_are_rejected_not_clamped() {
        for (field, inputs) in [
            (
                MetricField::ConversionRate,
                BusinessInputs {
                    conversion_rate: Percent::new(101.0),
                    ..BusinessInputs::default()
                },
            ),
            (
                MetricField::CogsRate,
                BusinessInputs {
                    cogs_rate: Percent::new(-1.0),
                    ..BusinessInputs::default()
                },
            ),
            (
                MetricField::ReturnRate,
                BusinessInputs {
                    return_rate: Percent::new(f64::NAN),
                    ..BusinessInputs::default()
                },
            ),
        ] {
            match compute(&inputs) {
                Err(MetricsError::InvalidInput { field: got, .. }) => assert_eq!(got, field),
                other => panic!("expected InvalidInput for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn money_inputs_are_checked() {
        let zero_aov = BusinessInputs {
            average_order_value: Money(0.0),
            ..BusinessInputs::default()
        };
        assert_eq!(
            compute(&zero_aov).unwrap_err().field(),
            MetricField::AverageOrderValue
        );

        let negative_ads = BusinessInputs {
            ad_spend: Money(-1.0),
            ..BusinessInputs::default()
        };
        assert_eq!(
            compute(&negative_ads).unwrap_err().field(),
            MetricField::AdSpend
        );
    }

    #[test]
    fn overflowing_revenue_is_rejected() {
        let inputs = BusinessInputs {
            traffic: 10,
            conversion_rate: Percent::new(100.0),
            average_order_value: Money(f64::MAX),
            ad_spend: Money(1.0),
            cogs_rate: Percent::new(60.0),
            return_rate: Percent::new(0.0),
        };
        let err = compute(&inputs).unwrap_err();
        assert_eq!(err.field(), MetricField::AverageOrderValue);
        assert!(err.to_string().contains("result overflows"));
    }

    #[test]
    fn overflowing_ratios_are_rejected() {
        let tiny_spend = BusinessInputs {
            traffic: 10_000,
            conversion_rate: Percent::new(100.0),
            average_order_value: Money(1e300),
            ad_spend: Money(1e-10),
            ..BusinessInputs::default()
        };
        assert_eq!(
            compute(&tiny_spend).unwrap_err().field(),
            MetricField::AdSpend
        );

        let tiny_conversion = BusinessInputs {
            traffic: 1,
            conversion_rate: Percent::new(1e-310),
            ..BusinessInputs::default()
        };
        assert_eq!(
            compute(&tiny_conversion).unwrap_err().field(),
            MetricField::ConversionRate
        );
    }

    #[test]
    fn strict_reports_first_undefined_field() {
        let inputs = BusinessInputs {
            ad_spend: Money(0.0),
            ..BusinessInputs::default()
        };
        assert_eq!(
            compute_strict(&inputs).unwrap_err(),
            MetricsError::DivisionUndefined(MetricField::ReturnOnAdSpend)
        );
        assert!(compute_strict(&BusinessInputs::default()).is_ok());
    }

    #[test]
    fn negative_profit_is_a_valid_result() {
        let inputs = BusinessInputs {
            ad_spend: Money(20_000_000.0),
            cogs_rate: Percent::new(80.0),
            ..BusinessInputs::default()
        };
        let m = compute(&inputs).unwrap();
        assert!(m.is_loss_making());
        assert!(m.profit_margin_percent.defined().unwrap() < 0.0);
    }

    #[test]
    fn undefined_serializes_as_null() {
        let inputs = BusinessInputs {
            ad_spend: Money(0.0),
            ..BusinessInputs::default()
        };
        let json = serde_json::to_value(compute(&inputs).unwrap()).unwrap();
        assert!(json["return_on_ad_spend"].is_null());
        assert!(json["customer_acquisition_cost"].is_null());
        assert!(json["profit_margin_percent"].is_number());
    }

    #[test]
    fn field_lookup_covers_inputs_and_kpis() {
        let inputs = BusinessInputs::default();
        let m = compute(&inputs).unwrap();
        assert_eq!(
            field_value(MetricField::ConversionRate, &inputs, &m),
            Derived::Defined(2.5)
        );
        assert!(close(
            field_value(MetricField::Revenue, &inputs, &m)
                .defined()
                .unwrap(),
            37_500_000.0
        ));
        assert_eq!(inputs.with(MetricField::Traffic, 10_100.4).traffic, 10_100);
    }
}
