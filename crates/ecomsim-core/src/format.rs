//! Display formatting for derived metrics.
//!
//! The engine keeps full precision; this module is the boundary where
//! numbers are rounded for people. Currency is rounded to whole units and
//! grouped in thousands, ROAS gets two decimals, margin gets one, and
//! undefined ratios print as a marker.

use serde::{Deserialize, Serialize};

use crate::metrics::{Derived, DerivedMetrics};
use crate::units::Money;

/// How derived metrics are rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayOptions {
    /// Appended to currency amounts, e.g. "som"
    #[serde(default)]
    pub currency_suffix: Option<String>,
    /// Printed in place of an undefined ratio
    #[serde(default = "default_undefined_marker")]
    pub undefined_marker: String,
    /// Decimals for ROAS
    #[serde(default = "default_ratio_decimals")]
    pub ratio_decimals: usize,
    /// Decimals for the profit margin
    #[serde(default = "default_percent_decimals")]
    pub percent_decimals: usize,
}

fn default_undefined_marker() -> String {
    "N/A".to_string()
}

fn default_ratio_decimals() -> usize {
    2
}

fn default_percent_decimals() -> usize {
    1
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            currency_suffix: None,
            undefined_marker: default_undefined_marker(),
            ratio_decimals: default_ratio_decimals(),
            percent_decimals: default_percent_decimals(),
        }
    }
}

/// Group the digits of an integer in thousands: `-1234567` becomes `-1,234,567`.
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Round to the nearest whole number (halves away from zero) and group.
pub fn format_count(value: f64) -> String {
    group_thousands(value.round() as i64)
}

pub fn format_money(amount: Money, opts: &DisplayOptions) -> String {
    let grouped = format_count(amount.value());
    match &opts.currency_suffix {
        Some(suffix) if !suffix.is_empty() => format!("{grouped} {suffix}"),
        _ => grouped,
    }
}

pub fn format_ratio(ratio: Derived<f64>, opts: &DisplayOptions) -> String {
    match ratio {
        Derived::Defined(value) => format!("{:.*}x", opts.ratio_decimals, value),
        Derived::Undefined(_) => opts.undefined_marker.clone(),
    }
}

pub fn format_percent(percent: Derived<f64>, opts: &DisplayOptions) -> String {
    match percent {
        Derived::Defined(value) => format!("{:.*}%", opts.percent_decimals, value),
        Derived::Undefined(_) => opts.undefined_marker.clone(),
    }
}

pub fn format_optional_money(amount: Derived<Money>, opts: &DisplayOptions) -> String {
    match amount {
        Derived::Defined(value) => format_money(value, opts),
        Derived::Undefined(_) => opts.undefined_marker.clone(),
    }
}

/// Derived metrics rendered as display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedMetrics {
    pub orders: String,
    pub revenue: String,
    pub product_cost: String,
    pub returns_loss: String,
    pub gross_profit: String,
    pub return_on_ad_spend: String,
    pub customer_acquisition_cost: String,
    pub profit_margin_percent: String,
}

impl FormattedMetrics {
    pub fn new(metrics: &DerivedMetrics, opts: &DisplayOptions) -> Self {
        Self {
            orders: format_count(metrics.orders),
            revenue: format_money(metrics.revenue, opts),
            product_cost: format_money(metrics.product_cost, opts),
            returns_loss: format_money(metrics.returns_loss, opts),
            gross_profit: format_money(metrics.gross_profit, opts),
            return_on_ad_spend: format_ratio(metrics.return_on_ad_spend, opts),
            customer_acquisition_cost: format_optional_money(
                metrics.customer_acquisition_cost,
                opts,
            ),
            profit_margin_percent: format_percent(metrics.profit_margin_percent, opts),
        }
    }

    /// `(label, value)` rows in display order.
    pub fn rows(&self) -> [(&'static str, &str); 8] {
        [
            ("Orders", self.orders.as_str()),
            ("Revenue", self.revenue.as_str()),
            ("Product cost", self.product_cost.as_str()),
            ("Returns loss", self.returns_loss.as_str()),
            ("Gross profit", self.gross_profit.as_str()),
            ("ROAS", self.return_on_ad_spend.as_str()),
            ("CAC", self.customer_acquisition_cost.as_str()),
            ("Profit margin", self.profit_margin_percent.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{compute, BusinessInputs, MetricField};

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(37_500_000), "37,500,000");
        assert_eq!(group_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn rounds_halves_away_from_zero() {
        assert_eq!(format_count(249.5), "250");
        assert_eq!(format_count(-0.5), "-1");
        assert_eq!(format_count(12.4), "12");
    }

    #[test]
    fn formats_worked_example() {
        let metrics = compute(&BusinessInputs::default()).unwrap();
        let opts = DisplayOptions {
            currency_suffix: Some("som".into()),
            ..DisplayOptions::default()
        };
        let f = FormattedMetrics::new(&metrics, &opts);
        assert_eq!(f.orders, "250");
        assert_eq!(f.revenue, "37,500,000 som");
        assert_eq!(f.gross_profit, "8,125,000 som");
        assert_eq!(f.return_on_ad_spend, "7.50x");
        assert_eq!(f.customer_acquisition_cost, "20,000 som");
        assert_eq!(f.profit_margin_percent, "21.7%");
    }

    #[test]
    fn undefined_uses_marker() {
        let opts = DisplayOptions {
            undefined_marker: "-".into(),
            ..DisplayOptions::default()
        };
        assert_eq!(
            format_ratio(Derived::Undefined(MetricField::ReturnOnAdSpend), &opts),
            "-"
        );
        assert_eq!(
            format_percent(Derived::Undefined(MetricField::ProfitMarginPercent), &opts),
            "-"
        );
    }
}
