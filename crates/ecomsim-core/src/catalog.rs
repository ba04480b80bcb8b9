//! The metric catalogue: what each KPI means, how it is calculated, and
//! which values are healthy.
//!
//! Entries are immutable configuration records keyed by id. The built-in
//! catalogue is assembled once on first use; callers may also build their
//! own from deserialized definitions with [`MetricCatalog::from_definitions`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{CatalogError, EcomError, EcomResult};
use crate::metrics::MetricField;

/// A worked example shown alongside the formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedExample {
    pub scenario: String,
    pub calculation: String,
    pub result: String,
}

/// Machine-checkable healthy/unhealthy band for one KPI.
///
/// A value is [`BenchmarkBand::Bad`] below `bad_below` or above `bad_above`,
/// [`BenchmarkBand::Good`] inside `[good_min, good_max]`, and
/// [`BenchmarkBand::Watch`] otherwise. Missing bounds are open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub kpi: MetricField,
    #[serde(default)]
    pub good_min: Option<f64>,
    #[serde(default)]
    pub good_max: Option<f64>,
    #[serde(default)]
    pub bad_below: Option<f64>,
    #[serde(default)]
    pub bad_above: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BenchmarkBand {
    Good,
    Watch,
    Bad,
}

impl Benchmark {
    pub fn classify(&self, value: f64) -> BenchmarkBand {
        let too_low = self.bad_below.is_some_and(|limit| value < limit);
        let too_high = self.bad_above.is_some_and(|limit| value > limit);
        if too_low || too_high {
            return BenchmarkBand::Bad;
        }
        let above_min = self.good_min.map_or(true, |min| value >= min);
        let below_max = self.good_max.map_or(true, |max| value <= max);
        if above_min && below_max {
            BenchmarkBand::Good
        } else {
            BenchmarkBand::Watch
        }
    }
}

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub id: String,
    pub name: String,
    /// What the metric is, in plain words
    pub definition: String,
    pub formula: String,
    /// Why it matters
    pub why: String,
    pub example: WorkedExample,
    pub good_range: String,
    pub bad_range: String,
    #[serde(default)]
    pub benchmark: Option<Benchmark>,
}

/// Immutable catalogue of metric definitions, in presentation order.
#[derive(Debug, Clone)]
pub struct MetricCatalog {
    definitions: Vec<MetricDefinition>,
    index: HashMap<String, usize>,
}

static BUILTIN: Lazy<MetricCatalog> = Lazy::new(|| MetricCatalog::indexed(builtin_definitions()));

impl MetricCatalog {
    /// Build a catalogue, rejecting empty or duplicate ids.
    pub fn from_definitions(definitions: Vec<MetricDefinition>) -> EcomResult<Self> {
        if definitions.is_empty() {
            return Err(EcomError::Validation(
                "metric catalogue contains no metrics".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for definition in &definitions {
            if definition.id.trim().is_empty() {
                return Err(EcomError::Validation("metric id cannot be empty".into()));
            }
            if !seen.insert(definition.id.as_str()) {
                return Err(EcomError::Validation(format!(
                    "duplicate metric id '{}' in catalogue",
                    definition.id
                )));
            }
        }
        Ok(Self::indexed(definitions))
    }

    fn indexed(definitions: Vec<MetricDefinition>) -> Self {
        let index = definitions
            .iter()
            .enumerate()
            .map(|(pos, def)| (def.id.clone(), pos))
            .collect();
        Self { definitions, index }
    }

    /// The catalogue shipped with EcomSim.
    pub fn builtin() -> &'static MetricCatalog {
        &BUILTIN
    }

    pub fn get(&self, id: &str) -> Result<&MetricDefinition, CatalogError> {
        self.index
            .get(id)
            .map(|pos| &self.definitions[*pos])
            .ok_or_else(|| CatalogError::UnknownMetric(id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDefinition> {
        self.definitions.iter()
    }

    pub fn definitions(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn example(scenario: &str, calculation: &str, result: &str) -> WorkedExample {
    WorkedExample {
        scenario: scenario.to_string(),
        calculation: calculation.to_string(),
        result: result.to_string(),
    }
}

fn builtin_definitions() -> Vec<MetricDefinition> {
    vec![
        MetricDefinition {
            id: "revenue".into(),
            name: "Revenue".into(),
            definition: "How much money the business brought in".into(),
            formula: "Units sold × Price".into(),
            why: "No business survives without revenue".into(),
            example: example(
                "200 items sold at 150,000 som",
                "200 × 150,000 = 30,000,000",
                "30 million som",
            ),
            good_range: "+10-20% month over month".into(),
            bad_range: "Any decline is a warning sign".into(),
            benchmark: None,
        },
        MetricDefinition {
            id: "aov".into(),
            name: "AOV (Average Order Value)".into(),
            definition: "How much a customer spends per order on average".into(),
            formula: "Revenue ÷ Orders".into(),
            why: "Raising AOV is the easiest lever on revenue".into(),
            example: example(
                "30 million som revenue from 200 orders",
                "30,000,000 ÷ 200 = 150,000",
                "AOV of 150,000 som",
            ),
            good_range: "100,000-300,000 som".into(),
            bad_range: "Very low".into(),
            benchmark: Some(Benchmark {
                kpi: MetricField::AverageOrderValue,
                good_min: Some(100_000.0),
                good_max: Some(300_000.0),
                bad_below: Some(50_000.0),
                bad_above: None,
            }),
        },
        MetricDefinition {
            id: "conversion".into(),
            name: "Conversion Rate".into(),
            definition: "What percentage of visitors buy".into(),
            formula: "Orders ÷ Visits × 100".into(),
            why: "A low rate means something on the site is broken".into(),
            example: example(
                "10,000 visits, 250 purchases",
                "250 ÷ 10,000 × 100 = 2.5%",
                "2.5% conversion",
            ),
            good_range: "2-5% is good".into(),
            bad_range: "Below 1%".into(),
            benchmark: Some(Benchmark {
                kpi: MetricField::ConversionRate,
                good_min: Some(2.0),
                good_max: Some(5.0),
                bad_below: Some(1.0),
                bad_above: None,
            }),
        },
        MetricDefinition {
            id: "roas".into(),
            name: "ROAS (Return on Ad Spend)".into(),
            definition: "How much revenue each unit of advertising brings back".into(),
            formula: "Revenue ÷ Ad spend".into(),
            why: "A low ROAS means advertising loses money".into(),
            example: example(
                "5 million som on ads, 20 million som revenue",
                "20,000,000 ÷ 5,000,000 = 4",
                "ROAS of 4x",
            ),
            good_range: "3x and above".into(),
            bad_range: "Below 2x".into(),
            benchmark: Some(Benchmark {
                kpi: MetricField::ReturnOnAdSpend,
                good_min: Some(3.0),
                good_max: None,
                bad_below: Some(2.0),
                bad_above: None,
            }),
        },
        MetricDefinition {
            id: "cac".into(),
            name: "CAC (Customer Acquisition Cost)".into(),
            definition: "What it costs to win one customer".into(),
            formula: "Ad spend ÷ Customers".into(),
            why: "A high CAC eats the profit of every order".into(),
            example: example(
                "5 million som on ads, 200 customers",
                "5,000,000 ÷ 200 = 25,000",
                "25,000 som per customer",
            ),
            good_range: "As low as possible".into(),
            bad_range: "Too high".into(),
            benchmark: None,
        },
    ]
}
