use anyhow::{anyhow, Context, Result};
use ecomsim_core::metrics::check_percent;
use ecomsim_core::{MetricField, Money, Percent};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

const BUILTIN_SPEC: &str = include_str!("../data/builtin.yaml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub version: Option<u32>,
    #[serde(default)]
    pub defaults: ScenarioDefaults,
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioDefaults {
    /// Outcomes scoring above this are graded positive
    #[serde(default = "default_success_threshold")]
    pub success_threshold: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_success_threshold() -> i32 {
    30
}

impl Default for ScenarioDefaults {
    fn default() -> Self {
        Self {
            success_threshold: default_success_threshold(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub scenario_id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub baseline: Option<Baseline>,
    #[serde(default)]
    pub choices: Vec<ScenarioChoice>,
    pub success_threshold: Option<i32>,
}

/// The shop's numbers at the moment the problem is posed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub traffic: Option<u64>,
    pub conversion_rate: Option<Percent>,
    pub average_order_value: Option<Money>,
    pub revenue: Option<Money>,
}

impl Baseline {
    /// Revenue implied by traffic, conversion and AOV, when all are given.
    pub fn implied_revenue(&self) -> Option<Money> {
        let orders = self.traffic? as f64 * self.conversion_rate?.as_fraction();
        Some(self.average_order_value? * orders)
    }

    fn check(&self) -> Result<()> {
        if let Some(rate) = self.conversion_rate {
            check_percent(MetricField::ConversionRate, rate)?;
        }
        if let Some(aov) = self.average_order_value {
            if !aov.is_finite() || aov.value() <= 0.0 {
                return Err(anyhow!(
                    "baseline average_order_value must be a positive amount, got {}",
                    aov.value()
                ));
            }
        }
        if let Some(revenue) = self.revenue {
            if !revenue.is_finite() || revenue.value() < 0.0 {
                return Err(anyhow!(
                    "baseline revenue must be zero or positive, got {}",
                    revenue.value()
                ));
            }
        }
        if let (Some(stated), Some(implied)) = (self.revenue, self.implied_revenue()) {
            if (stated - implied).value().abs() > 0.5 {
                return Err(anyhow!(
                    "baseline revenue {} does not match traffic × conversion × AOV = {}",
                    stated.value(),
                    implied.value()
                ));
            }
        }
        Ok(())
    }
}

/// One corrective action the learner can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioChoice {
    pub id: String,
    pub text: String,
    /// May be negative
    pub score_points: i32,
    pub feedback: String,
    pub lesson: String,
}

/// How an outcome is presented: a clear win, or a result to reflect on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeTone {
    Positive,
    Cautionary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedScenario {
    pub scenario_id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub baseline: Baseline,
    pub choices: Vec<ScenarioChoice>,
    pub success_threshold: i32,
}

impl ResolvedScenario {
    pub fn choice(&self, choice_id: &str) -> Option<&ScenarioChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }

    pub fn tone(&self, choice: &ScenarioChoice) -> OutcomeTone {
        if choice.score_points > self.success_threshold {
            OutcomeTone::Positive
        } else {
            OutcomeTone::Cautionary
        }
    }

    /// The highest-scoring choice.
    pub fn best_choice(&self) -> Option<&ScenarioChoice> {
        self.choices.iter().max_by_key(|c| c.score_points)
    }
}

pub fn load_spec_from_path(path: &Path) -> Result<ScenarioSet> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario spec '{}'", path.display()))?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario spec yaml")
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario spec json")
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing scenario spec"),
    }
}

/// The scenario set embedded in the binary.
pub fn builtin_scenario_set() -> Result<ScenarioSet> {
    serde_yaml::from_str(BUILTIN_SPEC).context("parsing built-in scenario spec")
}

pub fn resolve_scenarios(set: &ScenarioSet) -> Result<Vec<ResolvedScenario>> {
    if set.scenarios.is_empty() {
        return Err(anyhow!("scenario set contains no scenarios"));
    }
    let defaults = &set.defaults;
    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(set.scenarios.len());
    for scenario in &set.scenarios {
        if scenario.scenario_id.trim().is_empty() {
            return Err(anyhow!("scenario_id cannot be empty"));
        }
        if !seen.insert(scenario.scenario_id.as_str()) {
            return Err(anyhow!(
                "duplicate scenario_id '{}' in spec",
                scenario.scenario_id
            ));
        }
        check_choices(scenario)?;
        let baseline = scenario.baseline.clone().unwrap_or_default();
        baseline
            .check()
            .with_context(|| format!("checking baseline of scenario '{}'", scenario.scenario_id))?;
        let tags = scenario
            .tags
            .as_ref()
            .cloned()
            .unwrap_or_else(|| defaults.tags.clone());
        debug!(
            scenario = %scenario.scenario_id,
            choices = scenario.choices.len(),
            "resolved scenario"
        );
        resolved.push(ResolvedScenario {
            scenario_id: scenario.scenario_id.clone(),
            title: scenario.title.clone(),
            description: scenario.description.clone().unwrap_or_default(),
            tags,
            baseline,
            choices: scenario.choices.clone(),
            success_threshold: scenario
                .success_threshold
                .unwrap_or(defaults.success_threshold),
        });
    }
    Ok(resolved)
}

pub fn validate(set: &ScenarioSet) -> Result<()> {
    resolve_scenarios(set).map(|_| ())
}

fn check_choices(scenario: &ScenarioSpec) -> Result<()> {
    if scenario.choices.is_empty() {
        return Err(anyhow!(
            "scenario '{}' must offer at least one choice",
            scenario.scenario_id
        ));
    }
    let mut ids = HashSet::new();
    for choice in &scenario.choices {
        if choice.id.trim().is_empty() {
            return Err(anyhow!(
                "scenario '{}' has a choice with an empty id",
                scenario.scenario_id
            ));
        }
        if !ids.insert(choice.id.as_str()) {
            return Err(anyhow!(
                "duplicate choice id '{}' in scenario '{}'",
                choice.id,
                scenario.scenario_id
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(id: &str, points: i32) -> ScenarioChoice {
        ScenarioChoice {
            id: id.into(),
            text: format!("do {id}"),
            score_points: points,
            feedback: "ok".into(),
            lesson: "learned".into(),
        }
    }

    fn spec(id: &str, choices: Vec<ScenarioChoice>) -> ScenarioSpec {
        ScenarioSpec {
            scenario_id: id.into(),
            title: "t".into(),
            description: None,
            tags: None,
            baseline: None,
            choices,
            success_threshold: None,
        }
    }

    fn set(scenarios: Vec<ScenarioSpec>) -> ScenarioSet {
        ScenarioSet {
            version: Some(1),
            defaults: ScenarioDefaults::default(),
            scenarios,
        }
    }

    #[test]
    fn builtin_set_resolves() {
        let resolved = resolve_scenarios(&builtin_scenario_set().unwrap()).unwrap();
        assert_eq!(resolved.len(), 1);
        let scenario = &resolved[0];
        assert_eq!(scenario.scenario_id, "conversion-drop");
        let points: Vec<i32> = scenario.choices.iter().map(|c| c.score_points).collect();
        assert_eq!(points, [-20, 50, 10, 40]);
        assert_eq!(scenario.best_choice().unwrap().id, "photos");
        assert_eq!(
            scenario.baseline.implied_revenue(),
            Some(Money::new(36_000_000.0))
        );
    }

    #[test]
    fn rejects_empty_set_and_duplicates() {
        assert!(resolve_scenarios(&set(vec![])).is_err());

        let dup = set(vec![spec("a", vec![choice("x", 1)]), spec("a", vec![choice("y", 1)])]);
        let err = resolve_scenarios(&dup).unwrap_err();
        assert!(err.to_string().contains("duplicate scenario_id 'a'"));
    }

    #[test]
    fn rejects_bad_choice_sets() {
        let none = set(vec![spec("a", vec![])]);
        assert!(validate(&none).is_err());

        let dup = set(vec![spec("a", vec![choice("x", 1), choice("x", 2)])]);
        let err = validate(&dup).unwrap_err();
        assert!(err.to_string().contains("duplicate choice id 'x'"));
    }

    #[test]
    fn rejects_inconsistent_baseline() {
        let mut s = spec("a", vec![choice("x", 1)]);
        s.baseline = Some(Baseline {
            traffic: Some(10_000),
            conversion_rate: Some(Percent::new(2.4)),
            average_order_value: Some(Money::new(150_000.0)),
            revenue: Some(Money::new(40_000_000.0)),
        });
        assert!(validate(&set(vec![s])).is_err());
    }

    #[test]
    fn rejects_out_of_range_baseline_amounts() {
        let with_baseline = |baseline: Baseline| {
            let mut s = spec("a", vec![choice("x", 1)]);
            s.baseline = Some(baseline);
            set(vec![s])
        };

        for aov in [f64::NAN, -150_000.0, 0.0, f64::INFINITY] {
            let err = validate(&with_baseline(Baseline {
                average_order_value: Some(Money::new(aov)),
                ..Baseline::default()
            }))
            .unwrap_err();
            assert!(format!("{err:#}").contains("average_order_value"), "{err:#}");
        }

        for revenue in [f64::NAN, -1.0] {
            let err = validate(&with_baseline(Baseline {
                revenue: Some(Money::new(revenue)),
                ..Baseline::default()
            }))
            .unwrap_err();
            assert!(format!("{err:#}").contains("baseline revenue"), "{err:#}");
        }

        assert!(validate(&with_baseline(Baseline {
            revenue: Some(Money::new(0.0)),
            ..Baseline::default()
        }))
        .is_ok());
    }

    #[test]
    fn threshold_defaults_and_overrides() {
        let mut custom = spec("b", vec![choice("x", 20)]);
        custom.success_threshold = Some(10);
        let resolved =
            resolve_scenarios(&set(vec![spec("a", vec![choice("x", 20)]), custom])).unwrap();
        assert_eq!(resolved[0].success_threshold, 30);
        assert_eq!(resolved[0].tone(&resolved[0].choices[0]), OutcomeTone::Cautionary);
        assert_eq!(resolved[1].tone(&resolved[1].choices[0]), OutcomeTone::Positive);
    }
}
