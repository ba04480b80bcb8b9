use std::fs;
use std::sync::Arc;

use ecomsim_scenarios::*;
use tempfile::tempdir;

const PRICING_YAML: &str = r#"
version: 1
defaults:
  success_threshold: 25
  tags: [pricing]
scenarios:
  - scenario_id: margin-squeeze
    title: "Supplier raised prices"
    description: "COGS went from 60% to 70% overnight."
    choices:
      - id: raise-prices
        text: "Raise retail prices by 10%"
        score_points: 30
        feedback: "Margin recovered with a small dip in conversion."
        lesson: "Pass cost increases on before they eat the margin."
      - id: cut-ads
        text: "Cut the ad budget in half"
        score_points: -10
        feedback: "Orders collapsed."
        lesson: "Cutting growth does not fix unit economics."
"#;

#[test]
fn loads_yaml_and_plays_one_decision() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pricing.yaml");
    fs::write(&path, PRICING_YAML).unwrap();

    let set = load_spec_from_path(&path).unwrap();
    let mut resolved = resolve_scenarios(&set).unwrap();
    let scenario = Arc::new(resolved.remove(0));
    assert_eq!(scenario.tags, ["pricing"]);
    assert_eq!(scenario.success_threshold, 25);

    let state = choose(ScenarioState::new(scenario), "raise-prices").unwrap();
    let outcome = state.resolution().unwrap();
    assert_eq!(outcome.cumulative_score, 30);
    assert_eq!(outcome.tone, OutcomeTone::Positive);
    assert_eq!(
        outcome.choice.lesson,
        "Pass cost increases on before they eat the margin."
    );

    let err = choose(state, "cut-ads").unwrap_err();
    assert!(matches!(err, ScenarioError::InvalidStateTransition { .. }));
}

#[test]
fn loads_json_by_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("builtin.json");
    let set = builtin_scenario_set().unwrap();
    fs::write(&path, serde_json::to_string_pretty(&set).unwrap()).unwrap();

    let reloaded = load_spec_from_path(&path).unwrap();
    validate(&reloaded).unwrap();
    assert_eq!(reloaded.scenarios[0].choices.len(), 4);
}

#[test]
fn reports_parse_failures_with_context() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "scenarios: [ {scenario_id: 1, choices: ").unwrap();
    let err = load_spec_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parsing scenario spec yaml"));

    let missing = dir.path().join("missing.yaml");
    let err = load_spec_from_path(&missing).unwrap_err();
    assert!(err.to_string().contains("reading scenario spec"));
}

#[test]
fn reset_restores_presentation_after_any_path() {
    let mut resolved = resolve_scenarios(&builtin_scenario_set().unwrap()).unwrap();
    let scenario = Arc::new(resolved.remove(0));
    for choice in ["ads", "photos", "discount", "reviews"] {
        let state = choose(ScenarioState::new(scenario.clone()), choice).unwrap();
        let state = reset(state);
        assert_eq!(state.phase(), Phase::Presenting);
        assert_eq!(state.cumulative_score(), 0);
        assert!(state.history().is_empty());
    }
}
