//! The scenario outcome state machine.
//!
//! ```text
//!              choose(id)
//!  Presenting ───────────▶ Resolved
//!      ▲                      │
//!      └────── reset() ───────┘
//! ```
//!
//! A presentation yields exactly one decision. Calling `choose` again while
//! resolved is an [`ScenarioError::InvalidStateTransition`]; the learner
//! must reset and face the problem afresh. There is no retry-until-correct.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ScenarioError;
use crate::spec::{Baseline, OutcomeTone, ResolvedScenario, ScenarioChoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Problem and choice list on screen
    Presenting,
    /// A choice was made; outcome and score on screen
    Resolved,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Presenting => f.write_str("presenting"),
            Phase::Resolved => f.write_str("resolved"),
        }
    }
}

/// What the learner sees while the scenario is presenting.
#[derive(Debug, Clone, Serialize)]
pub struct Presentation<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub baseline: &'a Baseline,
    pub choices: &'a [ScenarioChoice],
}

/// What the learner sees once resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Resolution<'a> {
    pub choice: &'a ScenarioChoice,
    pub score_delta: i32,
    pub cumulative_score: i64,
    pub tone: OutcomeTone,
}

/// Serializable view of a state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioSnapshot {
    pub scenario_id: String,
    pub phase: Phase,
    pub cumulative_score: i64,
    pub history: Vec<ScenarioChoice>,
}

/// One learner's progress through one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioState {
    scenario: Arc<ResolvedScenario>,
    phase: Phase,
    cumulative_score: i64,
    history: Vec<ScenarioChoice>,
}

impl ScenarioState {
    /// Start presenting a scenario with a zero score.
    pub fn new(scenario: Arc<ResolvedScenario>) -> Self {
        Self {
            scenario,
            phase: Phase::Presenting,
            cumulative_score: 0,
            history: Vec::new(),
        }
    }

    pub fn scenario(&self) -> &ResolvedScenario {
        &self.scenario
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cumulative_score(&self) -> i64 {
        self.cumulative_score
    }

    pub fn history(&self) -> &[ScenarioChoice] {
        &self.history
    }

    /// The problem and its choices, or `None` once resolved.
    pub fn presentation(&self) -> Option<Presentation<'_>> {
        match self.phase {
            Phase::Presenting => Some(Presentation {
                title: &self.scenario.title,
                description: &self.scenario.description,
                baseline: &self.scenario.baseline,
                choices: &self.scenario.choices,
            }),
            Phase::Resolved => None,
        }
    }

    /// The chosen outcome, or `None` while presenting.
    pub fn resolution(&self) -> Option<Resolution<'_>> {
        if self.phase != Phase::Resolved {
            return None;
        }
        let choice = self.history.last()?;
        Some(Resolution {
            choice,
            score_delta: choice.score_points,
            cumulative_score: self.cumulative_score,
            tone: self.scenario.tone(choice),
        })
    }

    /// Resolve the scenario with the given choice.
    ///
    /// The state is left untouched on error.
    pub fn choose(&mut self, choice_id: &str) -> Result<&ScenarioChoice, ScenarioError> {
        if self.phase != Phase::Presenting {
            return Err(ScenarioError::InvalidStateTransition {
                phase: self.phase,
                action: "choose",
            });
        }
        let choice = self
            .scenario
            .choice(choice_id)
            .cloned()
            .ok_or_else(|| ScenarioError::UnknownChoice {
                scenario_id: self.scenario.scenario_id.clone(),
                choice_id: choice_id.to_string(),
            })?;

        self.cumulative_score += i64::from(choice.score_points);
        self.phase = Phase::Resolved;
        info!(
            scenario = %self.scenario.scenario_id,
            choice = %choice.id,
            points = choice.score_points,
            total = self.cumulative_score,
            "scenario resolved"
        );
        self.history.push(choice);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Back to presenting with an empty history and a zero score.
    pub fn reset(&mut self) {
        debug!(scenario = %self.scenario.scenario_id, phase = %self.phase, "scenario reset");
        self.history.clear();
        self.cumulative_score = 0;
        self.phase = Phase::Presenting;
    }

    pub fn snapshot(&self) -> ScenarioSnapshot {
        ScenarioSnapshot {
            scenario_id: self.scenario.scenario_id.clone(),
            phase: self.phase,
            cumulative_score: self.cumulative_score,
            history: self.history.clone(),
        }
    }
}

/// Value-passing form of [`ScenarioState::choose`].
pub fn choose(mut state: ScenarioState, choice_id: &str) -> Result<ScenarioState, ScenarioError> {
    state.choose(choice_id)?;
    Ok(state)
}

/// Value-passing form of [`ScenarioState::reset`].
pub fn reset(mut state: ScenarioState) -> ScenarioState {
    state.reset();
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{builtin_scenario_set, resolve_scenarios};

    fn state() -> ScenarioState {
        let mut resolved = resolve_scenarios(&builtin_scenario_set().unwrap()).unwrap();
        ScenarioState::new(Arc::new(resolved.remove(0)))
    }

    #[test]
    fn starts_presenting_with_zero_score() {
        let s = state();
        assert_eq!(s.phase(), Phase::Presenting);
        assert_eq!(s.cumulative_score(), 0);
        assert!(s.history().is_empty());
        assert_eq!(s.presentation().unwrap().choices.len(), 4);
        assert!(s.resolution().is_none());
    }

    #[test]
    fn negative_choice_goes_below_zero() {
        let s = choose(state(), "ads").unwrap();
        assert_eq!(s.cumulative_score(), -20);
        assert_eq!(s.phase(), Phase::Resolved);
        let res = s.resolution().unwrap();
        assert_eq!(res.choice.id, "ads");
        assert_eq!(res.score_delta, -20);
        assert_eq!(res.tone, OutcomeTone::Cautionary);
        assert!(s.presentation().is_none());
    }

    #[test]
    fn second_choice_is_rejected() {
        let mut s = state();
        s.choose("photos").unwrap();
        let err = s.choose("reviews").unwrap_err();
        assert_eq!(
            err,
            ScenarioError::InvalidStateTransition {
                phase: Phase::Resolved,
                action: "choose"
            }
        );
        assert_eq!(s.cumulative_score(), 50);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.resolution().unwrap().tone, OutcomeTone::Positive);
    }

    #[test]
    fn unknown_choice_leaves_state_untouched() {
        let mut s = state();
        let err = s.choose("refund").unwrap_err();
        assert!(matches!(err, ScenarioError::UnknownChoice { ref choice_id, .. } if choice_id == "refund"));
        assert_eq!(s.phase(), Phase::Presenting);
        assert_eq!(s.cumulative_score(), 0);
    }

    #[test]
    fn resolved_state_reports_transition_before_lookup() {
        let mut s = state();
        s.choose("discount").unwrap();
        assert!(matches!(
            s.choose("refund"),
            Err(ScenarioError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn reset_is_idempotent() {
        let mut s = state();
        s.choose("reviews").unwrap();
        let s = reset(s);
        assert_eq!(s.phase(), Phase::Presenting);
        assert_eq!(s.cumulative_score(), 0);
        assert!(s.history().is_empty());

        let again = reset(s.clone());
        assert_eq!(again.snapshot(), s.snapshot());
    }

    #[test]
    fn choose_after_reset_starts_fresh() {
        let mut s = state();
        s.choose("ads").unwrap();
        s.reset();
        s.choose("photos").unwrap();
        assert_eq!(s.cumulative_score(), 50);
        assert_eq!(s.history().len(), 1);
    }
}
