use ecomsim_core::EcomError;
use thiserror::Error;
use uuid::Uuid;

use crate::state::Phase;

/// Usage errors in the scenario flow. Always surfaced, never ignored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("unknown choice '{choice_id}' for scenario '{scenario_id}'")]
    UnknownChoice {
        scenario_id: String,
        choice_id: String,
    },

    /// The operation is not allowed in the current phase.
    #[error("cannot {action} while scenario is {phase}")]
    InvalidStateTransition { phase: Phase, action: &'static str },

    #[error("unknown session {0}")]
    UnknownSession(Uuid),
}

impl From<ScenarioError> for EcomError {
    fn from(err: ScenarioError) -> Self {
        EcomError::Validation(err.to_string())
    }
}
