//! Per-session isolation of scenario state.
//!
//! Each learner session owns exactly one [`ScenarioState`]. The store is a
//! plain map owned by the caller; it performs no locking, so a caller that
//! serves several requests concurrently must wrap it accordingly.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::ScenarioError;
use crate::spec::{ResolvedScenario, ScenarioChoice};
use crate::state::ScenarioState;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub state: ScenarioState,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<Uuid, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start presenting `scenario` in a fresh session.
    pub fn open(&mut self, scenario: Arc<ResolvedScenario>) -> Uuid {
        let id = Uuid::new_v4();
        debug!(session = %id, scenario = %scenario.scenario_id, "session opened");
        self.sessions.insert(
            id,
            Session {
                id,
                started_at: Utc::now(),
                state: ScenarioState::new(scenario),
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> Result<&Session, ScenarioError> {
        self.sessions
            .get(&id)
            .ok_or(ScenarioError::UnknownSession(id))
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Session, ScenarioError> {
        self.sessions
            .get_mut(&id)
            .ok_or(ScenarioError::UnknownSession(id))
    }

    pub fn choose(&mut self, id: Uuid, choice_id: &str) -> Result<&ScenarioChoice, ScenarioError> {
        self.get_mut(id)?.state.choose(choice_id)
    }

    pub fn reset(&mut self, id: Uuid) -> Result<&ScenarioState, ScenarioError> {
        let session = self.get_mut(id)?;
        session.state.reset();
        Ok(&session.state)
    }

    /// End a session and hand back its final state.
    pub fn close(&mut self, id: Uuid) -> Result<Session, ScenarioError> {
        let session = self
            .sessions
            .remove(&id)
            .ok_or(ScenarioError::UnknownSession(id))?;
        debug!(session = %id, score = session.state.cumulative_score(), "session closed");
        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
