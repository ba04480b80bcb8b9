pub mod error;
pub mod session;
pub mod spec;
pub mod state;

pub use error::ScenarioError;
pub use session::{Session, SessionStore};
pub use spec::{
    builtin_scenario_set, load_spec_from_path, resolve_scenarios, validate, Baseline,
    OutcomeTone, ResolvedScenario, ScenarioChoice, ScenarioDefaults, ScenarioSet, ScenarioSpec,
};
pub use state::{choose, reset, Phase, Presentation, Resolution, ScenarioSnapshot, ScenarioState};
