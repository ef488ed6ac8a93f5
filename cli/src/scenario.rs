//! YAML scenarios replayed against an effect store

use std::{fs::File, path::Path, rc::Rc};

use color_eyre::eyre::{Result, eyre};
use log::*;
use r_sidefx::{
    diagnostics::{Diagnostics, LogDiagnostics},
    error::SideFxError,
    options::{StoreOptions, Validation},
    queue::Flushed,
    scheduler::{EventLoop, Scheduler},
    store::EffectStore,
};
use serde::{Deserialize, Serialize};

use crate::counter::{self, CounterAction, CounterState, EffectLog};

/// Reported for a cascading action dispatched by a manual flush
pub const CASCADED: &str = "dispatched cascading action";

#[doc(hidden)]
fn default_reducer() -> String {
    "counter".to_string()
}

/// A single scenario instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStep {
    /// Dispatch an action to the store
    Dispatch(CounterAction),
    /// Run one scheduler turn
    Turn,
    /// Run scheduler turns until none are left
    Settle,
    /// Flush queued side effects immediately
    Flush,
    /// Replace the reducer with the named built-in
    Replace(String),
}

/// A store setup and the steps replayed against it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default = "default_reducer")]
    pub reducer: String,
    #[serde(default)]
    pub validation: Validation,
    #[serde(default)]
    pub initial: CounterState,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Reads a scenario from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            eyre!("failed to open scenario {}: {}", path.display(), e)
        })?;

        let scenario = serde_yaml::from_reader(file).map_err(|e| {
            eyre!("failed to parse scenario {}: {}", path.display(), e)
        })?;

        Ok(scenario)
    }
}

/// Outcome of replaying a scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub state: CounterState,
    pub effects: Vec<String>,
    pub flushed: Vec<String>,
    pub turns: usize,
    pub pending_effects: usize,
}

/// Replays every step of the scenario and reports the final state along with
/// the side effects that ran
pub fn run(scenario: &Scenario) -> Result<Report> {
    let log = EffectLog::default();
    let event_loop = Rc::new(EventLoop::new());

    let reducer = counter::builtin(&scenario.reducer, &log)
        .ok_or(SideFxError::NotAReducer)
        .map_err(|e| eyre!("unknown reducer {}: {}", scenario.reducer, e))?;

    let options = StoreOptions::builder()
        .validation(scenario.validation)
        .diagnostics(Rc::new(LogDiagnostics) as Rc<dyn Diagnostics>)
        .build()
        .map_err(SideFxError::from)?;

    let store: EffectStore<CounterState, CounterAction, String> =
        EffectStore::new(
            reducer,
            scenario.initial.clone(),
            Rc::clone(&event_loop) as Rc<dyn Scheduler>,
            options,
        )?;

    let mut flushed = Vec::new();
    let mut turns = 0;

    for (index, step) in scenario.steps.iter().enumerate() {
        debug!("step {index}: {step:?}");

        match step {
            ScenarioStep::Dispatch(action) => {
                store.dispatch(action.clone()).map_err(|e| {
                    eyre!("step {index}: failed to dispatch {action:?}: {e}")
                })?;
            }
            ScenarioStep::Turn => {
                if event_loop.run_turn() {
                    turns += 1;
                }
            }
            ScenarioStep::Settle => turns += event_loop.run_until_idle(),
            ScenarioStep::Flush => {
                for outcome in store.flush_effects_now() {
                    match outcome {
                        Flushed::Effect(value) => flushed.push(value),
                        Flushed::Dispatched(Ok(())) => {
                            flushed.push(CASCADED.to_string())
                        }
                        Flushed::Dispatched(Err(e)) => {
                            return Err(eyre!(
                                "step {index}: cascading action failed: {e}"
                            ));
                        }
                    }
                }
            }
            ScenarioStep::Replace(name) => {
                store
                    .try_replace_reducer(counter::builtin(name, &log))
                    .map_err(|e| {
                        eyre!("step {index}: cannot replace with {name}: {e}")
                    })?;
            }
        }
    }

    if store.has_pending_flush() {
        warn!(
            "scenario ended with {} side effect(s) still queued",
            store.pending_effects()
        );
    }

    Ok(Report {
        state: store.get_state().as_ref().clone(),
        effects: log.entries(),
        flushed,
        turns,
        pending_effects: store.pending_effects(),
    })
}

#[cfg(test)]
#[path = "./scenario_tests.rs"]
mod tests;
