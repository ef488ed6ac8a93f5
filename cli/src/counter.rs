//! Built-in reducers replayed by scenarios

use std::{cell::RefCell, rc::Rc};

use log::*;
use r_sidefx::{
    effect::{Dispatch, Step, side_effect},
    reducer::Reduction,
};
use serde::{Deserialize, Serialize};

/// Increments larger than this yield an audit side effect
pub const AUDIT_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterState {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub pongs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterAction {
    Increment(u32),
    Decrement(u32),
    Reset,
    Ping,
    Pong,
}

/// Shared record of every side effect that ran, in execution order
#[derive(Debug, Clone, Default)]
pub struct EffectLog(Rc<RefCell<Vec<String>>>);

impl EffectLog {
    pub fn record(&self, entry: String) {
        debug!("effect ran: {entry}");
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

pub type CounterReduction = Reduction<CounterState, CounterAction, String>;

pub type CounterReducer =
    Box<dyn Fn(&CounterState, &CounterAction) -> CounterReduction>;

type CounterStep = Step<CounterState, CounterAction, String>;

#[doc(hidden)]
fn audit(log: &EffectLog, amount: u32, count: i64) -> CounterStep {
    let log = log.clone();
    let effect = side_effect(
        move |_: &Dispatch<CounterAction>, (amount, count): (u32, i64)| {
            let entry = format!(
                "audit: increment of {amount} brought count to {count}"
            );
            log.record(entry.clone());
            entry
        },
        (amount, count),
    );
    Step::Effect(effect.named("audit"))
}

#[doc(hidden)]
fn reduce_counter(
    log: &EffectLog,
    state: &CounterState,
    action: &CounterAction,
    factor: i64,
) -> CounterReduction {
    let mut next = state.clone();
    let mut steps = Vec::new();

    match action {
        CounterAction::Increment(amount) => {
            next.count += factor * i64::from(*amount);
            if *amount > AUDIT_THRESHOLD {
                steps.push(audit(log, *amount, next.count));
            }
        }
        CounterAction::Decrement(amount) => {
            next.count -= i64::from(*amount);
        }
        CounterAction::Reset => next.count = 0,
        CounterAction::Ping => steps.push(Step::Action(CounterAction::Pong)),
        CounterAction::Pong => next.pongs += 1,
    }

    steps.push(Step::State(next));
    Reduction::from_steps(steps)
}

/// Counts increments, decrements and pongs
pub fn counter(log: &EffectLog) -> CounterReducer {
    let log = log.clone();
    Box::new(move |state: &CounterState, action: &CounterAction| {
        reduce_counter(&log, state, action, 1)
    })
}

/// Same as [`counter`] but every increment counts twice
pub fn doubling(log: &EffectLog) -> CounterReducer {
    let log = log.clone();
    Box::new(move |state: &CounterState, action: &CounterAction| {
        reduce_counter(&log, state, action, 2)
    })
}

/// Looks up a built-in reducer by name
pub fn builtin(name: &str, log: &EffectLog) -> Option<CounterReducer> {
    match name {
        "counter" => Some(counter(log)),
        "doubling" => Some(doubling(log)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "./counter_tests.rs"]
mod tests;
