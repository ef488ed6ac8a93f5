//! Splits the output of a reduction step into its new state and the side
//! effects yielded before it

use itertools::{Itertools, Position};

use crate::{
    diagnostics::{Advisor, Advisory},
    effect::Step,
    error::{Result, SideFxError},
    options::Validation,
    queue::QueuedEffect,
    reducer::Reduction,
};

/// Application state paired with the side effects yielded while computing it
pub struct StateWithEffects<S, A, O = ()> {
    state: S,
    effects: Vec<QueuedEffect<A, O>>,
}

impl<S, A, O> StateWithEffects<S, A, O> {
    /// Pairs a state with its side effects
    pub fn new(state: S, effects: Vec<QueuedEffect<A, O>>) -> Self {
        Self { state, effects }
    }

    /// Returns the new state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Returns the side effects in the order they were yielded
    pub fn effects(&self) -> &[QueuedEffect<A, O>] {
        &self.effects
    }

    /// Splits into the new state and its side effects
    pub fn into_parts(self) -> (S, Vec<QueuedEffect<A, O>>) {
        (self.state, self.effects)
    }
}

/// Drains a reduction and separates its terminal state from the side effects
/// yielded before it.
///
/// A plain reduction is returned as is with no side effects. A lazy reduction
/// is pulled until exhausted: its last value must be [`Step::State`], every
/// value before it must be a side effect. Plain actions in a non-terminal
/// position are accepted only under [`Validation::Permissive`].
pub(crate) fn separate<S, A, O>(
    reduction: Reduction<S, A, O>,
    validation: Validation,
    advisor: &Advisor,
) -> Result<StateWithEffects<S, A, O>> {
    let steps = match reduction {
        Reduction::Plain(state) => {
            advisor.warn_once(Advisory::PlainReduction);
            return Ok(StateWithEffects::new(state, Vec::new()));
        }
        Reduction::Steps(steps) => steps,
    };

    let mut effects = Vec::new();
    let mut state = None;

    for (index, (position, step)) in steps.with_position().enumerate() {
        let is_last = matches!(position, Position::Last | Position::Only);

        match step {
            Step::State(new_state) if is_last => state = Some(new_state),
            _ if is_last => return Err(SideFxError::MissingState),
            Step::Effect(effect) => effects.push(QueuedEffect::Effect(effect)),
            Step::Action(action) => {
                advisor.warn_once(Advisory::CascadingAction);
                if validation == Validation::Strict {
                    return Err(SideFxError::InvalidEffectDescriptor {
                        position: index,
                        found: "plain action",
                    });
                }
                effects.push(QueuedEffect::Cascade(action));
            }
            Step::State(_) => {
                return Err(SideFxError::InvalidEffectDescriptor {
                    position: index,
                    found: "state",
                });
            }
        }
    }

    state
        .map(|state| StateWithEffects::new(state, effects))
        .ok_or(SideFxError::MissingState)
}

#[cfg(test)]
#[path = "./separator_tests.rs"]
mod tests;
