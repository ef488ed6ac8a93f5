//! Reduction step contract consumed by the enhancer

use std::fmt;

use crate::{effect::Step, error::Result};

/// Boxed, pull-based sequence of values produced by a reduction step
pub type Steps<S, A, O> = Box<dyn Iterator<Item = Step<S, A, O>>>;

/// Reducer installed into a base store. Enhanced reducers have this shape:
/// they return the new state synchronously or fail.
pub type BaseReducer<S, A> = Box<dyn Fn(&S, &A) -> Result<S>>;

/// The raw value returned by a reduction step
pub enum Reduction<S, A, O = ()> {
    /// A plain new state, no side effects
    Plain(S),
    /// A lazy sequence of side effects terminated by the new state
    Steps(Steps<S, A, O>),
}

impl<S: 'static, A: 'static, O: 'static> Reduction<S, A, O> {
    /// Wraps any iterator of steps as a lazy reduction
    pub fn from_steps<I>(steps: I) -> Self
    where
        I: IntoIterator<Item = Step<S, A, O>>,
        I::IntoIter: 'static,
    {
        Reduction::Steps(Box::new(steps.into_iter()))
    }

    /// Returns a lazy reduction yielding only the new state
    pub fn state(state: S) -> Self {
        Self::from_steps(std::iter::once(Step::State(state)))
    }
}

impl<S, A, O> fmt::Debug for Reduction<S, A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Plain(_) => f.write_str("Reduction::Plain"),
            Reduction::Steps(_) => f.write_str("Reduction::Steps"),
        }
    }
}

/// Computes the next state from the previous state and an action, yielding
/// side effects along the way
pub trait Reducer<S, A, O = ()> {
    /// Runs one reduction step
    fn reduce(&self, state: &S, action: &A) -> Reduction<S, A, O>;
}

impl<S, A, O, F> Reducer<S, A, O> for F
where
    F: Fn(&S, &A) -> Reduction<S, A, O>,
{
    fn reduce(&self, state: &S, action: &A) -> Reduction<S, A, O> {
        self(state, action)
    }
}

#[cfg(test)]
#[path = "./reducer_tests.rs"]
mod tests;
