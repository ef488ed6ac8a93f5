//! Composes per-slice reducers, any of which may yield side effects, into a
//! single reducer over the whole state

use std::{fmt, marker::PhantomData};

use crate::{
    effect::Step,
    reducer::{Reducer, Reduction},
};

/// One keyed part of a combined reducer
trait Slice<S, A, O> {
    fn key(&self) -> &'static str;

    /// Reduces the slice, appending its side effects to `steps` and writing
    /// a changed value into `next`. Returns false if no state was produced.
    fn reduce_into(
        &self,
        state: &S,
        action: &A,
        steps: &mut Vec<Step<S, A, O>>,
        next: &mut Option<S>,
    ) -> bool;
}

struct Keyed<T, G, U, R> {
    key: &'static str,
    get: G,
    set: U,
    reducer: R,
    _slice: PhantomData<fn() -> T>,
}

impl<S, A, O, T, G, U, R> Slice<S, A, O> for Keyed<T, G, U, R>
where
    S: Clone,
    T: PartialEq,
    R: Reducer<T, A, O>,
    G: Fn(&S) -> &T,
    U: Fn(&mut S, T),
{
    fn key(&self) -> &'static str {
        self.key
    }

    fn reduce_into(
        &self,
        state: &S,
        action: &A,
        steps: &mut Vec<Step<S, A, O>>,
        next: &mut Option<S>,
    ) -> bool {
        let previous = (self.get)(state);

        let value = match self.reducer.reduce(previous, action) {
            Reduction::Plain(value) => value,
            Reduction::Steps(iter) => {
                let mut terminal = None;
                for step in iter {
                    // a state followed by more steps is misplaced
                    if terminal.take().is_some() {
                        steps.push(Step::State(state.clone()));
                    }
                    match step {
                        Step::Effect(effect) => {
                            steps.push(Step::Effect(effect))
                        }
                        Step::Action(cascade) => {
                            steps.push(Step::Action(cascade))
                        }
                        Step::State(value) => terminal = Some(value),
                    }
                }
                match terminal {
                    Some(value) => value,
                    None => return false,
                }
            }
        };

        if value != *previous {
            (self.set)(next.get_or_insert_with(|| state.clone()), value);
        }

        true
    }
}

/// A reducer built from keyed slice reducers.
///
/// Slices run in the order they were added. Every slice sees the previous
/// value of its own part of the state, and the steps it yields are chained
/// in that order ahead of the combined state. A slice counts as changed when
/// its new value differs from the previous one; if no slice changed, the
/// previous state is returned as is.
///
/// Slices may return a [`Reduction::Plain`] value or a lazy sequence of
/// steps. A slice that yields its state before its last step, or no state at
/// all, fails the combined reduction the same way a malformed reduction of
/// the whole state does.
pub struct Combined<S, A, O = ()> {
    slices: Vec<Box<dyn Slice<S, A, O>>>,
}

/// Starts a [`Combined`] reducer with no slices
pub fn combine<S, A, O>() -> Combined<S, A, O>
where
    S: Clone + 'static,
    A: 'static,
    O: 'static,
{
    Combined::new()
}

impl<S, A, O> Combined<S, A, O>
where
    S: Clone + 'static,
    A: 'static,
    O: 'static,
{
    /// Returns a combined reducer with no slices
    pub fn new() -> Self {
        Self { slices: Vec::new() }
    }

    /// Adds a slice under `key`. `get` reads the slice out of the whole
    /// state and `set` writes a changed slice back into a copy of it.
    pub fn slice<T, R, G, U>(
        mut self,
        key: &'static str,
        get: G,
        set: U,
        reducer: R,
    ) -> Self
    where
        T: PartialEq + 'static,
        R: Reducer<T, A, O> + 'static,
        G: Fn(&S) -> &T + 'static,
        U: Fn(&mut S, T) + 'static,
    {
        self.slices.push(Box::new(Keyed {
            key,
            get,
            set,
            reducer,
            _slice: PhantomData,
        }));
        self
    }

    /// Keys of the slices in the order they run
    pub fn keys(&self) -> Vec<&'static str> {
        self.slices.iter().map(|slice| slice.key()).collect()
    }
}

impl<S, A, O> Default for Combined<S, A, O>
where
    S: Clone + 'static,
    A: 'static,
    O: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, A, O> Reducer<S, A, O> for Combined<S, A, O>
where
    S: Clone + 'static,
    A: 'static,
    O: 'static,
{
    fn reduce(&self, state: &S, action: &A) -> Reduction<S, A, O> {
        let mut steps = Vec::new();
        let mut next = None;

        for slice in &self.slices {
            if !slice.reduce_into(state, action, &mut steps, &mut next) {
                log::debug!("slice {} did not return new state", slice.key());
                // no terminal state, so the reduction is rejected
                return Reduction::from_steps(steps);
            }
        }

        if next.is_none() {
            log::trace!("no slice changed, keeping previous state");
        }

        steps.push(Step::State(next.unwrap_or_else(|| state.clone())));
        Reduction::from_steps(steps)
    }
}

impl<S, A, O> fmt::Debug for Combined<S, A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Combined")
            .field("slices", &self.slices.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "./combine_tests.rs"]
mod tests;
