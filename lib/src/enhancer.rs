//! Wraps reducers so side effects yielded during reduction are queued for a
//! deferred flush while the new state is returned synchronously

use std::{fmt, rc::Rc};

use crate::{
    diagnostics::Advisor,
    error::{Result, SideFxError},
    options::Validation,
    queue::EffectQueue,
    reducer::{BaseReducer, Reducer},
    separator,
};

/// Enhances reducers for one store. Every reducer the store ever runs, the
/// initial one and each replacement, goes through the same enhancer so they
/// share one effect queue.
pub struct Enhancer<A, O> {
    queue: Rc<EffectQueue<A, O>>,
    validation: Validation,
    advisor: Rc<Advisor>,
}

impl<A: 'static, O: 'static> Enhancer<A, O> {
    pub(crate) fn new(
        queue: Rc<EffectQueue<A, O>>,
        validation: Validation,
        advisor: Rc<Advisor>,
    ) -> Self {
        Self {
            queue,
            validation,
            advisor,
        }
    }

    /// Runs one enhanced reduction: reduces, separates the output, queues the
    /// side effects and returns the new state. Nothing is queued if the
    /// reduction output is invalid.
    pub fn reduce<S, R>(&self, reducer: &R, state: &S, action: &A) -> Result<S>
    where
        R: Reducer<S, A, O> + ?Sized,
    {
        let reduction = reducer.reduce(state, action);

        let (new_state, effects) =
            separator::separate(reduction, self.validation, &self.advisor)?
                .into_parts();

        self.queue.enqueue(effects)?;

        Ok(new_state)
    }

    /// Wraps a reducer into the synchronous shape a base store expects
    pub fn enhance<S, R>(&self, reducer: R) -> BaseReducer<S, A>
    where
        S: 'static,
        R: Reducer<S, A, O> + 'static,
    {
        let enhancer = self.clone();
        Box::new(move |state: &S, action: &A| {
            enhancer.reduce(&reducer, state, action)
        })
    }

    /// Wraps a reducer that may be missing, failing with
    /// [`SideFxError::NotAReducer`] when it is
    pub fn try_enhance<S, R>(
        &self,
        reducer: Option<R>,
    ) -> Result<BaseReducer<S, A>>
    where
        S: 'static,
        R: Reducer<S, A, O> + 'static,
    {
        reducer
            .map(|reducer| self.enhance(reducer))
            .ok_or(SideFxError::NotAReducer)
    }
}

impl<A, O> Clone for Enhancer<A, O> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
            validation: self.validation,
            advisor: Rc::clone(&self.advisor),
        }
    }
}

impl<A, O> fmt::Debug for Enhancer<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Enhancer")
            .field("validation", &self.validation)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "./enhancer_tests.rs"]
mod tests;
