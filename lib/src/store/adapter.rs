//! Adapter exposing a base container as a store whose reducers may yield
//! side effects

use std::{
    fmt,
    marker::PhantomData,
    rc::{Rc, Weak},
};

use crate::{
    diagnostics::Advisor,
    effect::Dispatch,
    enhancer::Enhancer,
    error::{Result, SideFxError},
    options::StoreOptions,
    queue::{EffectQueue, Flushed},
    reducer::{BaseReducer, Reducer},
    scheduler::Scheduler,
    store::{BaseStore, BasicStore, Dispatcher, StateGetter},
    task::DeferredTask,
};

struct Inner<S, A, O, B> {
    base: B,
    queue: Rc<EffectQueue<A, O>>,
    enhancer: Enhancer<A, O>,
    dispatch: Dispatch<A>,
    _state: PhantomData<fn() -> S>,
}

/// A store whose reducers may yield side effects.
///
/// Wraps a base container so that every reducer it runs, the initial one and
/// any replacement, is enhanced: state is committed synchronously while the
/// side effects yielded alongside it are queued and flushed on the next
/// scheduler turn. Cloning yields another handle to the same store.
pub struct EffectStore<S, A, O = (), B = BasicStore<S, A>> {
    inner: Rc<Inner<S, A, O, B>>,
}

impl<S, A, O> EffectStore<S, A, O, BasicStore<S, A>>
where
    S: 'static,
    A: 'static,
    O: 'static,
{
    /// Creates a store on top of a [`BasicStore`]
    pub fn new<R>(
        reducer: R,
        initial_state: S,
        scheduler: Rc<dyn Scheduler>,
        options: StoreOptions,
    ) -> Result<Self>
    where
        R: Reducer<S, A, O> + 'static,
    {
        Self::with_base(
            |reducer, state| Ok(BasicStore::new(reducer, state)),
            reducer,
            initial_state,
            scheduler,
            options,
        )
    }
}

impl<S, A, O, B> EffectStore<S, A, O, B>
where
    S: 'static,
    A: 'static,
    O: 'static,
    B: BaseStore<S, A> + 'static,
{
    /// Creates a store on top of the container built by `create_base`, which
    /// receives the enhanced reducer and the initial state
    pub fn with_base<R, F>(
        create_base: F,
        reducer: R,
        initial_state: S,
        scheduler: Rc<dyn Scheduler>,
        options: StoreOptions,
    ) -> Result<Self>
    where
        R: Reducer<S, A, O> + 'static,
        F: FnOnce(BaseReducer<S, A>, S) -> Result<B>,
    {
        let advisor = Rc::new(Advisor::new(options.diagnostics));
        let task = DeferredTask::new(scheduler);
        let queue = EffectQueue::new(task, Rc::clone(&advisor));
        let enhancer =
            Enhancer::new(Rc::clone(&queue), options.validation, advisor);

        let base = create_base(enhancer.enhance(reducer), initial_state)?;

        let inner = Rc::new_cyclic(|this: &Weak<Inner<S, A, O, B>>| {
            let this = this.clone();
            let dispatch = Dispatch::new(move |action| {
                this.upgrade()
                    .ok_or(SideFxError::StoreDropped)?
                    .base
                    .dispatch(action)
            });
            queue.bind(dispatch.clone());

            Inner {
                base,
                queue,
                enhancer,
                dispatch,
                _state: PhantomData,
            }
        });

        log::debug!(
            "created effect store with {:?} validation",
            options.validation
        );

        Ok(Self { inner })
    }

    /// Dispatches an action through the enhanced reducer
    pub fn dispatch(&self, action: A) -> Result<()> {
        self.inner.base.dispatch(action)
    }

    /// Returns the current state of the base container
    pub fn get_state(&self) -> Rc<S> {
        self.inner.base.get_state()
    }

    /// Enhances `next` and installs it in the base container. Side effects
    /// already queued are kept and still flush.
    pub fn replace_reducer<R>(&self, next: R) -> Result<()>
    where
        R: Reducer<S, A, O> + 'static,
    {
        log::debug!("replacing reducer");
        self.inner
            .base
            .replace_reducer(self.inner.enhancer.enhance(next))
    }

    /// Like [`EffectStore::replace_reducer`] for a reducer that may be
    /// missing, failing with [`SideFxError::NotAReducer`] when it is
    pub fn try_replace_reducer<R>(&self, next: Option<R>) -> Result<()>
    where
        R: Reducer<S, A, O> + 'static,
    {
        let enhanced = self.inner.enhancer.try_enhance(next)?;
        log::debug!("replacing reducer");
        self.inner.base.replace_reducer(enhanced)
    }

    /// Flushes queued side effects immediately, cancelling the pending
    /// deferred flush. Returns one outcome per queued entry in queue order;
    /// a cascading action that fails to dispatch keeps its slot and carries
    /// the error.
    pub fn flush_effects_now(&self) -> Vec<Flushed<O>> {
        self.inner.queue.flush()
    }

    /// Returns the dispatch capability handed to side effects
    pub fn dispatcher(&self) -> Dispatch<A> {
        self.inner.dispatch.clone()
    }

    /// Number of side effects waiting for the next flush
    pub fn pending_effects(&self) -> usize {
        self.inner.queue.len()
    }

    /// Returns true if a deferred flush is scheduled
    pub fn has_pending_flush(&self) -> bool {
        self.inner.queue.is_armed()
    }

    /// Returns the wrapped base container
    pub fn base(&self) -> &B {
        &self.inner.base
    }
}

impl<S, A, O, B> StateGetter<S> for EffectStore<S, A, O, B>
where
    S: 'static,
    A: 'static,
    O: 'static,
    B: BaseStore<S, A> + 'static,
{
    fn get_state(&self) -> Rc<S> {
        self.inner.base.get_state()
    }
}

impl<S, A, O, B> Dispatcher<A> for EffectStore<S, A, O, B>
where
    S: 'static,
    A: 'static,
    O: 'static,
    B: BaseStore<S, A> + 'static,
{
    fn dispatch(&self, action: A) -> Result<()> {
        self.inner.base.dispatch(action)
    }
}

impl<S, A, O, B> Clone for EffectStore<S, A, O, B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, A, O, B: fmt::Debug> fmt::Debug for EffectStore<S, A, O, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectStore")
            .field("base", &self.inner.base)
            .field("queue", &self.inner.queue)
            .finish()
    }
}

#[cfg(test)]
#[path = "./adapter_tests.rs"]
mod tests;
