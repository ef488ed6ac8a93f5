//! Minimal redux-style container

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use crate::{
    error::{Result, SideFxError},
    reducer::BaseReducer,
    store::{BaseStore, Dispatcher, StateGetter, SubscriptionProvider},
};

/// Identifies a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<S> = Rc<dyn Fn(&S)>;

/// Marks the store as reducing and clears the mark even if the reducer panics
struct ReducingGuard<'a>(&'a Cell<bool>);

impl<'a> ReducingGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for ReducingGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Centralized state container
pub struct BasicStore<S, A> {
    state: RefCell<Rc<S>>,
    reducer: RefCell<Rc<dyn Fn(&S, &A) -> Result<S>>>,
    reducing: Cell<bool>,
    listeners: RefCell<Vec<(SubscriptionId, Listener<S>)>>,
    next_subscription: Cell<u64>,
    init_action: Option<Box<dyn Fn() -> A>>,
}

impl<S, A> BasicStore<S, A> {
    /// Creates a new store holding the initial state
    pub fn new(reducer: BaseReducer<S, A>, initial_state: S) -> Self {
        Self {
            state: RefCell::new(Rc::new(initial_state)),
            reducer: RefCell::new(Rc::from(reducer)),
            reducing: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            next_subscription: Cell::new(0),
            init_action: None,
        }
    }

    /// Creates a new store and dispatches the action built by `init`. The
    /// same action is dispatched again every time the reducer is replaced.
    pub fn with_init_action<F>(
        reducer: BaseReducer<S, A>,
        initial_state: S,
        init: F,
    ) -> Result<Self>
    where
        F: Fn() -> A + 'static,
    {
        let mut store = Self::new(reducer, initial_state);
        store.init_action = Some(Box::new(init));
        store.dispatch_init()?;
        Ok(store)
    }

    /// Returns the number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn dispatch_init(&self) -> Result<()> {
        match self.init_action.as_ref() {
            Some(init) => self.dispatch(init()),
            None => Ok(()),
        }
    }

    fn notify(&self) {
        let state = self.get_state();
        let listeners = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect::<Vec<_>>();

        for listener in listeners {
            listener(&state);
        }
    }
}

impl<S, A> StateGetter<S> for BasicStore<S, A> {
    fn get_state(&self) -> Rc<S> {
        self.state.borrow().clone()
    }
}

impl<S, A> Dispatcher<A> for BasicStore<S, A> {
    fn dispatch(&self, action: A) -> Result<()> {
        if self.reducing.get() {
            return Err(SideFxError::DispatchInReducer);
        }

        let reducer = self.reducer.borrow().clone();
        let current = self.get_state();

        let next = {
            let _guard = ReducingGuard::enter(&self.reducing);
            reducer(&current, &action)?
        };

        *self.state.borrow_mut() = Rc::new(next);

        self.notify();

        Ok(())
    }
}

impl<S, A> SubscriptionProvider<S> for BasicStore<S, A> {
    fn subscribe(&self, listener: Box<dyn Fn(&S)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::from(listener)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

impl<S, A> BaseStore<S, A> for BasicStore<S, A> {
    fn replace_reducer(&self, next: BaseReducer<S, A>) -> Result<()> {
        *self.reducer.borrow_mut() = Rc::from(next);
        self.dispatch_init()
    }
}

impl<S: fmt::Debug, A> fmt::Debug for BasicStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicStore")
            .field("state", &self.state.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "./basic_tests.rs"]
mod tests;
