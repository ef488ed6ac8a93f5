//! Store boundary: the traits a state container exposes, a minimal
//! redux-style container and the adapter that rewires a container so its
//! reducers may yield side effects.

use std::rc::Rc;

use crate::{error::Result, reducer::BaseReducer};

pub mod adapter;
pub mod basic;

pub use adapter::EffectStore;
pub use basic::{BasicStore, SubscriptionId};

/// Gets application state
pub trait StateGetter<S> {
    /// Returns a shared handle to the current state
    fn get_state(&self) -> Rc<S>;
}

/// Dispatches actions to update application state
pub trait Dispatcher<A> {
    /// Runs the current reducer against the action and commits the result
    fn dispatch(&self, action: A) -> Result<()>;
}

/// Lets callers observe state changes
pub trait SubscriptionProvider<S> {
    /// Registers a listener called after every successful dispatch
    fn subscribe(&self, listener: Box<dyn Fn(&S)>) -> SubscriptionId;

    /// Removes a listener, returning false if it was not registered
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

/// The container contract the effect adapter is built on
pub trait BaseStore<S, A>: StateGetter<S> + Dispatcher<A> {
    /// Swaps the reducer used by subsequent dispatches
    fn replace_reducer(&self, next: BaseReducer<S, A>) -> Result<()>;
}
