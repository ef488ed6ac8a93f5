//! Provides the side effect descriptor and the dispatch capability handed to
//! every side effect when it runs.

use std::{any, fmt, rc::Rc};

use crate::error::{Result, SideFxError};

type DispatchFn<A> = dyn Fn(A) -> Result<()>;

/// Cloneable capability used by side effects to dispatch further actions back
/// into the store that queued them
pub struct Dispatch<A> {
    inner: Rc<DispatchFn<A>>,
}

impl<A> Dispatch<A> {
    /// Wraps a dispatch function as a capability
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) -> Result<()> + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Dispatches an action through the wrapped function
    pub fn dispatch(&self, action: A) -> Result<()> {
        (self.inner)(action)
    }

    /// Returns true if both capabilities route to the same dispatch function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch").finish_non_exhaustive()
    }
}

type Invocation<A, O> = Box<dyn FnOnce(&Dispatch<A>) -> O>;

/// An immutable descriptor pairing a callable with its bound arguments. The
/// callable is not invoked until the store flushes its effect queue, at which
/// point it receives the store's [`Dispatch`] capability followed by the
/// bound arguments.
pub struct SideEffect<A, O = ()> {
    name: &'static str,
    invocation: Invocation<A, O>,
}

impl<A, O> SideEffect<A, O> {
    /// Creates a side effect from a callable and the arguments it will be
    /// invoked with
    pub fn new<F, Args>(callable: F, args: Args) -> Self
    where
        F: FnOnce(&Dispatch<A>, Args) -> O + 'static,
        Args: 'static,
    {
        Self {
            name: any::type_name::<F>(),
            invocation: Box::new(move |dispatch| callable(dispatch, args)),
        }
    }

    /// Creates a side effect from a callable that takes no bound arguments
    pub fn from_fn<F>(callable: F) -> Self
    where
        F: FnOnce(&Dispatch<A>) -> O + 'static,
    {
        Self {
            name: any::type_name::<F>(),
            invocation: Box::new(callable),
        }
    }

    /// Creates a side effect from a callable that may be missing, failing
    /// with [`SideFxError::InvalidEffect`] when it is
    pub fn try_new<F, Args>(callable: Option<F>, args: Args) -> Result<Self>
    where
        F: FnOnce(&Dispatch<A>, Args) -> O + 'static,
        Args: 'static,
    {
        callable
            .map(|f| Self::new(f, args))
            .ok_or(SideFxError::InvalidEffect)
    }

    /// Overrides the name reported for this side effect in logs
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Returns the name reported for this side effect in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Consumes the descriptor, invoking its callable with the given dispatch
    /// capability and the bound arguments
    pub fn invoke(self, dispatch: &Dispatch<A>) -> O {
        (self.invocation)(dispatch)
    }
}

impl<A, O> fmt::Debug for SideEffect<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideEffect")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Creates a side effect descriptor. Shorthand for [`SideEffect::new`].
pub fn side_effect<A, O, F, Args>(callable: F, args: Args) -> SideEffect<A, O>
where
    F: FnOnce(&Dispatch<A>, Args) -> O + 'static,
    Args: 'static,
{
    SideEffect::new(callable, args)
}

/// A single value produced by a reduction step
pub enum Step<S, A, O = ()> {
    /// A side effect to be queued for the next flush
    Effect(SideEffect<A, O>),
    /// A plain action yielded as if it were a side effect
    Action(A),
    /// The new state. Only valid as the final value of a reduction.
    State(S),
}

impl<S, A, O> Step<S, A, O> {
    /// Short human readable label for the kind of step
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Effect(_) => "side effect",
            Step::Action(_) => "plain action",
            Step::State(_) => "state",
        }
    }
}

impl<S, A, O> From<SideEffect<A, O>> for Step<S, A, O> {
    fn from(value: SideEffect<A, O>) -> Self {
        Step::Effect(value)
    }
}

impl<S: fmt::Debug, A: fmt::Debug, O> fmt::Debug for Step<S, A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Effect(effect) => {
                f.debug_tuple("Effect").field(effect).finish()
            }
            Step::Action(action) => {
                f.debug_tuple("Action").field(action).finish()
            }
            Step::State(state) => f.debug_tuple("State").field(state).finish(),
        }
    }
}

/// Returns true if the step is a side effect descriptor
pub fn is_descriptor<S, A, O>(step: &Step<S, A, O>) -> bool {
    matches!(step, Step::Effect(_))
}

#[cfg(test)]
#[path = "./effect_tests.rs"]
mod tests;
