//! FIFO queue of side effects awaiting a flush

use std::{
    cell::{Cell, RefCell},
    fmt, mem,
    rc::{Rc, Weak},
};

use crate::{
    diagnostics::{Advisor, Advisory},
    effect::{Dispatch, SideEffect},
    error::{Result, SideFxError},
    task::DeferredTask,
};

/// An entry waiting in the queue
pub enum QueuedEffect<A, O> {
    /// A side effect descriptor, invoked at flush time
    Effect(SideEffect<A, O>),
    /// A plain action yielded under permissive validation, dispatched at
    /// flush time
    Cascade(A),
}

impl<A, O> QueuedEffect<A, O> {
    fn name(&self) -> &'static str {
        match self {
            QueuedEffect::Effect(effect) => effect.name(),
            QueuedEffect::Cascade(_) => "cascading action",
        }
    }
}

/// Outcome of one queue entry, reported by [`EffectQueue::flush`] in queue
/// order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flushed<O> {
    /// Value returned by a side effect
    Effect(O),
    /// Result of dispatching a cascading action
    Dispatched(Result<()>),
}

impl<O> Flushed<O> {
    /// Returns the side effect's value, or None for a cascading action
    pub fn into_effect(self) -> Option<O> {
        match self {
            Flushed::Effect(value) => Some(value),
            Flushed::Dispatched(_) => None,
        }
    }

    /// Returns the error of a cascading action that failed to dispatch
    pub fn error(&self) -> Option<&SideFxError> {
        match self {
            Flushed::Dispatched(Err(e)) => Some(e),
            _ => None,
        }
    }
}

/// Resets the flushing flag even if a side effect panics mid-flush
struct FlushGuard<'a> {
    flushing: &'a Cell<bool>,
    previous: bool,
}

impl<'a> FlushGuard<'a> {
    fn enter(flushing: &'a Cell<bool>) -> Self {
        let previous = flushing.replace(true);
        Self { flushing, previous }
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.flushing.set(self.previous);
    }
}

/// Accumulates side effects across synchronous reductions and arms a
/// [`DeferredTask`] to flush them on the next scheduling turn.
///
/// The queue is swapped out atomically at the start of every flush, so side
/// effects enqueued while a flush is running always wait for the following
/// flush.
pub struct EffectQueue<A, O> {
    queue: RefCell<Vec<QueuedEffect<A, O>>>,
    task: DeferredTask,
    dispatch: RefCell<Option<Dispatch<A>>>,
    flushing: Cell<bool>,
    advisor: Rc<Advisor>,
    this: Weak<EffectQueue<A, O>>,
}

impl<A: 'static, O: 'static> EffectQueue<A, O> {
    pub(crate) fn new(task: DeferredTask, advisor: Rc<Advisor>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            queue: RefCell::new(Vec::new()),
            task,
            dispatch: RefCell::new(None),
            flushing: Cell::new(false),
            advisor,
            this: this.clone(),
        })
    }

    /// Binds the dispatch capability handed to side effects at flush time
    pub(crate) fn bind(&self, dispatch: Dispatch<A>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    /// Appends side effects to the tail of the queue, arming the deferred
    /// flush if the queue was idle. The flush is armed before anything is
    /// appended, so a failure leaves the queue untouched.
    pub fn enqueue<I>(&self, effects: I) -> Result<()>
    where
        I: IntoIterator<Item = QueuedEffect<A, O>>,
    {
        let effects = effects.into_iter().collect::<Vec<_>>();

        if effects.is_empty() {
            return Ok(());
        }

        if self.flushing.get() {
            self.advisor.warn_once(Advisory::EffectsDuringFlush);
        }

        if self.is_empty() && !self.task.is_armed() {
            self.arm()?;
        }

        log::debug!("queued {} side effect(s)", effects.len());

        self.queue.borrow_mut().extend(effects);

        Ok(())
    }

    fn arm(&self) -> Result<()> {
        let this = self.this.clone();
        self.task.defer(move || {
            if let Some(queue) = this.upgrade() {
                let results = queue.flush();
                for e in results.iter().filter_map(Flushed::error) {
                    log::error!("failed to dispatch cascading action: {e}");
                }
                log::debug!(
                    "deferred flush ran {} side effect(s)",
                    results.len()
                );
            }
        })
    }

    /// Runs every queued entry in FIFO order and reports one [`Flushed`]
    /// outcome per entry, in the same order. Any pending deferred flush is
    /// cancelled; side effects queued while this runs are left for the next
    /// flush.
    pub fn flush(&self) -> Vec<Flushed<O>> {
        self.task.clear();

        let batch = mem::take(&mut *self.queue.borrow_mut());

        if batch.is_empty() {
            return Vec::new();
        }

        let Some(dispatch) = self.dispatch.borrow().clone() else {
            log::error!(
                "dropping {} side effect(s): no dispatch bound to queue",
                batch.len()
            );
            return Vec::new();
        };

        let _guard = FlushGuard::enter(&self.flushing);

        batch
            .into_iter()
            .map(|entry| {
                log::trace!("invoking side effect: {}", entry.name());
                match entry {
                    QueuedEffect::Effect(effect) => {
                        Flushed::Effect(effect.invoke(&dispatch))
                    }
                    QueuedEffect::Cascade(action) => {
                        Flushed::Dispatched(dispatch.dispatch(action))
                    }
                }
            })
            .collect()
    }

    /// Number of side effects waiting for the next flush
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns true if no side effects are waiting
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Returns true while a flush is running
    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }

    /// Returns true if a deferred flush is pending
    pub fn is_armed(&self) -> bool {
        self.task.is_armed()
    }
}

impl<A, O> fmt::Debug for EffectQueue<A, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectQueue")
            .field("len", &self.queue.borrow().len())
            .field("flushing", &self.flushing.get())
            .field("task", &self.task)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "./queue_tests.rs"]
mod tests;
