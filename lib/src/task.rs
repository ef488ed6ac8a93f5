//! A single-slot deferred task

use std::{cell::Cell, fmt, rc::Rc};

use crate::{
    error::{Result, SideFxError},
    scheduler::{Scheduler, TurnId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    generation: u64,
    turn: Option<TurnId>,
}

/// Manages a single deferrable callback. While a callback is armed no other
/// callback may be deferred; once it fires, or is cleared, the task opens up
/// for a new one.
pub struct DeferredTask {
    scheduler: Rc<dyn Scheduler>,
    slot: Rc<Cell<Option<Armed>>>,
    generation: Cell<u64>,
}

impl DeferredTask {
    /// Returns a new, idle task using the given scheduler
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            slot: Rc::new(Cell::new(None)),
            generation: Cell::new(0),
        }
    }

    /// Checks if a callback is set to run on a future turn
    pub fn is_armed(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Defers a callback to the next scheduling turn. Fails with
    /// [`SideFxError::AlreadyArmed`] if a callback is already pending, in
    /// which case the pending callback is left untouched.
    pub fn defer<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce() + 'static,
    {
        if self.is_armed() {
            return Err(SideFxError::AlreadyArmed);
        }

        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.slot.set(Some(Armed {
            generation,
            turn: None,
        }));

        let slot = Rc::clone(&self.slot);

        let turn = self.scheduler.schedule(Box::new(move || {
            // a stale turn belongs to a callback that was already cleared
            if slot.get().map(|armed| armed.generation) != Some(generation) {
                return;
            }
            slot.set(None);
            callback();
        }));

        if self.slot.get().map(|armed| armed.generation) == Some(generation) {
            self.slot.set(Some(Armed {
                generation,
                turn: Some(turn),
            }));
        }

        log::trace!("deferred task armed on {turn}");

        Ok(())
    }

    /// Clears the pending callback, if any. A cleared callback never runs.
    pub fn clear(&self) {
        if let Some(turn) = self.slot.take().and_then(|armed| armed.turn) {
            self.scheduler.cancel(turn);
            log::trace!("deferred task cleared from {turn}");
        }
    }
}

impl fmt::Debug for DeferredTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredTask")
            .field("armed", &self.is_armed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "./task_tests.rs"]
mod tests;
