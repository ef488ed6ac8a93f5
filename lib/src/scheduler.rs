//! Cooperative, single threaded scheduling of deferred jobs
//!
//! A [`Scheduler`] runs jobs on a later "turn", never on the stack that
//! scheduled them. [`EventLoop`] is a macrotask queue whose turns are driven
//! explicitly by the host.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    fmt,
};

#[cfg(test)]
use mockall::automock;

/// One-shot unit of work run on a scheduling turn
pub type Job = Box<dyn FnOnce()>;

/// Identifies a scheduled job so it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TurnId(pub u64);

impl fmt::Display for TurnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "turn#{}", self.0)
    }
}

/// Defers jobs to a later scheduling turn. Implementations must never run a
/// job before `schedule` has returned.
#[cfg_attr(test, automock)]
pub trait Scheduler {
    /// Schedules a job to run on a later turn
    fn schedule(&self, job: Job) -> TurnId;
    /// Cancels a scheduled job. Returns false if it already ran or was
    /// cancelled.
    fn cancel(&self, id: TurnId) -> bool;
}

/// Single threaded macrotask queue. Each call to [`EventLoop::run_turn`]
/// runs exactly one job; jobs scheduled while a turn runs are queued behind
/// every job already pending.
#[derive(Default)]
pub struct EventLoop {
    next_id: Cell<u64>,
    jobs: RefCell<VecDeque<(TurnId, Job)>>,
}

impl EventLoop {
    /// Returns a new, empty event loop
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the oldest pending job. Returns false if nothing was pending.
    pub fn run_turn(&self) -> bool {
        // release the queue borrow before running so the job may schedule
        let next = self.jobs.borrow_mut().pop_front();

        match next {
            Some((id, job)) => {
                log::trace!("running {id}");
                job();
                true
            }
            None => false,
        }
    }

    /// Runs turns until no jobs remain, returning the number of turns run
    pub fn run_until_idle(&self) -> usize {
        let mut turns = 0;
        while self.run_turn() {
            turns += 1;
        }
        turns
    }

    /// Number of jobs waiting for a turn
    pub fn pending(&self) -> usize {
        self.jobs.borrow().len()
    }

    /// Returns true if no jobs are waiting
    pub fn is_idle(&self) -> bool {
        self.jobs.borrow().is_empty()
    }
}

impl Scheduler for EventLoop {
    fn schedule(&self, job: Job) -> TurnId {
        let id = TurnId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.jobs.borrow_mut().push_back((id, job));
        log::trace!("scheduled {id}");
        id
    }

    fn cancel(&self, id: TurnId) -> bool {
        let removed = {
            let mut jobs = self.jobs.borrow_mut();
            jobs.iter()
                .position(|(queued, _)| *queued == id)
                .and_then(|index| jobs.remove(index))
        };

        match removed {
            Some(_) => {
                log::trace!("cancelled {id}");
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
#[path = "./scheduler_tests.rs"]
mod tests;
