//! Library package for running side effects out of redux-style reducers
//!
//! Reducers return a lazy sequence of [`effect::Step`]s: zero or more side
//! effect descriptors followed by the new state. The [`store::EffectStore`]
//! commits the state synchronously, queues the descriptors and invokes them
//! on the next turn of a [`scheduler::Scheduler`], handing each one the
//! store's [`effect::Dispatch`] capability.
//!
//! # Examples
//!
//! ```
//! use std::{cell::RefCell, rc::Rc};
//!
//! use r_sidefx::{
//!     effect::{Dispatch, Step, side_effect},
//!     options::StoreOptions,
//!     reducer::Reduction,
//!     scheduler::{EventLoop, Scheduler},
//!     store::EffectStore,
//! };
//!
//! let event_loop = Rc::new(EventLoop::new());
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&log);
//!
//! let store: EffectStore<u32, u32> = EffectStore::new(
//!     move |state: &u32, amount: &u32| {
//!         let sink = Rc::clone(&sink);
//!         let next = state + amount;
//!         Reduction::from_steps(vec![
//!             Step::Effect(side_effect(
//!                 move |_: &Dispatch<u32>, next: u32| {
//!                     sink.borrow_mut().push(next)
//!                 },
//!                 next,
//!             )),
//!             Step::State(next),
//!         ])
//!     },
//!     0,
//!     Rc::clone(&event_loop) as Rc<dyn Scheduler>,
//!     StoreOptions::default(),
//! )
//! .unwrap();
//!
//! store.dispatch(2).unwrap();
//! assert_eq!(*store.get_state(), 2);
//! assert!(log.borrow().is_empty());
//!
//! event_loop.run_until_idle();
//! assert_eq!(*log.borrow(), vec![2]);
//! ```

#![deny(missing_docs)]
pub mod combine;
pub mod diagnostics;
pub mod effect;
pub mod enhancer;
pub mod error;
pub mod options;
pub mod queue;
pub mod reducer;
pub mod scheduler;
pub mod separator;
pub mod store;
pub mod task;
