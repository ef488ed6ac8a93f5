use std::cell::RefCell;

use mockall::predicate::eq;

use crate::{
    diagnostics::{Advisory, MockDiagnostics},
    effect::{SideEffect, Step, side_effect},
    options::Validation,
    reducer::Reduction,
    scheduler::EventLoop,
    store::SubscriptionProvider,
};

use super::*;

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    First,
    Second,
    Add(u32),
    Cascade,
    Mixed,
    Broken,
}

type Record = Rc<RefCell<Vec<u32>>>;

struct Setup {
    event_loop: Rc<EventLoop>,
    store: EffectStore<u32, TestAction>,
    record: Record,
}

fn chain_reducer(
    record: Record,
) -> impl Fn(&u32, &TestAction) -> Reduction<u32, TestAction> {
    move |state: &u32, action: &TestAction| match action {
        TestAction::First => Reduction::from_steps(vec![
            Step::Effect(side_effect(
                |dispatch: &Dispatch<TestAction>, ()| {
                    dispatch.dispatch(TestAction::Second).unwrap();
                },
                (),
            )),
            Step::State(*state),
        ]),
        TestAction::Second => {
            let record = Rc::clone(&record);
            Reduction::from_steps(vec![
                Step::Effect(side_effect(
                    move |_: &Dispatch<TestAction>, value: u32| {
                        record.borrow_mut().push(value);
                    },
                    42,
                )),
                Step::State(state + 1),
            ])
        }
        TestAction::Add(n) => Reduction::state(state + n),
        TestAction::Cascade => Reduction::from_steps(vec![
            Step::Action(TestAction::Add(5)),
            Step::State(*state),
        ]),
        TestAction::Mixed => {
            let record = Rc::clone(&record);
            Reduction::from_steps(vec![
                Step::Action(TestAction::Add(5)),
                Step::Effect(side_effect(
                    move |_: &Dispatch<TestAction>, value: u32| {
                        record.borrow_mut().push(value);
                    },
                    42,
                )),
                Step::Action(TestAction::Broken),
                Step::State(*state),
            ])
        }
        TestAction::Broken => Reduction::from_steps(Vec::new()),
    }
}

fn setup_with_options(options: StoreOptions) -> Setup {
    let event_loop = Rc::new(EventLoop::new());
    let record: Record = Rc::new(RefCell::new(Vec::new()));
    let store = EffectStore::new(
        chain_reducer(Rc::clone(&record)),
        0,
        Rc::clone(&event_loop) as Rc<dyn Scheduler>,
        options,
    )
    .unwrap();

    Setup {
        event_loop,
        store,
        record,
    }
}

fn setup() -> Setup {
    setup_with_options(StoreOptions::default())
}

#[test]
fn reentrant_dispatch_from_an_effect_settles_after_two_turns() {
    let s = setup();
    let expected = s.store.dispatcher();
    let seen_dispatch = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen_dispatch);
    s.store
        .replace_reducer(move |state: &u32, action: &TestAction| {
            let sink = Rc::clone(&sink);
            match action {
                TestAction::First => Reduction::from_steps(vec![
                    Step::Effect(side_effect(
                        |dispatch: &Dispatch<TestAction>, ()| {
                            dispatch.dispatch(TestAction::Second).unwrap();
                        },
                        (),
                    )),
                    Step::State(*state),
                ]),
                TestAction::Second => Reduction::from_steps(vec![
                    Step::Effect(side_effect(
                        move |dispatch: &Dispatch<TestAction>, value: u32| {
                            sink.borrow_mut().push((value, dispatch.clone()));
                        },
                        42,
                    )),
                    Step::State(state + 1),
                ]),
                _ => Reduction::state(*state),
            }
        })
        .unwrap();

    s.store.dispatch(TestAction::First).unwrap();
    assert!(seen_dispatch.borrow().is_empty());

    assert!(s.event_loop.run_turn());
    assert!(seen_dispatch.borrow().is_empty());
    assert!(s.store.has_pending_flush());

    assert!(s.event_loop.run_turn());
    assert!(!s.event_loop.run_turn());

    let seen = seen_dispatch.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, 42);
    assert!(seen[0].1.ptr_eq(&expected));
    assert_eq!(*s.store.get_state(), 1);
}

#[test]
fn built_in_chain_records_once() {
    let s = setup();

    s.store.dispatch(TestAction::First).unwrap();
    assert_eq!(s.event_loop.run_until_idle(), 2);

    assert_eq!(*s.record.borrow(), vec![42]);
}

#[test]
fn effects_from_separate_dispatches_share_one_flush() {
    let event_loop = Rc::new(EventLoop::new());
    let store: EffectStore<u32, u32, u32> = EffectStore::new(
        |state: &u32, action: &u32| {
            let effects = (0..*action).map(|i| {
                Step::Effect(SideEffect::new(
                    |_: &Dispatch<u32>, v: u32| v,
                    state + i,
                ))
            });
            Reduction::from_steps(
                effects
                    .chain(std::iter::once(Step::State(state + action)))
                    .collect::<Vec<_>>(),
            )
        },
        1,
        Rc::clone(&event_loop) as Rc<dyn Scheduler>,
        StoreOptions::default(),
    )
    .unwrap();

    // E1, E2 from the first dispatch, E3 from the second
    store.dispatch(2).unwrap();
    store.dispatch(1).unwrap();

    assert_eq!(store.pending_effects(), 3);
    assert_eq!(event_loop.pending(), 1);
    assert_eq!(*store.get_state(), 4);

    let results = store
        .flush_effects_now()
        .into_iter()
        .filter_map(Flushed::into_effect)
        .collect::<Vec<_>>();
    assert_eq!(results, vec![1, 2, 3]);
    assert!(event_loop.is_idle());
}

#[test]
fn every_effect_in_a_flush_receives_the_store_dispatch() {
    let event_loop = Rc::new(EventLoop::new());
    let store: EffectStore<u32, u32, Dispatch<u32>> = EffectStore::new(
        |state: &u32, _: &u32| {
            let echo = || {
                Step::Effect(SideEffect::from_fn(|d: &Dispatch<u32>| d.clone()))
            };
            Reduction::from_steps(vec![echo(), echo(), Step::State(*state)])
        },
        0,
        Rc::clone(&event_loop) as Rc<dyn Scheduler>,
        StoreOptions::default(),
    )
    .unwrap();

    store.dispatch(0).unwrap();
    store.dispatch(0).unwrap();

    let dispatches = store.flush_effects_now();
    assert_eq!(dispatches.len(), 4);
    assert!(dispatches.iter().all(|flushed| match flushed {
        Flushed::Effect(d) => d.ptr_eq(&store.dispatcher()),
        Flushed::Dispatched(_) => false,
    }));
}

#[test]
fn manual_flush_cancels_the_deferred_turn() {
    let s = setup();

    s.store.dispatch(TestAction::Second).unwrap();
    assert!(s.store.has_pending_flush());

    assert_eq!(s.store.flush_effects_now(), vec![Flushed::Effect(())]);
    assert_eq!(*s.record.borrow(), vec![42]);
    assert!(!s.store.has_pending_flush());

    // the cancelled turn never runs the effect a second time
    assert_eq!(s.event_loop.run_until_idle(), 0);
    assert_eq!(s.record.borrow().len(), 1);
}

#[test]
fn replacing_the_reducer_keeps_queued_effects() {
    let s = setup();

    s.store.dispatch(TestAction::Second).unwrap();
    s.store
        .replace_reducer(|state: &u32, _: &TestAction| {
            Reduction::<u32, TestAction>::state(state * 10)
        })
        .unwrap();

    assert_eq!(s.store.pending_effects(), 1);

    s.store.dispatch(TestAction::Add(1)).unwrap();
    assert_eq!(*s.store.get_state(), 10);

    s.event_loop.run_until_idle();
    assert_eq!(*s.record.borrow(), vec![42]);
}

#[test]
fn try_replace_reducer_rejects_missing_reducer() {
    let s = setup();
    let missing: Option<fn(&u32, &TestAction) -> Reduction<u32, TestAction>> =
        None;

    let result = s.store.try_replace_reducer(missing);

    assert_eq!(result.unwrap_err(), SideFxError::NotAReducer);

    // the original reducer is still installed
    s.store.dispatch(TestAction::Add(3)).unwrap();
    assert_eq!(*s.store.get_state(), 3);
}

#[test]
fn invalid_reduction_commits_nothing() {
    let s = setup();

    s.store
        .replace_reducer(|_: &u32, _: &TestAction| {
            Reduction::<u32, TestAction>::from_steps(Vec::new())
        })
        .unwrap();

    let result = s.store.dispatch(TestAction::Add(1));

    assert_eq!(result.unwrap_err(), SideFxError::MissingState);
    assert_eq!(*s.store.get_state(), 0);
    assert_eq!(s.store.pending_effects(), 0);
    assert!(s.event_loop.is_idle());
}

#[test]
fn strict_store_rejects_cascading_actions() {
    let s = setup();

    let result = s.store.dispatch(TestAction::Cascade);

    assert_eq!(
        result.unwrap_err(),
        SideFxError::InvalidEffectDescriptor {
            position: 0,
            found: "plain action",
        }
    );
}

#[test]
fn permissive_store_dispatches_cascading_actions_at_flush() {
    let mut sink = MockDiagnostics::new();
    sink.expect_warn()
        .with(eq(Advisory::CascadingAction))
        .times(1)
        .return_const(());

    let options = StoreOptions::builder()
        .validation(Validation::Permissive)
        .diagnostics(Rc::new(sink) as Rc<dyn crate::diagnostics::Diagnostics>)
        .build()
        .unwrap();
    let s = setup_with_options(options);

    s.store.dispatch(TestAction::Cascade).unwrap();
    s.store.dispatch(TestAction::Cascade).unwrap();
    assert_eq!(*s.store.get_state(), 0);

    s.event_loop.run_until_idle();
    assert_eq!(*s.store.get_state(), 10);
}

#[test]
fn manual_flush_reports_every_entry_of_a_mixed_batch() {
    let options = StoreOptions::builder()
        .validation(Validation::Permissive)
        .build()
        .unwrap();
    let s = setup_with_options(options);

    s.store.dispatch(TestAction::Mixed).unwrap();
    assert_eq!(s.store.pending_effects(), 3);

    let results = s.store.flush_effects_now();

    assert_eq!(
        results,
        vec![
            Flushed::Dispatched(Ok(())),
            Flushed::Effect(()),
            Flushed::Dispatched(Err(SideFxError::MissingState)),
        ]
    );
    assert_eq!(*s.store.get_state(), 5);
    assert_eq!(*s.record.borrow(), vec![42]);
    assert!(!s.store.has_pending_flush());
}

#[test]
fn deferred_flush_survives_a_failing_cascade() {
    let options = StoreOptions::builder()
        .validation(Validation::Permissive)
        .build()
        .unwrap();
    let s = setup_with_options(options);

    s.store.dispatch(TestAction::Mixed).unwrap();
    assert_eq!(s.event_loop.run_until_idle(), 1);

    assert_eq!(*s.store.get_state(), 5);
    assert_eq!(*s.record.borrow(), vec![42]);
    assert_eq!(s.store.pending_effects(), 0);
}

#[test]
fn dispatch_after_drop_fails() {
    let s = setup();
    let dispatch = s.store.dispatcher();

    dispatch.dispatch(TestAction::Add(2)).unwrap();
    assert_eq!(*s.store.get_state(), 2);

    drop(s.store);

    assert_eq!(
        dispatch.dispatch(TestAction::Add(1)).unwrap_err(),
        SideFxError::StoreDropped
    );
}

#[test]
fn pending_flush_is_dropped_with_the_store() {
    let s = setup();

    s.store.dispatch(TestAction::Second).unwrap();
    drop(s.store);

    assert_eq!(s.event_loop.run_until_idle(), 1);
    assert!(s.record.borrow().is_empty());
}

#[test]
fn subscribers_see_committed_state_before_effects_run() {
    let s = setup();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let record = Rc::clone(&s.record);
    s.store.base().subscribe(Box::new(move |state: &u32| {
        sink.borrow_mut().push((*state, record.borrow().len()));
    }));

    s.store.dispatch(TestAction::Second).unwrap();
    s.event_loop.run_until_idle();

    assert_eq!(*seen.borrow(), vec![(1, 0)]);
    assert_eq!(s.record.borrow().len(), 1);
}

#[test]
fn wraps_custom_base_containers() {
    let event_loop = Rc::new(EventLoop::new());
    let record: Record = Rc::new(RefCell::new(Vec::new()));

    let store: EffectStore<u32, TestAction> = EffectStore::with_base(
        |reducer, state| {
            BasicStore::with_init_action(reducer, state, || TestAction::Add(1))
        },
        chain_reducer(Rc::clone(&record)),
        0,
        Rc::clone(&event_loop) as Rc<dyn Scheduler>,
        StoreOptions::default(),
    )
    .unwrap();
    assert_eq!(*store.get_state(), 1);

    store
        .replace_reducer(chain_reducer(Rc::clone(&record)))
        .unwrap();
    assert_eq!(*store.get_state(), 2);
}
