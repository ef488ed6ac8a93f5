use crate::effect::{Dispatch, SideEffect};

use super::*;

struct Doubler;

impl Reducer<u32, ()> for Doubler {
    fn reduce(&self, state: &u32, _: &()) -> Reduction<u32, ()> {
        Reduction::Plain(state * 2)
    }
}

fn collect(reduction: Reduction<u32, ()>) -> Vec<Step<u32, ()>> {
    match reduction {
        Reduction::Steps(steps) => steps.collect(),
        Reduction::Plain(state) => vec![Step::State(state)],
    }
}

#[test]
fn closures_are_reducers() {
    let reducer = |state: &u32, _: &()| -> Reduction<u32, ()> {
        Reduction::from_steps(vec![
            Step::Effect(SideEffect::from_fn(|_: &Dispatch<()>| ())),
            Step::State(state + 1),
        ])
    };

    let steps = collect(reducer.reduce(&1, &()));

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].kind(), "side effect");
    assert!(matches!(steps[1], Step::State(2)));
}

#[test]
fn types_implement_reducer_directly() {
    let steps = collect(Doubler.reduce(&4, &()));

    assert!(matches!(steps[..], [Step::State(8)]));
}

#[test]
fn state_yields_a_single_step() {
    let steps = collect(Reduction::state(7));

    assert_eq!(steps.len(), 1);
    assert_eq!(format!("{:?}", steps[0]), "State(7)");
}
