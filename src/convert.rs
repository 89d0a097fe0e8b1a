use std::collections::BTreeSet;

use tracing::{debug, error, trace};

use crate::{math::Map, prelude::*};

/// Identifies a state of a Moore machine that was obtained from a Mealy machine: the Mealy
/// state together with the output with which it is entered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SplitKey {
    /// The Mealy state.
    pub state: StateId,
    /// The output with which `state` is entered.
    pub output: Symbol,
}

impl SplitKey {
    /// Creates a new key.
    pub fn new<S: Into<Symbol>>(state: StateId, output: S) -> Self {
        Self {
            state,
            output: output.into(),
        }
    }
}

impl MooreMachine {
    /// Pushes the state outputs onto the incoming transitions. The states stay the same and
    /// every defined transition emits the output of the state that it leads to. Undefined
    /// transitions stay undefined.
    ///
    /// The output of a state that is never entered, typically the initial state, has no
    /// transition to move to and is lost. [`MealyMachine::to_moore`] gives such a state the
    /// blank output, so a round trip only restores the machine if every state with a
    /// non-blank output is entered.
    pub fn to_mealy(&self) -> MealyMachine {
        let transitions = (0..self.inputs().len())
            .map(|input| {
                (0..self.size())
                    .map(|state| match self.target(input, state) {
                        Ok(target) => target.and_then(|p| {
                            self.output(p).map(|output| MealyCell::new(p, output.clone()))
                        }),
                        Err(e) => {
                            error!("{e}");
                            None
                        }
                    })
                    .collect()
            })
            .collect();
        MealyMachine::from_parts_unchecked(self.inputs().clone(), self.states().clone(), transitions)
    }
}

impl MealyMachine {
    /// For every state, collects the distinct outputs with which it is entered. The table is
    /// scanned state by state and within a state input by input.
    pub fn entering_outputs(&self) -> Vec<BTreeSet<&Symbol>> {
        let mut entering = vec![BTreeSet::new(); self.size()];
        for state in 0..self.size() {
            for input in 0..self.inputs().len() {
                match self.cell(input, state) {
                    Ok(Some(cell)) => {
                        if let Some(outputs) = entering.get_mut(cell.target) {
                            outputs.insert(&cell.output);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => error!("{e}"),
                }
            }
        }
        entering
    }

    /// Converts `self` into an equivalent [`MooreMachine`].
    ///
    /// If every state is always entered with the same output, the states are kept as they
    /// are and each state outputs what its incoming transitions emit. A state that is never
    /// entered (usually only the initial state) gets the blank output.
    ///
    /// Otherwise each state is split into one Moore state per distinct output with which it
    /// is entered. The new states are labelled with the state prefix followed by a counter.
    /// Numbers are handed out first to the initial state and then to the states in the order
    /// in which they are first seen as a target when scanning the table state by state; the
    /// outputs of one state are numbered in sorted order.
    pub fn to_moore(&self, markers: &Markers) -> MooreMachine {
        let Some(initial) = self.initial() else {
            return MooreMachine::empty();
        };
        let entering = self.entering_outputs();

        if entering.iter().all(|outputs| outputs.len() <= 1) {
            debug!("no state needs to be split, relabelling 1:1");
            let outputs = entering
                .iter()
                .map(|outputs| {
                    outputs
                        .first()
                        .map(|o| o.to_string())
                        .unwrap_or_else(|| markers.blank_output.clone())
                })
                .collect();
            let transitions = self
                .rows()
                .iter()
                .map(|row| {
                    (0..self.size())
                        .map(|q| row.get(q).and_then(|c| c.as_ref()).map(|c| c.target))
                        .collect()
                })
                .collect();
            return MooreMachine::from_parts_unchecked(
                self.inputs().clone(),
                self.states().clone(),
                outputs,
                transitions,
            );
        }

        let mut split = Splitter::default();
        split.assign(initial, &entering, markers);
        for state in 0..self.size() {
            for input in 0..self.inputs().len() {
                if let Ok(Some(cell)) = self.cell(input, state) {
                    split.assign(cell.target, &entering, markers);
                }
            }
        }
        debug!(
            "split {} mealy states into {} moore states",
            self.size(),
            split.labels.len()
        );

        let transitions = (0..self.inputs().len())
            .map(|input| {
                split
                    .origin
                    .iter()
                    .map(|q| {
                        let cell = self.cell(input, *q).ok().flatten()?;
                        split
                            .keys
                            .get(&SplitKey::new(cell.target, cell.output.clone()))
                            .copied()
                    })
                    .collect()
            })
            .collect();
        MooreMachine::from_parts_unchecked(
            self.inputs().clone(),
            split.labels.into_iter().collect(),
            split.outputs,
            transitions,
        )
    }
}

/// Bookkeeping for the synthesized Moore states.
#[derive(Debug, Default)]
struct Splitter {
    keys: Map<SplitKey, StateId>,
    labels: Vec<Symbol>,
    outputs: Vec<Symbol>,
    origin: Vec<StateId>,
    done: math::Set<StateId>,
}

impl Splitter {
    /// Creates the Moore states for all outputs of `state`, unless that already happened.
    fn assign(&mut self, state: StateId, entering: &[BTreeSet<&Symbol>], markers: &Markers) {
        if !self.done.insert(state) {
            return;
        }
        let outputs = match entering.get(state) {
            Some(outputs) if !outputs.is_empty() => outputs.iter().map(|o| o.to_string()).collect(),
            _ => vec![markers.blank_output.clone()],
        };
        for output in outputs {
            let id = self.labels.len();
            let label = markers.state_label(id);
            trace!("({state}, {output}) becomes {label}");
            self.keys.insert(SplitKey::new(state, output.clone()), id);
            self.labels.push(label);
            self.outputs.push(output);
            self.origin.push(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    #[test]
    fn moore_to_mealy_moves_outputs_to_transitions() {
        let moore = MooreMachine::builder()
            .with_states([("a", "x"), ("b", "y")])
            .with_transitions([("a", "0", "b"), ("b", "0", "a"), ("b", "1", "b")])
            .build()
            .unwrap();
        let mealy = moore.to_mealy();
        assert_eq!(mealy.states(), moore.states());
        assert_eq!(mealy.cell(0, 0).unwrap(), Some(&MealyCell::new(1, "y")));
        assert_eq!(mealy.cell(0, 1).unwrap(), Some(&MealyCell::new(0, "x")));
        assert_eq!(mealy.cell(1, 0).unwrap(), None);
        assert_eq!(mealy.cell(1, 1).unwrap(), Some(&MealyCell::new(1, "y")));
    }

    #[test_log::test]
    fn mealy_to_moore_splits_states_entered_with_different_outputs() {
        let markers = Markers::default();
        let mealy = MealyMachine::builder()
            .with_states(["q0", "q1", "q2"])
            .with_transitions([
                ("q0", "a", "q1", "0"),
                ("q0", "b", "q2", "0"),
                ("q2", "a", "q1", "1"),
                ("q2", "b", "q0", "0"),
                ("q1", "a", "q1", "0"),
                ("q1", "b", "q0", "1"),
            ])
            .build()
            .unwrap();
        let moore = mealy.to_moore(&markers);

        // q0 is entered with 0 and 1, q1 with 0 and 1, q2 only with 0
        assert_eq!(moore.size(), 5);
        assert_eq!(moore.states().to_vec(), vec!["q0", "q1", "q2", "q3", "q4"]);
        assert_eq!(moore.outputs(), &["0", "1", "0", "1", "0"]);
        let origins = ["q0", "q0", "q1", "q1", "q2"];
        for (i, j) in (0..5).tuple_combinations() {
            if origins[i] == origins[j] {
                assert_ne!(moore.output(i), moore.output(j));
            }
        }
        // the outputs of every run agree
        let words: [&[&str]; 5] = [&["a"], &["b", "a"], &["a", "b"], &["b", "b", "a", "a"], &["a", "b", "b"]];
        for word in words {
            assert_eq!(
                moore.map(word.iter().copied()),
                mealy.map(word.iter().copied())
            );
        }
    }

    #[test]
    fn initial_state_without_incoming_transitions_gets_blank_output() {
        let markers = Markers::default();
        let mealy = MealyMachine::builder()
            .with_states(["s", "t"])
            .with_transitions([("s", "a", "t", "1"), ("t", "a", "t", "1")])
            .build()
            .unwrap();
        let moore = mealy.to_moore(&markers);
        assert_eq!(moore.states(), mealy.states());
        assert_eq!(moore.outputs(), &["_", "1"]);
    }

    #[test]
    fn round_trip_without_splitting_is_isomorphic() {
        let markers = Markers::default();
        let moore = MooreMachine::builder()
            .with_states([("s0", "u"), ("s1", "v"), ("s2", "v"), ("s3", "w")])
            .with_transitions([
                ("s0", "x", "s1"),
                ("s0", "y", "s2"),
                ("s1", "x", "s3"),
                ("s1", "y", "s0"),
                ("s2", "x", "s3"),
                ("s3", "x", "s0"),
                ("s3", "y", "s3"),
            ])
            .build()
            .unwrap()
            .trim();
        let back = moore.to_mealy().to_moore(&markers);
        assert_eq!(back, moore);
    }

    #[test]
    fn output_of_initial_state_that_is_never_entered_is_lost() {
        let markers = Markers::default();
        let moore = MooreMachine::builder()
            .with_states([("s0", "1"), ("s1", "0")])
            .with_transitions([("s0", "a", "s1"), ("s1", "a", "s1")])
            .build()
            .unwrap();
        let back = moore.to_mealy().to_moore(&markers);
        assert_eq!(back.outputs(), &["_", "0"]);
        assert_eq!(back.rows(), moore.rows());
        assert_ne!(back, moore);
    }
}
