use owo_colors::OwoColorize;

use crate::{
    prelude::*,
    table::{reachable::MinimalRepresentatives, render_table},
};

use super::{input_label, reindex, validate_rows, MooreBuilder};

/// A Moore machine is a transition table where each state has an output. Running a word
/// produces the output of the state that is reached, in particular the empty word produces
/// the output of the initial state.
///
/// The transitions are stored row by row, one row per input symbol, and each row holds one
/// optional target per state. A missing target is an undefined transition. Rows that were
/// read from a malformed table may be shorter than the number of states, accessing a cell
/// beyond the end of such a row gives a [`ConsistencyError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MooreMachine {
    inputs: Labels,
    states: Labels,
    outputs: Vec<Symbol>,
    transitions: Vec<Vec<Option<StateId>>>,
}

impl MooreMachine {
    /// Instantiates a new [`MooreBuilder`].
    pub fn builder() -> MooreBuilder {
        MooreBuilder::default()
    }

    /// Creates a machine from its parts. `outputs` holds one output per state and
    /// `transitions` one row per input. Every target has to refer to an existing state.
    pub fn from_parts(
        inputs: Labels,
        states: Labels,
        outputs: Vec<Symbol>,
        transitions: Vec<Vec<Option<StateId>>>,
    ) -> Result<Self, ConstructionError> {
        if outputs.len() != states.len() {
            return Err(ConstructionError::OutputCount {
                states: states.len(),
                outputs: outputs.len(),
            });
        }
        validate_rows(&inputs, states.len(), &transitions, |cell| *cell)?;
        Ok(Self {
            inputs,
            states,
            outputs,
            transitions,
        })
    }

    /// Assembles a machine whose parts are known to be consistent, as is the case for the
    /// results of the transformations in this crate.
    pub(crate) fn from_parts_unchecked(
        inputs: Labels,
        states: Labels,
        outputs: Vec<Symbol>,
        transitions: Vec<Vec<Option<StateId>>>,
    ) -> Self {
        debug_assert_eq!(outputs.len(), states.len());
        debug_assert!(validate_rows(&inputs, states.len(), &transitions, |cell| *cell).is_ok());
        Self {
            inputs,
            states,
            outputs,
            transitions,
        }
    }

    /// Returns a machine without any states or inputs.
    pub fn empty() -> Self {
        Self {
            inputs: Labels::new(),
            states: Labels::new(),
            outputs: vec![],
            transitions: vec![],
        }
    }

    /// The outputs of all states, in the order of the states.
    pub fn outputs(&self) -> &[Symbol] {
        &self.outputs
    }

    /// The output of `state`.
    pub fn output(&self, state: StateId) -> Option<&Symbol> {
        self.outputs.get(state)
    }

    /// The raw transition rows, one per input.
    pub fn rows(&self) -> &[Vec<Option<StateId>>] {
        &self.transitions
    }

    /// Returns the target of the transition from `state` on `input`, `Ok(None)` if the
    /// transition is undefined.
    pub fn target(&self, input: InputId, state: StateId) -> Result<Option<StateId>, ConsistencyError> {
        let row = self
            .transitions
            .get(input)
            .ok_or(ConsistencyError::InputOutOfRange(input))?;
        row.get(state)
            .copied()
            .ok_or_else(|| ConsistencyError::StateOutOfRange {
                input: input_label(&self.inputs, input),
                state,
                len: row.len(),
            })
    }

    /// Runs the given word from the initial state and returns the output of the state that
    /// is reached. If some transition on the way is undefined, `None` is returned.
    pub fn map<'w, W: IntoIterator<Item = &'w str>>(&self, word: W) -> Option<&Symbol> {
        let mut state = self.initial()?;
        for symbol in word {
            let input = self.inputs.index(symbol)?;
            state = self.target(input, state).ok().flatten()?;
        }
        self.output(state)
    }

    /// Iterates over the reachable states, each given with the input labels of its minimal
    /// access word.
    pub fn access_words(&self) -> impl Iterator<Item = (Vec<Symbol>, StateId)> + '_ {
        MinimalRepresentatives::new(self, self.initial()).map(|(word, q)| {
            (
                word.into_iter()
                    .map(|i| input_label(&self.inputs, i))
                    .collect(),
                q,
            )
        })
    }
}

impl TransitionTable for MooreMachine {
    fn inputs(&self) -> &Labels {
        &self.inputs
    }

    fn states(&self) -> &Labels {
        &self.states
    }

    fn successors(&self, input: InputId, state: StateId) -> Result<Vec<StateId>, ConsistencyError> {
        self.target(input, state).map(|t| t.into_iter().collect())
    }

    fn restrict(&self, keep: &[StateId]) -> Self {
        let new_index = reindex(keep, self.size());
        let transitions = self
            .transitions
            .iter()
            .map(|row| {
                keep.iter()
                    .map(|q| {
                        row.get(*q)
                            .copied()
                            .flatten()
                            .and_then(|t| new_index.get(t).copied().flatten())
                    })
                    .collect()
            })
            .collect();
        Self {
            inputs: self.inputs.clone(),
            states: self.states.select(keep),
            outputs: keep
                .iter()
                .filter_map(|q| self.outputs.get(*q).cloned())
                .collect(),
            transitions,
        }
    }
}

impl Show for MooreMachine {
    fn show(&self) -> String {
        let header = ["State".to_string(), "Output".to_string()]
            .into_iter()
            .chain(self.inputs.labels().cloned())
            .collect();
        let rows = self
            .states
            .iter()
            .map(|(q, label)| {
                let name = if Some(q) == self.initial() {
                    label.bold().to_string()
                } else {
                    label.clone()
                };
                let mut row = vec![name, self.outputs[q].clone()];
                row.extend((0..self.inputs.len()).map(|i| match self.target(i, q) {
                    Ok(Some(p)) => self.states.label(p).cloned().unwrap_or_default(),
                    Ok(None) => "-".to_string(),
                    Err(_) => "!".to_string(),
                }));
                row
            })
            .collect();
        render_table(header, rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn moore_runs() {
        let moore = crate::tests::cyclic_moore();
        assert_eq!(moore.map(Vec::<&str>::new()).map(String::as_str), Some("0"));
        assert_eq!(moore.map(["a"]).map(String::as_str), Some("1"));
        assert_eq!(moore.map(["a", "a"]).map(String::as_str), Some("0"));
        assert_eq!(moore.map(["b"]), None);
        assert_eq!(
            moore.access_words().collect::<Vec<_>>(),
            vec![
                (vec![], 0),
                (vec!["a".to_string()], 1),
                (vec!["a".to_string(), "a".to_string()], 2)
            ]
        );
    }

    #[test]
    fn from_parts_validates() {
        let inputs = Labels::from_iter(["a"]);
        let states = Labels::from_iter(["p", "q"]);
        assert_eq!(
            MooreMachine::from_parts(
                inputs.clone(),
                states.clone(),
                vec!["0".into()],
                vec![vec![Some(1), Some(0)]]
            ),
            Err(ConstructionError::OutputCount {
                states: 2,
                outputs: 1
            })
        );
        assert_eq!(
            MooreMachine::from_parts(
                inputs,
                states,
                vec!["0".into(), "1".into()],
                vec![vec![Some(1), Some(2)]]
            ),
            Err(ConstructionError::TargetOutOfRange {
                input: "a".into(),
                state: 1,
                target: 2
            })
        );
    }

    #[test]
    fn show_renders_all_states() {
        let shown = crate::tests::cyclic_moore().show();
        for label in ["q0", "q1", "q2", "Output"] {
            assert!(shown.contains(label));
        }
    }
}
