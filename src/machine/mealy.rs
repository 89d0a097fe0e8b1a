use owo_colors::OwoColorize;

use crate::{prelude::*, table::render_table};

use super::{input_label, reindex, validate_rows, MealyBuilder};

/// A Mealy machine is a transition table where each transition has an output. Running a
/// word of length `n` produces `n` outputs, usually we are only interested in the last
/// one. The empty word produces no output at all.
///
/// Each cell of the table is either undefined or a [`MealyCell`] consisting of the target
/// state and the emitted output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MealyMachine {
    inputs: Labels,
    states: Labels,
    transitions: Vec<Vec<Option<MealyCell>>>,
}

impl MealyMachine {
    /// Instantiates a new [`MealyBuilder`].
    pub fn builder() -> MealyBuilder {
        MealyBuilder::default()
    }

    /// Creates a machine from its parts, `transitions` holds one row per input.
    pub fn from_parts(
        inputs: Labels,
        states: Labels,
        transitions: Vec<Vec<Option<MealyCell>>>,
    ) -> Result<Self, ConstructionError> {
        validate_rows(&inputs, states.len(), &transitions, |cell| {
            cell.as_ref().map(|c| c.target)
        })?;
        Ok(Self {
            inputs,
            states,
            transitions,
        })
    }

    /// Assembles a machine whose parts are known to be consistent.
    pub(crate) fn from_parts_unchecked(
        inputs: Labels,
        states: Labels,
        transitions: Vec<Vec<Option<MealyCell>>>,
    ) -> Self {
        debug_assert!(validate_rows(&inputs, states.len(), &transitions, |cell| {
            cell.as_ref().map(|c| c.target)
        })
        .is_ok());
        Self {
            inputs,
            states,
            transitions,
        }
    }

    /// Returns a machine without any states or inputs.
    pub fn empty() -> Self {
        Self {
            inputs: Labels::new(),
            states: Labels::new(),
            transitions: vec![],
        }
    }

    /// The raw transition rows, one per input.
    pub fn rows(&self) -> &[Vec<Option<MealyCell>>] {
        &self.transitions
    }

    /// Returns the cell for `state` on `input`, `Ok(None)` if the transition is undefined.
    pub fn cell(&self, input: InputId, state: StateId) -> Result<Option<&MealyCell>, ConsistencyError> {
        let row = self
            .transitions
            .get(input)
            .ok_or(ConsistencyError::InputOutOfRange(input))?;
        row.get(state)
            .map(Option::as_ref)
            .ok_or_else(|| ConsistencyError::StateOutOfRange {
                input: input_label(&self.inputs, input),
                state,
                len: row.len(),
            })
    }

    /// The outputs that `state` produces, one entry per input in the order of the inputs.
    /// Undefined transitions and cells outside of the table give `None`.
    pub fn output_vector(&self, state: StateId) -> Vec<Option<&Symbol>> {
        (0..self.inputs.len())
            .map(|i| self.cell(i, state).ok().flatten().map(|c| &c.output))
            .collect()
    }

    /// Runs `word` from the initial state and returns the output of the last transition that
    /// is taken. Gives `None` for the empty word and for words that hit an undefined
    /// transition.
    pub fn map<'w, W: IntoIterator<Item = &'w str>>(&self, word: W) -> Option<&Symbol> {
        let mut state = self.initial()?;
        let mut last = None;
        for symbol in word {
            let input = self.inputs.index(symbol)?;
            let cell = self.cell(input, state).ok().flatten()?;
            state = cell.target;
            last = Some(&cell.output);
        }
        last
    }

    /// Returns a vector over all outputs that appear on some transition, without duplicates
    /// and in the order in which they first appear in the table.
    pub fn color_range(&self) -> Vec<&Symbol> {
        let mut seen = math::Set::default();
        (0..self.size())
            .flat_map(|q| self.output_vector(q))
            .flatten()
            .filter(|o| seen.insert(*o))
            .collect()
    }
}

impl TransitionTable for MealyMachine {
    fn inputs(&self) -> &Labels {
        &self.inputs
    }

    fn states(&self) -> &Labels {
        &self.states
    }

    fn successors(&self, input: InputId, state: StateId) -> Result<Vec<StateId>, ConsistencyError> {
        self.cell(input, state)
            .map(|c| c.map(|c| c.target).into_iter().collect())
    }

    fn restrict(&self, keep: &[StateId]) -> Self {
        let new_index = reindex(keep, self.size());
        let transitions = self
            .transitions
            .iter()
            .map(|row| {
                keep.iter()
                    .map(|q| {
                        let cell = row.get(*q)?.as_ref()?;
                        let target = new_index.get(cell.target).copied().flatten()?;
                        Some(MealyCell::new(target, cell.output.clone()))
                    })
                    .collect()
            })
            .collect();
        Self {
            inputs: self.inputs.clone(),
            states: self.states.select(keep),
            transitions,
        }
    }
}

impl Show for MealyMachine {
    fn show(&self) -> String {
        let header = std::iter::once("State".to_string())
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
                std::iter::once(name)
                    .chain((0..self.inputs.len()).map(|i| match self.cell(i, q) {
                        Ok(Some(cell)) => format!(
                            "{}/{}",
                            self.states.label(cell.target).cloned().unwrap_or_default(),
                            cell.output
                        ),
                        Ok(None) => "-".to_string(),
                        Err(_) => "!".to_string(),
                    }))
                    .collect()
            })
            .collect();
        render_table(header, rows)
    }
}
