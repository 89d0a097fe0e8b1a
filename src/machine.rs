use thiserror::Error;

use crate::{
    table::{InputId, StateId},
    Show, Symbol,
};

mod builder;
pub use builder::{MealyBuilder, MooreBuilder};

mod moore;
pub use moore::MooreMachine;

mod mealy;
pub use mealy::MealyMachine;

mod nfa;
pub use nfa::Nfa;

/// Errors that prevent a machine from being constructed. In contrast to problems with
/// single cells of a table, these are never skipped silently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// The same state label appears twice.
    #[error("state `{0}` is declared more than once")]
    DuplicateState(Symbol),
    /// The same input symbol appears twice.
    #[error("input `{0}` is declared more than once")]
    DuplicateInput(Symbol),
    /// A transition refers to a state that has not been declared.
    #[error("transition refers to unknown state `{0}`")]
    UnknownState(Symbol),
    /// A transition refers to a state index that does not exist.
    #[error("transition on input `{input}` from state {state} points to non-existent state {target}")]
    TargetOutOfRange {
        /// Label of the input row.
        input: Symbol,
        /// Column of the cell.
        state: StateId,
        /// The offending target index.
        target: StateId,
    },
    /// The number of outputs does not match the number of states.
    #[error("{outputs} outputs given for {states} states")]
    OutputCount {
        /// Number of states.
        states: usize,
        /// Number of outputs.
        outputs: usize,
    },
    /// The number of transition rows does not match the number of inputs.
    #[error("{rows} transition rows given for {inputs} inputs")]
    RowCount {
        /// Number of inputs.
        inputs: usize,
        /// Number of rows.
        rows: usize,
    },
    /// A row has more cells than there are states.
    #[error("row of input `{input}` has {len} cells, but there are only {states} states")]
    RowTooLong {
        /// Label of the input row.
        input: Symbol,
        /// Number of cells in the row.
        len: usize,
        /// Number of states.
        states: usize,
    },
}

/// A single defined cell of a Mealy table: the state that is reached together with the
/// output that is produced on the way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MealyCell {
    /// The state that is reached.
    pub target: StateId,
    /// The output emitted by the transition.
    pub output: Symbol,
}

impl MealyCell {
    /// Creates a new cell.
    pub fn new<S: Into<Symbol>>(target: StateId, output: S) -> Self {
        Self {
            target,
            output: output.into(),
        }
    }
}

impl Show for MealyCell {
    fn show(&self) -> String {
        format!("{}/{}", self.target, self.output)
    }
}

/// Checks that `rows` fits to the given number of inputs and states and that every
/// target produced by `targets` exists.
pub(crate) fn validate_rows<C, I>(
    inputs: &crate::table::Labels,
    states: usize,
    rows: &[Vec<C>],
    targets: impl Fn(&C) -> I,
) -> Result<(), ConstructionError>
where
    I: IntoIterator<Item = StateId>,
{
    if rows.len() != inputs.len() {
        return Err(ConstructionError::RowCount {
            inputs: inputs.len(),
            rows: rows.len(),
        });
    }
    for (input, row) in rows.iter().enumerate() {
        let label = || input_label(inputs, input);
        if row.len() > states {
            return Err(ConstructionError::RowTooLong {
                input: label(),
                len: row.len(),
                states,
            });
        }
        for (state, cell) in row.iter().enumerate() {
            if let Some(target) = targets(cell).into_iter().find(|t| *t >= states) {
                return Err(ConstructionError::TargetOutOfRange {
                    input: label(),
                    state,
                    target,
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn input_label(inputs: &crate::table::Labels, input: InputId) -> Symbol {
    inputs.label(input).cloned().unwrap_or_default()
}

/// Computes for each old state index its new index when only `keep` (sorted) is retained.
pub(crate) fn reindex(keep: &[StateId], size: usize) -> Vec<Option<StateId>> {
    let mut out = vec![None; size];
    for (new, old) in keep.iter().enumerate() {
        if let Some(slot) = out.get_mut(*old) {
            *slot = Some(new);
        }
    }
    out
}
