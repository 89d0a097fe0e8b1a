use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::{math::Bijection, Show, Symbol};

/// Breadth-first traversal of transition tables.
pub mod reachable;
use reachable::{MinimalRepresentatives, ReachableStateIndices};

/// Position of a state in the ordered state labels, i.e. its column in the table.
pub type StateId = usize;
/// Position of an input symbol in the ordered input labels, i.e. its row in the table.
pub type InputId = usize;

/// Raised when a table is accessed at a position that it does not have. This happens for
/// tables that were read with rows that are shorter than the number of states.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    /// The row of `input` has only `len` cells, so column `state` does not exist.
    #[error("state index {state} out of range in transitions for input `{input}` ({len} cells)")]
    StateOutOfRange {
        /// Label of the input row.
        input: Symbol,
        /// The requested column.
        state: StateId,
        /// Number of cells in the row.
        len: usize,
    },
    /// There is no row with the given index.
    #[error("input index {0} out of range in transitions")]
    InputOutOfRange(InputId),
}

/// An ordered collection of unique labels. Each label is associated with its position,
/// which can be looked up in both directions in constant time. Iteration always happens
/// in the order in which the labels were pushed.
#[derive(Debug, Clone, Default)]
pub struct Labels(Bijection<usize, Symbol>);

impl Labels {
    /// Creates an empty collection of labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `label` and returns its position. If the label is already present, it is
    /// returned as the error value and nothing changes.
    pub fn push<S: Into<Symbol>>(&mut self, label: S) -> Result<usize, Symbol> {
        let label = label.into();
        if self.0.contains_right(&label) {
            return Err(label);
        }
        let id = self.0.len();
        self.0.insert(id, label);
        Ok(id)
    }

    /// Appends `label` unless it is already present, in either case its position is returned.
    pub fn insert<S: Into<Symbol>>(&mut self, label: S) -> usize {
        match self.push(label) {
            Ok(id) => id,
            Err(label) => self.index(&label).unwrap_or_default(),
        }
    }

    /// Returns the position of `label`.
    pub fn index(&self, label: &str) -> Option<usize> {
        self.0.get_by_right(label).copied()
    }

    /// Returns the label at position `id`.
    pub fn label(&self, id: usize) -> Option<&Symbol> {
        self.0.get_by_left(&id)
    }

    /// Returns true if `label` is present.
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains_right(label)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over all positions together with their labels, in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Symbol)> + '_ {
        (0..self.len()).filter_map(|id| self.label(id).map(|label| (id, label)))
    }

    /// Iterates over the labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &Symbol> + '_ {
        self.iter().map(|(_, label)| label)
    }

    /// Collects the labels into a vector, in order.
    pub fn to_vec(&self) -> Vec<Symbol> {
        self.labels().cloned().collect()
    }

    /// Returns the labels at the given positions, in the order of `ids`. Positions that do
    /// not exist are skipped.
    pub fn select(&self, ids: &[usize]) -> Labels {
        let mut out = Labels::new();
        for label in ids.iter().filter_map(|id| self.label(*id)) {
            out.insert(label.clone());
        }
        out
    }
}

impl PartialEq for Labels {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.labels().eq(other.labels())
    }
}
impl Eq for Labels {}

impl<S: Into<Symbol>> FromIterator<S> for Labels {
    /// Collects labels, duplicates are dropped.
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut out = Labels::new();
        for label in iter {
            out.insert(label);
        }
        out
    }
}

impl Show for Labels {
    fn show(&self) -> String {
        format!("{{{}}}", self.labels().join(", "))
    }
}

/// The common view on all machines in this crate. A transition table consists of ordered
/// input symbols (the rows) and ordered states (the columns). The first state is the
/// initial one.
///
/// Implementors only need to give access to their labels, the successors of a single cell
/// and a way of restricting themselves to a subset of their states. Reachability and
/// trimming are then provided.
pub trait TransitionTable: Sized {
    /// The ordered input symbols.
    fn inputs(&self) -> &Labels;

    /// The ordered state labels.
    fn states(&self) -> &Labels;

    /// Returns the states that are reached from `state` on `input`. An undefined transition
    /// gives an empty vector, a cell outside of the table gives a [`ConsistencyError`].
    fn successors(&self, input: InputId, state: StateId) -> Result<Vec<StateId>, ConsistencyError>;

    /// Produces the table that only consists of the columns given in `keep`, which must be
    /// sorted. Transitions into states that are not kept become undefined, cells that are
    /// outside of the table become undefined as well.
    fn restrict(&self, keep: &[StateId]) -> Self;

    /// The initial state, which is the first column. Returns `None` for an empty table.
    fn initial(&self) -> Option<StateId> {
        if self.states().is_empty() {
            None
        } else {
            Some(0)
        }
    }

    /// The number of states.
    fn size(&self) -> usize {
        self.states().len()
    }

    /// Returns the label of the state with index `state`.
    fn state_label(&self, state: StateId) -> Option<&Symbol> {
        self.states().label(state)
    }

    /// Returns the index of the state labelled `label`.
    fn state_index(&self, label: &str) -> Option<StateId> {
        self.states().index(label)
    }

    /// Iterates over the reachable states together with a length-lexicographically minimal
    /// word (as a sequence of input positions) leading to them, in breadth-first order.
    fn minimal_representatives(&self) -> MinimalRepresentatives<'_, Self> {
        MinimalRepresentatives::new(self, self.initial())
    }

    /// Iterates over the indices of all states that are reachable from the initial state,
    /// in breadth-first order.
    fn reachable_state_indices(&self) -> ReachableStateIndices<'_, Self> {
        ReachableStateIndices::new(self, self.initial())
    }

    /// Returns a copy of `self` in which all states that are not reachable from the
    /// initial state are removed. The kept states retain their relative order.
    fn trim(&self) -> Self {
        let keep = self.reachable_state_indices().sorted().collect_vec();
        debug!(
            "keeping {} of {} states: {}",
            keep.len(),
            self.size(),
            self.states().select(&keep).show()
        );
        self.restrict(&keep)
    }
}

/// Renders a table with `tabled`, the first row is treated as the header.
pub(crate) fn render_table(header: Vec<String>, rows: Vec<Vec<String>>) -> String {
    let mut builder = tabled::builder::Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    builder
        .build()
        .with(tabled::settings::Style::rounded())
        .to_string()
}
