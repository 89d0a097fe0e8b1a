use crate::Symbol;

/// Collects the reserved symbols and label prefixes that the transformations rely on.
///
/// A value of this type is passed explicitly to every operation that needs one of the
/// markers, so machines that follow different conventions can be processed side by side.
/// [`Markers::default`] gives the conventions of the table format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Markers {
    /// Output of a Moore state that has no output assigned. It is written as an empty cell.
    pub blank_output: Symbol,
    /// The glyph denoting the empty word in grammars and automata.
    pub epsilon: Symbol,
    /// Prefix for synthesized state labels, e.g. when Mealy states are split into Moore states.
    pub state_prefix: Symbol,
    /// Prefix for the labels of equivalence classes produced by the minimization.
    pub class_prefix: Symbol,
    /// Prefix for the states of a determinized automaton.
    pub subset_prefix: Symbol,
    /// Label of the synthetic accepting state of a right-linear grammar.
    pub final_state: Symbol,
    /// Label of the synthetic initial state of a left-linear grammar.
    pub start_state: Symbol,
    /// Output that marks a state as accepting in acceptor tables.
    pub accepting: Symbol,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            blank_output: "_".into(),
            epsilon: "ε".into(),
            state_prefix: "q".into(),
            class_prefix: "X".into(),
            subset_prefix: "S".into(),
            final_state: "F".into(),
            start_state: "H".into(),
            accepting: "F".into(),
        }
    }
}

impl Markers {
    /// Builds the label `<state_prefix><n>`.
    pub fn state_label(&self, n: usize) -> Symbol {
        format!("{}{n}", self.state_prefix)
    }

    /// Builds the label `<class_prefix><n>`.
    pub fn class_label(&self, n: usize) -> Symbol {
        format!("{}{n}", self.class_prefix)
    }

    /// Builds the label `<subset_prefix><n>`.
    pub fn subset_label(&self, n: usize) -> Symbol {
        format!("{}{n}", self.subset_prefix)
    }

    /// Returns true if `output` is the blank output marker.
    pub fn is_blank(&self, output: &str) -> bool {
        self.blank_output == output
    }

    /// Returns true if `symbol` is the epsilon glyph.
    pub fn is_epsilon(&self, symbol: &str) -> bool {
        self.epsilon == symbol
    }
}
