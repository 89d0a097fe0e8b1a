use tracing::warn;

use crate::prelude::*;

/// Helper struct for the construction of [`MooreMachine`]s from labelled states and
/// transitions. States are created in the order in which they are given, the first one
/// is the initial state. Inputs are ordered by [`MooreBuilder::with_inputs`] first and
/// then by their first appearance on a transition.
///
/// # Example
/// ```
/// use automata_transform::prelude::*;
///
/// let moore = MooreMachine::builder()
///     .with_states([("q0", "0"), ("q1", "1")])
///     .with_transitions([("q0", "a", "q1"), ("q1", "a", "q0")])
///     .build()
///     .unwrap();
/// assert_eq!(moore.map(["a"]).map(String::as_str), Some("1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MooreBuilder {
    states: Vec<(Symbol, Symbol)>,
    inputs: Vec<Symbol>,
    edges: Vec<(Symbol, Symbol, Symbol)>,
}

impl MooreBuilder {
    /// Adds states given as `(label, output)` pairs.
    pub fn with_states<S, O, I>(mut self, iter: I) -> Self
    where
        S: Into<Symbol>,
        O: Into<Symbol>,
        I: IntoIterator<Item = (S, O)>,
    {
        self.states
            .extend(iter.into_iter().map(|(s, o)| (s.into(), o.into())));
        self
    }

    /// Forces the given input symbols to exist, in the given order, even if no transition
    /// uses them.
    pub fn with_inputs<S: Into<Symbol>, I: IntoIterator<Item = S>>(mut self, iter: I) -> Self {
        self.inputs.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Adds transitions given as `(source, input, target)`.
    pub fn with_transitions<S, A, T, I>(mut self, iter: I) -> Self
    where
        S: Into<Symbol>,
        A: Into<Symbol>,
        T: Into<Symbol>,
        I: IntoIterator<Item = (S, A, T)>,
    {
        self.edges.extend(
            iter.into_iter()
                .map(|(s, a, t)| (s.into(), a.into(), t.into())),
        );
        self
    }

    /// Builds the machine. Fails if a state is declared twice or if a transition refers
    /// to a state that was not declared.
    pub fn build(self) -> Result<MooreMachine, ConstructionError> {
        let mut states = Labels::new();
        let mut outputs = Vec::with_capacity(self.states.len());
        for (label, output) in self.states {
            states.push(label).map_err(ConstructionError::DuplicateState)?;
            outputs.push(output);
        }
        let mut inputs = Labels::new();
        for input in self.inputs {
            inputs.push(input).map_err(ConstructionError::DuplicateInput)?;
        }
        for (_, input, _) in &self.edges {
            inputs.insert(input.clone());
        }

        let mut transitions = vec![vec![None; states.len()]; inputs.len()];
        for (source, input, target) in self.edges {
            let (q, p) = resolve(&states, &source, &target)?;
            let i = inputs.insert(input);
            if transitions[i][q].replace(p).is_some() {
                warn!("transition from `{source}` is given twice, keeping the last one");
            }
        }
        MooreMachine::from_parts(inputs, states, outputs, transitions)
    }
}

/// Helper struct for the construction of [`MealyMachine`]s, it works just like
/// [`MooreBuilder`] except that states carry no output and transitions are given as
/// `(source, input, target, output)`.
#[derive(Debug, Clone, Default)]
pub struct MealyBuilder {
    states: Vec<Symbol>,
    inputs: Vec<Symbol>,
    edges: Vec<(Symbol, Symbol, Symbol, Symbol)>,
}

impl MealyBuilder {
    /// Adds states, the first one is the initial state.
    pub fn with_states<S: Into<Symbol>, I: IntoIterator<Item = S>>(mut self, iter: I) -> Self {
        self.states.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Forces the given input symbols to exist, in the given order.
    pub fn with_inputs<S: Into<Symbol>, I: IntoIterator<Item = S>>(mut self, iter: I) -> Self {
        self.inputs.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Adds transitions given as `(source, input, target, output)`.
    pub fn with_transitions<S, A, T, O, I>(mut self, iter: I) -> Self
    where
        S: Into<Symbol>,
        A: Into<Symbol>,
        T: Into<Symbol>,
        O: Into<Symbol>,
        I: IntoIterator<Item = (S, A, T, O)>,
    {
        self.edges.extend(
            iter.into_iter()
                .map(|(s, a, t, o)| (s.into(), a.into(), t.into(), o.into())),
        );
        self
    }

    /// Builds the machine, see [`MooreBuilder::build`].
    pub fn build(self) -> Result<MealyMachine, ConstructionError> {
        let mut states = Labels::new();
        for label in self.states {
            states.push(label).map_err(ConstructionError::DuplicateState)?;
        }
        let mut inputs = Labels::new();
        for input in self.inputs {
            inputs.push(input).map_err(ConstructionError::DuplicateInput)?;
        }
        for (_, input, _, _) in &self.edges {
            inputs.insert(input.clone());
        }

        let mut transitions = vec![vec![None; states.len()]; inputs.len()];
        for (source, input, target, output) in self.edges {
            let (q, p) = resolve(&states, &source, &target)?;
            let i = inputs.insert(input);
            if transitions[i][q].replace(MealyCell::new(p, output)).is_some() {
                warn!("transition from `{source}` is given twice, keeping the last one");
            }
        }
        MealyMachine::from_parts(inputs, states, transitions)
    }
}

fn resolve(
    states: &Labels,
    source: &str,
    target: &str,
) -> Result<(StateId, StateId), ConstructionError> {
    let lookup = |label: &str| {
        states
            .index(label)
            .ok_or_else(|| ConstructionError::UnknownState(label.to_string()))
    };
    Ok((lookup(source)?, lookup(target)?))
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn builder_rejects_unknown_and_duplicate_states() {
        assert_eq!(
            MooreMachine::builder()
                .with_states([("p", "0")])
                .with_transitions([("p", "a", "r")])
                .build(),
            Err(ConstructionError::UnknownState("r".into()))
        );
        assert_eq!(
            MealyMachine::builder().with_states(["p", "p"]).build(),
            Err(ConstructionError::DuplicateState("p".into()))
        );
    }

    #[test]
    fn builder_orders_inputs() {
        let moore = MooreMachine::builder()
            .with_states([("p", "0")])
            .with_inputs(["z"])
            .with_transitions([("p", "b", "p"), ("p", "a", "p")])
            .build()
            .unwrap();
        assert_eq!(moore.inputs().to_vec(), vec!["z", "b", "a"]);
        assert_eq!(moore.target(0, 0), Ok(None));
        assert_eq!(moore.target(2, 0), Ok(Some(0)));
    }
}
