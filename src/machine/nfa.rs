use std::collections::{BTreeSet, VecDeque};

use itertools::Itertools;
use owo_colors::OwoColorize;
use tracing::{debug, trace};

use crate::{math::Map, prelude::*, table::render_table};

use super::{input_label, reindex, validate_rows};

/// A set of states of an [`Nfa`], it is the state of the subset construction.
type StateSet = BTreeSet<StateId>;

/// A nondeterministic finite acceptor. Every cell holds a (possibly empty) list of target
/// states and each state is either accepting or not. The epsilon glyph of the [`Markers`]
/// in use may appear as an input, its transitions are then followed without consuming
/// anything.
///
/// This is what the grammar compiler produces. It is turned into a deterministic machine
/// with [`Nfa::determinize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    inputs: Labels,
    states: Labels,
    accepting: Vec<bool>,
    transitions: Vec<Vec<Vec<StateId>>>,
}

impl Nfa {
    /// Creates an acceptor from its parts, `accepting` holds one flag per state and
    /// `transitions` one row per input.
    pub fn from_parts(
        inputs: Labels,
        states: Labels,
        accepting: Vec<bool>,
        transitions: Vec<Vec<Vec<StateId>>>,
    ) -> Result<Self, ConstructionError> {
        if accepting.len() != states.len() {
            return Err(ConstructionError::OutputCount {
                states: states.len(),
                outputs: accepting.len(),
            });
        }
        validate_rows(&inputs, states.len(), &transitions, |cell| cell.clone())?;
        Ok(Self {
            inputs,
            states,
            accepting,
            transitions,
        })
    }

    pub(crate) fn from_parts_unchecked(
        inputs: Labels,
        states: Labels,
        accepting: Vec<bool>,
        transitions: Vec<Vec<Vec<StateId>>>,
    ) -> Self {
        debug_assert_eq!(accepting.len(), states.len());
        debug_assert!(validate_rows(&inputs, states.len(), &transitions, |cell| cell.clone()).is_ok());
        Self {
            inputs,
            states,
            accepting,
            transitions,
        }
    }

    /// Returns an acceptor without any states or inputs.
    pub fn empty() -> Self {
        Self {
            inputs: Labels::new(),
            states: Labels::new(),
            accepting: vec![],
            transitions: vec![],
        }
    }

    /// The accepting flags of all states.
    pub fn accepting(&self) -> &[bool] {
        &self.accepting
    }

    /// Returns true if `state` is accepting.
    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.get(state).copied().unwrap_or(false)
    }

    /// The raw transition rows, one per input.
    pub fn rows(&self) -> &[Vec<Vec<StateId>>] {
        &self.transitions
    }

    /// Returns the targets of `state` on `input`.
    pub fn targets(&self, input: InputId, state: StateId) -> Result<&[StateId], ConsistencyError> {
        let row = self
            .transitions
            .get(input)
            .ok_or(ConsistencyError::InputOutOfRange(input))?;
        row.get(state)
            .map(Vec::as_slice)
            .ok_or_else(|| ConsistencyError::StateOutOfRange {
                input: input_label(&self.inputs, input),
                state,
                len: row.len(),
            })
    }

    /// Extends `states` by everything that can be reached using only epsilon transitions.
    pub fn epsilon_closure<I: IntoIterator<Item = StateId>>(
        &self,
        states: I,
        markers: &Markers,
    ) -> BTreeSet<StateId> {
        let mut closure: StateSet = states.into_iter().collect();
        let Some(epsilon) = self.inputs.index(&markers.epsilon) else {
            return closure;
        };
        let mut queue: VecDeque<_> = closure.iter().copied().collect();
        while let Some(q) = queue.pop_front() {
            for p in self.targets(epsilon, q).unwrap_or_default() {
                if closure.insert(*p) {
                    queue.push_back(*p);
                }
            }
        }
        closure
    }

    /// Computes the set of states reached from `from` on `input`, closed under epsilon
    /// transitions.
    fn step(&self, from: &StateSet, input: InputId, markers: &Markers) -> StateSet {
        let direct = from
            .iter()
            .flat_map(|q| self.targets(input, *q).unwrap_or_default())
            .copied()
            .collect_vec();
        self.epsilon_closure(direct, markers)
    }

    /// Returns true if there is a run on `word` from the initial state that ends in an
    /// accepting state.
    pub fn accepts<'w, W: IntoIterator<Item = &'w str>>(&self, word: W, markers: &Markers) -> bool {
        let Some(initial) = self.initial() else {
            return false;
        };
        let mut current = self.epsilon_closure([initial], markers);
        for symbol in word {
            let Some(input) = self.inputs.index(symbol) else {
                return false;
            };
            current = self.step(&current, input, markers);
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|q| self.is_accepting(*q))
    }

    /// Performs the subset construction. The states of the result are the epsilon closed
    /// sets of states that are reachable from the closure of the initial state, they are
    /// labelled with the subset prefix in the order in which they are discovered. Every
    /// set that contains an accepting state gets the accepting marker as output, all others
    /// get the blank output. Transitions leading to the empty set are left undefined.
    ///
    /// The epsilon glyph does not appear as an input of the result.
    pub fn determinize(&self, markers: &Markers) -> MooreMachine {
        let Some(initial) = self.initial() else {
            return MooreMachine::empty();
        };
        let alphabet = self
            .inputs
            .iter()
            .filter(|(_, label)| !markers.is_epsilon(label))
            .map(|(i, _)| i)
            .collect_vec();

        let mut sets: Vec<StateSet> = vec![self.epsilon_closure([initial], markers)];
        let mut known: Map<StateSet, StateId> = Map::default();
        known.insert(sets[0].clone(), 0);
        let mut columns: Vec<Vec<Option<StateId>>> = vec![];
        let mut queue = VecDeque::from([0usize]);

        while let Some(current) = queue.pop_front() {
            let mut column = Vec::with_capacity(alphabet.len());
            for input in &alphabet {
                let next = self.step(&sets[current], *input, markers);
                if next.is_empty() {
                    column.push(None);
                    continue;
                }
                let id = match known.get(&next) {
                    Some(id) => *id,
                    None => {
                        let id = sets.len();
                        trace!("discovered subset {id} = {:?}", next);
                        known.insert(next.clone(), id);
                        sets.push(next);
                        queue.push_back(id);
                        id
                    }
                };
                column.push(Some(id));
            }
            columns.push(column);
        }
        debug!(
            "subset construction produced {} states from {}",
            sets.len(),
            self.size()
        );

        let states = (0..sets.len()).map(|i| markers.subset_label(i)).collect();
        let outputs = sets
            .iter()
            .map(|set| {
                if set.iter().any(|q| self.is_accepting(*q)) {
                    markers.accepting.clone()
                } else {
                    markers.blank_output.clone()
                }
            })
            .collect();
        // queue order equals discovery order, so `columns[i]` belongs to set `i`
        let transitions = (0..alphabet.len())
            .map(|row| columns.iter().map(|column| column[row]).collect())
            .collect();
        let inputs = alphabet
            .iter()
            .filter_map(|i| self.inputs.label(*i).cloned())
            .collect();
        MooreMachine::from_parts_unchecked(inputs, states, outputs, transitions)
    }
}

impl TransitionTable for Nfa {
    fn inputs(&self) -> &Labels {
        &self.inputs
    }

    fn states(&self) -> &Labels {
        &self.states
    }

    fn successors(&self, input: InputId, state: StateId) -> Result<Vec<StateId>, ConsistencyError> {
        self.targets(input, state).map(<[StateId]>::to_vec)
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
                            .map(|targets| {
                                targets
                                    .iter()
                                    .filter_map(|t| new_index.get(*t).copied().flatten())
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Self {
            inputs: self.inputs.clone(),
            states: self.states.select(keep),
            accepting: keep.iter().map(|q| self.is_accepting(*q)).collect(),
            transitions,
        }
    }
}

impl Show for Nfa {
    fn show(&self) -> String {
        let header = ["State".to_string(), "Accepting".to_string()]
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
                let mut row = vec![name, if self.is_accepting(q) { "+" } else { "-" }.to_string()];
                row.extend((0..self.inputs.len()).map(|i| match self.targets(i, q) {
                    Ok(targets) => targets
                        .iter()
                        .filter_map(|p| self.states.label(*p))
                        .join(","),
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

    /// Accepts all words over `{a, b}` that end with `ab`, with an epsilon transition from
    /// the initial state into a copy of itself.
    fn ends_with_ab() -> Nfa {
        let inputs = Labels::from_iter(["a", "b", "ε"]);
        let states = Labels::from_iter(["p", "p'", "q", "r"]);
        Nfa::from_parts(
            inputs,
            states,
            vec![false, false, false, true],
            vec![
                vec![vec![], vec![1, 2], vec![], vec![]],
                vec![vec![], vec![1], vec![3], vec![]],
                vec![vec![1], vec![], vec![], vec![]],
            ],
        )
        .unwrap()
    }

    #[test]
    fn nfa_acceptance_follows_epsilon() {
        let markers = Markers::default();
        let nfa = ends_with_ab();
        assert_eq!(
            nfa.epsilon_closure([0], &markers).into_iter().collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert!(nfa.accepts(["a", "b"], &markers));
        assert!(nfa.accepts(["b", "b", "a", "b"], &markers));
        assert!(!nfa.accepts(["a", "b", "a"], &markers));
        assert!(!nfa.accepts(Vec::<&str>::new(), &markers));
        assert!(!nfa.accepts(["c"], &markers));
    }

    #[test_log::test]
    fn determinization_preserves_language() {
        let markers = Markers::default();
        let nfa = ends_with_ab();
        let dfa = nfa.determinize(&markers);
        assert_eq!(dfa.inputs().to_vec(), vec!["a", "b"]);
        assert_eq!(dfa.states().label(0).map(String::as_str), Some("S0"));
        assert_eq!(dfa.size(), 4);

        let words: [&[&str]; 6] = [
            &[],
            &["a"],
            &["a", "b"],
            &["b", "a", "b"],
            &["a", "b", "b"],
            &["a", "a", "b"],
        ];
        for word in words {
            let accepted = dfa.map(word.iter().copied()) == Some(&markers.accepting);
            assert_eq!(accepted, nfa.accepts(word.iter().copied(), &markers));
        }
    }

    #[test]
    fn restriction_drops_targets() {
        let nfa = ends_with_ab();
        let restricted = nfa.restrict(&[0, 1]);
        assert_eq!(restricted.targets(0, 1), Ok(&[1][..]));
        assert_eq!(restricted.accepting(), &[false, false]);
    }
}
