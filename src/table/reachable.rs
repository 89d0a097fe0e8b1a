use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::error;

use super::{InputId, StateId, TransitionTable};

/// Type alias for a minimal representative of a state which is its length-lexicographically minimal
/// access sequence (given as input positions) and its state index.
pub type MinimalRepresentative = (Vec<InputId>, StateId);

/// Struct that can return the minimal representatives of a transition table. A minimal representative
/// for a state `q` is the length-lexicographically minimal word with which `q` can be reached from the
/// origin, where the inputs are ordered by their row.
///
/// Cells that lie outside of the table are reported and skipped, the traversal continues
/// with the remaining cells.
#[derive(Debug, Clone)]
pub struct MinimalRepresentatives<'a, Ts> {
    ts: &'a Ts,
    seen: BitSet,
    queue: VecDeque<MinimalRepresentative>,
}

#[allow(missing_docs)]
impl<'a, Ts: TransitionTable> MinimalRepresentatives<'a, Ts> {
    pub fn new(ts: &'a Ts, origin: Option<StateId>) -> Self {
        let mut seen = BitSet::new();
        let mut queue = VecDeque::new();
        if let Some(origin) = origin {
            seen.insert(origin);
            queue.push_back((vec![], origin));
        }
        Self { ts, seen, queue }
    }
}

impl<'a, Ts: TransitionTable> Iterator for MinimalRepresentatives<'a, Ts> {
    type Item = MinimalRepresentative;

    fn next(&mut self) -> Option<Self::Item> {
        let (access, q) = self.queue.pop_front()?;
        for input in 0..self.ts.inputs().len() {
            let successors = match self.ts.successors(input, q) {
                Ok(successors) => successors,
                Err(e) => {
                    error!("{e}");
                    continue;
                }
            };
            for p in successors {
                if self.seen.insert(p) {
                    let mut new_access = access.clone();
                    new_access.push(input);
                    self.queue.push_back((new_access, p));
                }
            }
        }
        Some((access, q))
    }
}

/// Allows iterating over the indices of all reachable states in a [`TransitionTable`].
#[derive(Debug, Clone)]
pub struct ReachableStateIndices<'a, Ts>(MinimalRepresentatives<'a, Ts>);

#[allow(missing_docs)]
impl<'a, Ts: TransitionTable> ReachableStateIndices<'a, Ts> {
    pub fn new(ts: &'a Ts, origin: Option<StateId>) -> Self {
        Self(MinimalRepresentatives::new(ts, origin))
    }
}

impl<'a, Ts: TransitionTable> Iterator for ReachableStateIndices<'a, Ts> {
    type Item = StateId;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, q)| q)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use crate::prelude::*;

    #[test]
    fn reachable_states() {
        let moore = MooreMachine::builder()
            .with_states([("s0", "0"), ("s1", "0"), ("s2", "1"), ("s3", "1")])
            .with_transitions([
                ("s0", "a", "s1"),
                ("s0", "b", "s0"),
                ("s1", "a", "s2"),
                ("s1", "b", "s0"),
                ("s2", "a", "s2"),
                ("s2", "b", "s2"),
                ("s3", "a", "s0"),
            ])
            .build()
            .unwrap();

        assert_eq!(
            moore.minimal_representatives().collect_vec(),
            vec![(vec![], 0), (vec![0], 1), (vec![0, 0], 2)]
        );
        assert_eq!(moore.reachable_state_indices().collect_vec(), vec![0, 1, 2]);
    }

    #[test_log::test]
    fn trimming_drops_columns_and_keeps_order() {
        let moore = MooreMachine::builder()
            .with_states([("a", "0"), ("dead", "1"), ("c", "1"), ("b", "0")])
            .with_transitions([("a", "x", "b"), ("b", "x", "c"), ("c", "x", "a")])
            .with_transitions([("dead", "x", "a")])
            .build()
            .unwrap();
        let trimmed = moore.trim();
        assert_eq!(trimmed.states().to_vec(), vec!["a", "c", "b"]);
        assert_eq!(trimmed.outputs(), &["0", "1", "0"]);
        for q in 0..trimmed.size() {
            for p in trimmed.successors(0, q).unwrap() {
                assert!(p < trimmed.size());
            }
        }
    }

    #[test_log::test]
    fn mealy_transitions_into_removed_states_vanish() {
        let mealy = MealyMachine::builder()
            .with_states(["s0", "s1", "s2"])
            .with_transitions([
                ("s0", "a", "s0", "0"),
                ("s1", "a", "s2", "1"),
                ("s2", "a", "s1", "0"),
            ])
            .build()
            .unwrap();
        let trimmed = mealy.trim();
        assert_eq!(trimmed.states().to_vec(), vec!["s0"]);
        assert_eq!(trimmed.cell(0, 0).unwrap().unwrap().output, "0");
    }

    #[test_log::test]
    fn out_of_range_cells_are_skipped() {
        let markers = Markers::default();
        // the row of `y` is one cell short
        let moore = crate::tabular::input::parse_moore(
            ";0;1;0\n;p;q;r\nx;q;r;p\ny;q;q\n",
            &markers,
        )
        .unwrap();
        assert_eq!(
            moore.successors(1, 2),
            Err(ConsistencyError::StateOutOfRange {
                input: "y".into(),
                state: 2,
                len: 2
            })
        );
        let trimmed = moore.trim();
        assert_eq!(trimmed.size(), 3);
        assert_eq!(trimmed.successors(1, 2), Ok(vec![]));
        assert_eq!(trimmed.successors(0, 2), Ok(vec![0]));
    }
}
