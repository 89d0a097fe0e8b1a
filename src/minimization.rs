pub(crate) mod partition_refinement;

use crate::{math::Partition, prelude::*};

use partition_refinement::{mealy_partition_refinement, moore_partition_refinement};

impl MooreMachine {
    /// Returns the minimal Moore machine that produces the same output as `self` for every
    /// finite word. States start out grouped by their output and the groups are split until
    /// all members of a group move into the same groups on every input, see
    /// [`MooreMachine::equivalence_partition`].
    ///
    /// The states of the result are labelled with the class prefix of `markers` followed by
    /// the class number. Classes are numbered in the order in which their first member
    /// appears in `self` and the class of the initial state comes first. Transitions and
    /// output of a class are taken from its first member.
    ///
    /// `self` should be trimmed beforehand, unreachable states are minimized along with the
    /// rest.
    pub fn minimize(&self, markers: &Markers) -> MooreMachine {
        let refined = moore_partition_refinement(self);
        let representatives = refined.representatives();
        let states = (0..representatives.len())
            .map(|c| markers.class_label(c))
            .collect();
        let outputs = representatives
            .iter()
            .filter_map(|q| self.output(*q).cloned())
            .collect();
        let transitions = (0..self.inputs().len())
            .map(|input| {
                representatives
                    .iter()
                    .map(|q| refined.successor_class(input, *q))
                    .collect()
            })
            .collect();
        MooreMachine::from_parts_unchecked(self.inputs().clone(), states, outputs, transitions)
    }

    /// Computes the partition of the states of `self` into classes of states that can not be
    /// distinguished by any word.
    pub fn equivalence_partition(&self) -> Partition<StateId> {
        moore_partition_refinement(self).partition()
    }
}

impl MealyMachine {
    /// Minimizes `self`, which works just like [`MooreMachine::minimize`] except that states
    /// are initially grouped by the outputs they produce on each input.
    pub fn minimize(&self, markers: &Markers) -> MealyMachine {
        let refined = mealy_partition_refinement(self);
        let representatives = refined.representatives();
        let states = (0..representatives.len())
            .map(|c| markers.class_label(c))
            .collect();
        let transitions = (0..self.inputs().len())
            .map(|input| {
                representatives
                    .iter()
                    .map(|q| {
                        let cell = self.cell(input, *q).ok().flatten()?;
                        let class = refined.class_of(cell.target)?;
                        Some(MealyCell::new(class, cell.output.clone()))
                    })
                    .collect()
            })
            .collect();
        MealyMachine::from_parts_unchecked(self.inputs().clone(), states, transitions)
    }

    /// Computes the partition of the states of `self` into classes of states that produce
    /// the same outputs on every word.
    pub fn equivalence_partition(&self) -> Partition<StateId> {
        mealy_partition_refinement(self).partition()
    }
}

#[cfg(test)]
mod tests {
    use crate::{math::Partition, prelude::*};

    #[test_log::test]
    fn cyclic_moore_stays_distinct() {
        let markers = Markers::default();
        let moore = crate::tests::cyclic_moore();
        let minimized = moore.minimize(&markers);
        assert_eq!(minimized.size(), 3);
        assert_eq!(minimized.states().to_vec(), vec!["X0", "X1", "X2"]);
        assert_eq!(minimized.outputs(), &["0", "1", "0"]);
        assert_eq!(minimized.target(0, 2), Ok(Some(0)));
        assert_eq!(
            moore.equivalence_partition(),
            Partition::new([vec![0], vec![1], vec![2]])
        );
    }

    #[test]
    fn moore_merges_equivalent_states() {
        let markers = Markers::default();
        // p and r both loop into a state with output 1
        let moore = MooreMachine::builder()
            .with_states([("p", "0"), ("q", "1"), ("r", "0"), ("s", "1")])
            .with_transitions([
                ("p", "a", "q"),
                ("q", "a", "r"),
                ("r", "a", "s"),
                ("s", "a", "p"),
                ("p", "b", "p"),
                ("q", "b", "q"),
                ("r", "b", "r"),
                ("s", "b", "s"),
            ])
            .build()
            .unwrap();
        let minimized = moore.minimize(&markers);
        assert_eq!(minimized.size(), 2);
        assert_eq!(
            moore.equivalence_partition(),
            Partition::new([vec![0, 2], vec![1, 3]])
        );
        assert_eq!(moore.equivalence_partition().class_of(3), Some(1));
        for word in [vec!["a"], vec!["a", "b", "a"], vec!["b", "a", "a", "a"]] {
            assert_eq!(
                minimized.map(word.iter().copied()),
                moore.map(word.iter().copied())
            );
        }
    }

    #[test]
    fn undefined_transitions_distinguish_states() {
        let markers = Markers::default();
        let moore = MooreMachine::builder()
            .with_states([("p", "0"), ("q", "0"), ("r", "0")])
            .with_transitions([("p", "a", "q"), ("q", "a", "r")])
            .build()
            .unwrap();
        assert_eq!(moore.minimize(&markers).size(), 3);
    }

    #[test]
    fn minimization_is_idempotent() {
        let markers = Markers::default();
        let moore = crate::tests::cyclic_moore();
        let once = moore.minimize(&markers);
        let twice = once.minimize(&markers);
        assert_eq!(once, twice);

        let mealy = moore.to_mealy();
        let once = mealy.minimize(&markers);
        assert_eq!(once.minimize(&markers), once);
    }

    #[test]
    fn single_state_is_a_single_class() {
        let markers = Markers::default();
        let moore = MooreMachine::builder()
            .with_states([("only", "x")])
            .with_transitions([("only", "a", "only")])
            .build()
            .unwrap();
        let minimized = moore.minimize(&markers);
        assert_eq!(minimized.states().to_vec(), vec!["X0"]);
        assert_eq!(minimized.outputs(), &["x"]);
        assert_eq!(minimized.target(0, 0), Ok(Some(0)));
    }

    #[test]
    fn mealy_groups_by_output_vector() {
        let markers = Markers::default();
        let mealy = MealyMachine::builder()
            .with_states(["a", "b", "c"])
            .with_transitions([
                ("a", "x", "b", "0"),
                ("a", "y", "c", "1"),
                ("b", "x", "c", "0"),
                ("b", "y", "a", "1"),
                ("c", "x", "a", "1"),
                ("c", "y", "b", "1"),
            ])
            .build()
            .unwrap();
        let minimized = mealy.minimize(&markers);
        // c differs from a and b on x, and b is then separated from a through x
        assert_eq!(minimized.size(), 3);
        assert_eq!(
            mealy.equivalence_partition(),
            Partition::new([vec![0], vec![1], vec![2]])
        );

        let merged = MealyMachine::builder()
            .with_states(["a", "b"])
            .with_transitions([
                ("a", "x", "b", "0"),
                ("b", "x", "a", "0"),
            ])
            .build()
            .unwrap()
            .minimize(&markers);
        assert_eq!(merged.size(), 1);
        assert_eq!(merged.cell(0, 0), Ok(Some(&MealyCell::new(0, "0"))));
    }

    #[cfg(feature = "random")]
    mod brute_force {
        use itertools::Itertools;

        use crate::{prelude::*, random};

        /// Enumerates all words over `alphabet` up to the given length.
        fn words(alphabet: &[Symbol], max_len: usize) -> Vec<Vec<&str>> {
            std::iter::once(vec![])
                .chain((1..=max_len).flat_map(|len| {
                    (0..len)
                        .map(|_| alphabet.iter().map(String::as_str))
                        .multi_cartesian_product()
                }))
                .collect()
        }

        /// Runs `word` from `start` and collects the outputs of all visited states. An
        /// undefined transition ends the run with `None`.
        fn moore_trace(moore: &MooreMachine, start: StateId, word: &[&str]) -> Vec<Option<Symbol>> {
            let mut state = start;
            let mut out = vec![Some(moore.outputs()[state].clone())];
            for symbol in word {
                let input = moore.inputs().index(symbol).unwrap();
                match moore.target(input, state).unwrap() {
                    Some(next) => state = next,
                    None => {
                        out.push(None);
                        break;
                    }
                }
                out.push(Some(moore.outputs()[state].clone()));
            }
            out
        }

        fn mealy_trace(mealy: &MealyMachine, start: StateId, word: &[&str]) -> Vec<Option<Symbol>> {
            let mut state = start;
            let mut out = vec![];
            for symbol in word {
                let input = mealy.inputs().index(symbol).unwrap();
                let Some(cell) = mealy.cell(input, state).unwrap() else {
                    out.push(None);
                    break;
                };
                state = cell.target;
                out.push(Some(cell.output.clone()));
            }
            out
        }

        /// Every other machine leaves about a third of its transitions undefined.
        fn undefined_share(round: usize) -> f32 {
            if round % 2 == 0 {
                0.0
            } else {
                0.3
            }
        }

        #[test]
        fn moore_classes_are_myhill_nerode_classes() {
            let mut rng = fastrand::Rng::with_seed(0x5eed);
            for round in 0..60 {
                let size = rng.usize(1..=6);
                let inputs = rng.usize(1..=3);
                let moore =
                    random::generate_partial_moore(&mut rng, size, inputs, 2, undefined_share(round));
                let inputs = moore.inputs().to_vec();
                let all = words(&inputs, size);
                let partition = moore.equivalence_partition();
                for (p, q) in (0..size).tuple_combinations() {
                    let equivalent = all
                        .iter()
                        .all(|w| moore_trace(&moore, p, w) == moore_trace(&moore, q, w));
                    assert_eq!(partition.related(p, q), equivalent, "{}", moore.show());
                }
            }
        }

        #[test]
        fn mealy_classes_are_myhill_nerode_classes() {
            let mut rng = fastrand::Rng::with_seed(0xfeed);
            for round in 0..60 {
                let size = rng.usize(1..=6);
                let inputs = rng.usize(1..=3);
                let mealy =
                    random::generate_partial_mealy(&mut rng, size, inputs, 2, undefined_share(round));
                let inputs = mealy.inputs().to_vec();
                let all = words(&inputs, size);
                let partition = mealy.equivalence_partition();
                for (p, q) in (0..size).tuple_combinations() {
                    let equivalent = all
                        .iter()
                        .all(|w| mealy_trace(&mealy, p, w) == mealy_trace(&mealy, q, w));
                    assert_eq!(partition.related(p, q), equivalent, "{}", mealy.show());
                }
            }
        }
    }
}
