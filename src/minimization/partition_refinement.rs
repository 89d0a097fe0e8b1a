use std::hash::Hash;

use tracing::{debug, error, trace};

use crate::{
    math::{Map, Partition},
    prelude::*,
};

/// Index of an equivalence class during the refinement.
type ClassId = usize;

/// What distinguishes a state in one refinement pass: its current class and the classes
/// of its successors, one entry per input. An undefined successor is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Signature {
    own: ClassId,
    successors: Vec<Option<ClassId>>,
}

/// The fixed point of the refinement. `classes[q]` is the class of state `q` and classes
/// are numbered by the first state that belongs to them.
#[derive(Debug, Clone)]
pub(crate) struct Refined {
    classes: Vec<ClassId>,
    successors: Vec<Vec<Option<StateId>>>,
}

impl Refined {
    /// The number of classes.
    pub fn size(&self) -> usize {
        self.classes.iter().max().map_or(0, |c| c + 1)
    }

    /// Returns the class of `state`.
    pub fn class_of(&self, state: StateId) -> Option<ClassId> {
        self.classes.get(state).copied()
    }

    /// The first member of each class, ordered by class.
    pub fn representatives(&self) -> Vec<StateId> {
        let mut out = vec![];
        for (q, class) in self.classes.iter().enumerate() {
            if *class == out.len() {
                out.push(q);
            }
        }
        out
    }

    /// The class that `state` reaches on `input`.
    pub fn successor_class(&self, input: InputId, state: StateId) -> Option<ClassId> {
        self.successors
            .get(state)?
            .get(input)
            .copied()
            .flatten()
            .and_then(|p| self.class_of(p))
    }

    /// Collects the classes into a [`Partition`].
    pub fn partition(&self) -> Partition<StateId> {
        let mut classes = vec![vec![]; self.size()];
        for (q, class) in self.classes.iter().enumerate() {
            classes[*class].push(q);
        }
        Partition::new(classes)
    }
}

/// Numbers the distinct keys in the order in which they first appear.
fn number_by_first_occurrence<K: Hash + Eq>(keys: impl IntoIterator<Item = K>) -> Vec<ClassId> {
    let mut seen: Map<K, ClassId> = Map::default();
    keys.into_iter()
        .map(|key| {
            let next = seen.len();
            *seen.entry(key).or_insert(next)
        })
        .collect()
}

/// Collects the successor of every state on every input. Cells that can not be accessed
/// are logged and treated as undefined.
fn successor_table<Ts: TransitionTable>(ts: &Ts) -> Vec<Vec<Option<StateId>>> {
    (0..ts.size())
        .map(|q| {
            (0..ts.inputs().len())
                .map(|i| match ts.successors(i, q) {
                    Ok(targets) => targets.first().copied(),
                    Err(e) => {
                        error!("{e}");
                        None
                    }
                })
                .collect()
        })
        .collect()
}

/// Splits the classes given by `initial` until the successors of all members of a class lie
/// in the same classes. Each pass computes a completely new assignment of classes from the
/// previous one and the loop ends once two consecutive assignments are equal.
fn refine<Ts: TransitionTable>(ts: &Ts, initial: Vec<ClassId>) -> Refined {
    let successors = successor_table(ts);
    let mut classes = initial;
    let mut passes = 0;
    loop {
        passes += 1;
        let next = number_by_first_occurrence(successors.iter().enumerate().map(|(q, row)| {
            Signature {
                own: classes[q],
                successors: row.iter().map(|p| p.map(|p| classes[p])).collect(),
            }
        }));
        trace!("pass {passes} gives classes {:?}", next);
        if next == classes {
            break;
        }
        classes = next;
    }
    let refined = Refined {
        classes,
        successors,
    };
    debug!(
        "refinement of {} states stabilized with {} classes after {passes} passes",
        ts.size(),
        refined.size()
    );
    refined
}

/// Moore's partition refinement for Moore machines, starting from the partition by outputs.
pub(crate) fn moore_partition_refinement(moore: &MooreMachine) -> Refined {
    refine(moore, number_by_first_occurrence(moore.outputs()))
}

/// Partition refinement for Mealy machines, starting from the partition by output vectors.
pub(crate) fn mealy_partition_refinement(mealy: &MealyMachine) -> Refined {
    let initial = number_by_first_occurrence((0..mealy.size()).map(|q| mealy.output_vector(q)));
    refine(mealy, initial)
}
