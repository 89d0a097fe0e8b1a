//! Library for transforming finite state machines that are given as transition tables.
//!
//! The central objects are [`MooreMachine`](machine::MooreMachine) and
//! [`MealyMachine`](machine::MealyMachine). Both store their states and input symbols as
//! ordered [`Labels`](table::Labels), so the order in which states and inputs were read is
//! the order in which they are processed and written again. A Moore machine carries one
//! output per state, whereas a Mealy machine attaches an output to every transition. The
//! column of the first state is always the initial state.
//!
//! All operations consume a reference to a machine and produce a new one, nothing is ever
//! modified in place. The operations that are offered are
//! - [`trim`](table::TransitionTable::trim) which removes all states that cannot be reached
//!   from the initial state, it is available on every type implementing
//!   [`TransitionTable`](table::TransitionTable),
//! - the conversions [`MooreMachine::to_mealy`](machine::MooreMachine::to_mealy) and
//!   [`MealyMachine::to_moore`](machine::MealyMachine::to_moore), where the latter may have
//!   to split a state into several Moore states if it is entered with different outputs,
//! - minimization through partition refinement, see [`minimization`],
//! - compilation of left- or right-linear grammars into a nondeterministic automaton
//!   ([`Nfa`](machine::Nfa)) and its determinization into a Moore machine.
//!
//! Special symbols such as the blank output or the epsilon glyph are never global, they
//! are collected in a [`Markers`] value that is handed to every operation that needs them.
//!
//! The [`tabular`] module reads and writes the `;`-separated table format that is used
//! by the `fsmconv` binary.
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_transform::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        grammar::{Direction, Grammar, Inference},
        machine::{
            ConstructionError, MealyBuilder, MealyCell, MealyMachine, MooreBuilder, MooreMachine,
            Nfa,
        },
        markers::Markers,
        math,
        table::{
            reachable::MinimalRepresentative, ConsistencyError, InputId, Labels, StateId,
            TransitionTable,
        },
        Show, Symbol,
    };
}

/// This module contains some definitions of mathematical objects which are used throughout the crate and
/// do not really fit to the top level.
pub mod math;

mod markers;
pub use markers::Markers;

/// Ordered labels and the [`TransitionTable`](table::TransitionTable) abstraction shared by all
/// machine types, together with reachability.
pub mod table;

/// Defines the concrete machine types.
pub mod machine;

/// Conversions between Mealy and Moore machines.
pub mod convert;

/// Contains the partition refinement algorithm used for minimizing Moore and Mealy machines.
pub mod minimization;

/// Regular grammars and their compilation into finite automata.
pub mod grammar;

/// Reading and writing of the `;`-separated table format.
pub mod tabular;

/// Implements the generation of random machines.
#[cfg(feature = "random")]
pub mod random;

use itertools::Itertools;

/// Symbols are opaque strings, they are used for inputs, outputs and state labels alike.
/// Two symbols are equal precisely if the strings are equal.
pub type Symbol = String;

/// Helper trait which can be used to display states, transitions and such.
pub trait Show {
    /// Returns a human readable representation of `self`, for a state that should be its
    /// label and for a machine it is the rendered transition table.
    /// This is mainly used for debugging purposes.
    fn show(&self) -> String;
}

impl Show for usize {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl Show for String {
    fn show(&self) -> String {
        self.clone()
    }
}

impl Show for str {
    fn show(&self) -> String {
        self.to_string()
    }
}

impl<S: Show> Show for Option<S> {
    fn show(&self) -> String {
        match self {
            None => "-".to_string(),
            Some(x) => x.show(),
        }
    }
}

impl<S: Show> Show for [S] {
    fn show(&self) -> String {
        format!("[{}]", self.iter().map(|x| x.show()).join(", "))
    }
}

impl<S: Show> Show for Vec<S> {
    fn show(&self) -> String {
        self.as_slice().show()
    }
}

impl<S: Show, T: Show> Show for (S, T) {
    fn show(&self) -> String {
        format!("({}, {})", self.0.show(), self.1.show())
    }
}

impl<S: Show + ?Sized> Show for &S {
    fn show(&self) -> String {
        S::show(*self)
    }
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// The three state Moore machine cycling through `q0 -> q1 -> q2 -> q0`, where `q0` and
    /// `q2` share the output `0`.
    pub fn cyclic_moore() -> MooreMachine {
        MooreMachine::builder()
            .with_states([("q0", "0"), ("q1", "1"), ("q2", "0")])
            .with_transitions([("q0", "a", "q1"), ("q1", "a", "q2"), ("q2", "a", "q0")])
            .build()
            .unwrap()
    }

    #[test]
    fn show_collections() {
        assert_eq!(vec![1usize, 2].show(), "[1, 2]");
        assert_eq!(Some("a".to_string()).show(), "a");
        assert_eq!(None::<usize>.show(), "-");
        assert_eq!(cyclic_moore().states().len(), 3);
    }
}
