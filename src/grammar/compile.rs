use tracing::{debug, trace, warn};

use crate::{math::Map, prelude::*};

use super::{Alternative, Direction, Grammar};

/// A state of the automaton under construction. Besides the nonterminals there is the
/// synthetic accepting state of a right-linear grammar and the synthetic initial state of a
/// left-linear one, which can therefore never clash with a nonterminal of the same name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Node {
    Named(Symbol),
    Final,
    Start,
}

/// An edge labelled with a terminal, or with `None` for an epsilon transition.
type Edge = (Node, Option<Symbol>, Node);

#[derive(Debug, Default)]
struct Assembly {
    nodes: Vec<Node>,
    index: Map<Node, StateId>,
    edges: Vec<Edge>,
}

impl Assembly {
    fn register(&mut self, node: Node) {
        if !self.index.contains_key(&node) {
            self.index.insert(node.clone(), self.nodes.len());
            self.nodes.push(node);
        }
    }

    fn has_outgoing(&self, node: &Node) -> bool {
        self.edges.iter().any(|(source, _, _)| source == node)
    }

    /// Whether `node` is entered at all and every edge into it is an epsilon transition.
    fn entered_only_by_epsilon(&self, node: &Node) -> bool {
        let mut incoming = self.edges.iter().filter(|(_, _, target)| target == node).peekable();
        incoming.peek().is_some() && incoming.all(|(_, symbol, _)| symbol.is_none())
    }

    /// Relabels the nodes and assembles the [`Nfa`], `accepting` decides which nodes are
    /// accepting.
    fn finish<F: Fn(&Node) -> bool>(self, markers: &Markers, accepting: F) -> Nfa {
        let mut inputs: Labels = self
            .edges
            .iter()
            .filter_map(|(_, symbol, _)| symbol.clone())
            .collect();
        let epsilon = self
            .edges
            .iter()
            .any(|(_, symbol, _)| symbol.is_none())
            .then(|| inputs.insert(markers.epsilon.clone()));

        let mut transitions = vec![vec![vec![]; self.nodes.len()]; inputs.len()];
        for (source, symbol, target) in &self.edges {
            let row = match symbol {
                Some(symbol) => inputs.index(symbol),
                None => epsilon,
            };
            let (Some(row), Some(q), Some(p)) = (row, self.index.get(source), self.index.get(target)) else {
                continue;
            };
            let cell: &mut Vec<StateId> = &mut transitions[row][*q];
            if !cell.contains(p) {
                cell.push(*p);
            }
        }

        let states = (0..self.nodes.len())
            .map(|i| markers.state_label(i))
            .collect();
        let flags = self.nodes.iter().map(&accepting).collect();
        for (i, node) in self.nodes.iter().enumerate() {
            debug!("{:?} becomes {}", node, markers.state_label(i));
        }
        Nfa::from_parts_unchecked(inputs, states, flags, transitions)
    }
}

impl Grammar {
    /// Compiles the grammar into an [`Nfa`] with the direction given by
    /// [`Grammar::infer_direction`].
    ///
    /// A right-linear rule `<S> -> a <T>` becomes the transition `S -a-> T`. A bare terminal
    /// `a` and the epsilon glyph lead from `S` into a synthetic accepting state. The sentence
    /// symbol is the initial state.
    ///
    /// A left-linear rule `<S> -> <T> a` becomes `T -a-> S`, while a bare terminal or the
    /// epsilon glyph lead into `S` from a synthetic initial state. Here the sentence symbol is
    /// accepting, as is every state that is only ever entered with epsilon and has no
    /// outgoing transitions.
    ///
    /// The states of the result are labelled with the state prefix followed by a counter. The
    /// initial state comes first, then the nonterminals in the order in which they appear and
    /// the synthetic accepting state of a right-linear grammar last. Inputs are ordered by
    /// first appearance, an epsilon input exists only if it is used and comes last.
    pub fn compile(&self, markers: &Markers) -> Nfa {
        let Some(sentence) = self.sentence_symbol().cloned() else {
            warn!("grammar has no rules");
            return Nfa::empty();
        };
        let (direction, inference) = self.infer_direction();
        debug!("compiling {:?} linear grammar ({:?})", direction, inference);

        let mut assembly = Assembly::default();
        match direction {
            Direction::Right => {
                assembly.register(Node::Named(sentence));
                for rule in self.rules() {
                    let lhs = Node::Named(rule.lhs.clone());
                    assembly.register(lhs.clone());
                    for alt in &rule.alternatives {
                        let edge = match alt {
                            Alternative::Terminal(a) => (lhs.clone(), Some(a.clone()), Node::Final),
                            Alternative::Epsilon => (lhs.clone(), None, Node::Final),
                            Alternative::Right(a, t) => {
                                assembly.register(Node::Named(t.clone()));
                                (lhs.clone(), Some(a.clone()), Node::Named(t.clone()))
                            }
                            Alternative::Left(t, a) => {
                                warn!("dropping `<{t}> {a}` from the rule of `<{}>`", rule.lhs);
                                continue;
                            }
                        };
                        trace!("adding edge {:?}", edge);
                        assembly.edges.push(edge);
                    }
                }
                assembly.register(Node::Final);
                assembly.finish(markers, |node| *node == Node::Final)
            }
            Direction::Left => {
                assembly.register(Node::Start);
                for rule in self.rules() {
                    let lhs = Node::Named(rule.lhs.clone());
                    assembly.register(lhs.clone());
                    for alt in &rule.alternatives {
                        let edge = match alt {
                            Alternative::Terminal(a) => (Node::Start, Some(a.clone()), lhs.clone()),
                            Alternative::Epsilon => (Node::Start, None, lhs.clone()),
                            Alternative::Left(t, a) => {
                                assembly.register(Node::Named(t.clone()));
                                (Node::Named(t.clone()), Some(a.clone()), lhs.clone())
                            }
                            Alternative::Right(a, t) => {
                                warn!("dropping `{a} <{t}>` from the rule of `<{}>`", rule.lhs);
                                continue;
                            }
                        };
                        trace!("adding edge {:?}", edge);
                        assembly.edges.push(edge);
                    }
                }
                let accepting = assembly
                    .nodes
                    .iter()
                    .map(|node| {
                        *node == Node::Named(sentence.clone())
                            || (assembly.entered_only_by_epsilon(node)
                                && !assembly.has_outgoing(node))
                    })
                    .collect::<Vec<_>>();
                let index = assembly.index.clone();
                assembly.finish(markers, |node| {
                    index
                        .get(node)
                        .and_then(|i| accepting.get(*i))
                        .copied()
                        .unwrap_or(false)
                })
            }
        }
    }
}
