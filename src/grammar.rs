use std::path::Path;

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::{Markers, Symbol};

mod compile;

/// Problems with a single rule of a grammar. [`Grammar::parse`] reports them and skips the
/// offending line or alternative.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The line does not start with `<N> ->`.
    #[error("`{0}` is not a rule of the form `<N> -> ...`")]
    NotARule(String),
    /// A nonterminal is not closed or has an empty name.
    #[error("malformed nonterminal in `{0}`")]
    InvalidNonterminal(String),
    /// An alternative is neither `a`, `a <T>`, `<T> a` nor the epsilon glyph.
    #[error("alternative `{alternative}` of `<{lhs}>` is not linear")]
    MalformedAlternative {
        /// The left-hand side of the rule.
        lhs: Symbol,
        /// The offending alternative.
        alternative: String,
    },
}

/// One alternative on the right-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Alternative {
    /// The epsilon glyph, i.e. the empty word.
    Epsilon,
    /// A single terminal, e.g. `a`.
    Terminal(Symbol),
    /// A terminal followed by a nonterminal, e.g. `a <T>`.
    Right(Symbol, Symbol),
    /// A nonterminal followed by a terminal, e.g. `<T> a`.
    Left(Symbol, Symbol),
}

impl Alternative {
    /// Parses a single alternative of a rule for `lhs`.
    pub fn parse(text: &str, lhs: &str, markers: &Markers) -> Result<Self, GrammarError> {
        let malformed = || GrammarError::MalformedAlternative {
            lhs: lhs.to_string(),
            alternative: text.trim().to_string(),
        };
        match tokenize(text)?.as_slice() {
            [Token::Terminal(a)] if markers.is_epsilon(a) => Ok(Alternative::Epsilon),
            [Token::Terminal(a)] => Ok(Alternative::Terminal(a.clone())),
            [Token::Terminal(a), Token::Nonterminal(t)] if !markers.is_epsilon(a) => {
                Ok(Alternative::Right(a.clone(), t.clone()))
            }
            [Token::Nonterminal(t), Token::Terminal(a)] if !markers.is_epsilon(a) => {
                Ok(Alternative::Left(t.clone(), a.clone()))
            }
            _ => Err(malformed()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Terminal(Symbol),
    Nonterminal(Symbol),
}

/// Splits `text` into nonterminals `<N>` and terminals, which are maximal runs of characters
/// that contain neither whitespace nor angle brackets.
fn tokenize(text: &str) -> Result<Vec<Token>, GrammarError> {
    let mut tokens = vec![];
    let mut rest = text.trim_start();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('<') {
            let end = after
                .find('>')
                .ok_or_else(|| GrammarError::InvalidNonterminal(text.to_string()))?;
            let name = after[..end].trim();
            if name.is_empty() {
                return Err(GrammarError::InvalidNonterminal(text.to_string()));
            }
            tokens.push(Token::Nonterminal(name.to_string()));
            rest = &after[end + 1..];
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '<' || c == '>')
                .unwrap_or(rest.len());
            if end == 0 {
                return Err(GrammarError::InvalidNonterminal(text.to_string()));
            }
            tokens.push(Token::Terminal(rest[..end].to_string()));
            rest = &rest[end..];
        }
        rest = rest.trim_start();
    }
    Ok(tokens)
}

/// A rule `<lhs> -> alt | alt | ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The nonterminal on the left-hand side.
    pub lhs: Symbol,
    /// The alternatives in the order in which they are given.
    pub alternatives: Vec<Alternative>,
}

/// Splits off the left-hand side of a line `<N> -> rest`, returning `N` and `rest`.
fn split_head(line: &str) -> Option<(&str, &str)> {
    let (head, rest) = line.split_once("->")?;
    let name = head.trim().strip_prefix('<')?.strip_suffix('>')?.trim();
    if name.is_empty() || name.contains(|c: char| c == '<' || c == '>') {
        return None;
    }
    Some((name, rest))
}

/// Joins continuation lines with the rule they belong to. A line starts a new rule if it
/// begins with `<N> ->`, every other non-blank line is appended to the previous rule.
pub fn combine_rules(text: &str) -> Vec<String> {
    let mut combined: Vec<String> = vec![];
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match combined.last_mut() {
            Some(current) if split_head(line).is_none() => {
                current.push(' ');
                current.push_str(line.trim());
            }
            _ => combined.push(line.trim().to_string()),
        }
    }
    combined
}

impl Rule {
    /// Parses a complete rule. Alternatives that are malformed are reported and skipped,
    /// so this only fails if the line is not a rule at all.
    pub fn parse(line: &str, markers: &Markers) -> Result<Self, GrammarError> {
        let (lhs, rest) = split_head(line).ok_or_else(|| GrammarError::NotARule(line.to_string()))?;
        let alternatives = rest
            .split('|')
            .filter_map(|alt| match Alternative::parse(alt, lhs, markers) {
                Ok(alt) => Some(alt),
                Err(e) => {
                    warn!("skipping alternative: {e}");
                    None
                }
            })
            .collect();
        Ok(Self {
            lhs: lhs.to_string(),
            alternatives,
        })
    }
}

/// Whether a grammar is read as left- or right-linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Rules have the form `<S> -> <T> a`.
    Left,
    /// Rules have the form `<S> -> a <T>`.
    Right,
}

/// How the [`Direction`] of a grammar was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inference {
    /// All alternatives that mention a nonterminal agree on its position.
    Determined,
    /// No alternative mentions a nonterminal, so both directions give the same language and
    /// right-linear is used.
    OnlySingleSymbols,
    /// Both shapes occur. The grammar is read right-linear and the left-shaped alternatives
    /// are dropped.
    Mixed,
}

/// A regular grammar given by a list of rules. The left-hand side of the first rule is the
/// sentence symbol.
///
/// # Example
/// ```
/// use automata_transform::prelude::*;
///
/// let markers = Markers::default();
/// let grammar = Grammar::parse("<S> -> 0 <S> | 1", &markers);
/// let nfa = grammar.compile(&markers);
/// assert!(nfa.accepts(["0", "0", "1"], &markers));
/// assert!(!nfa.accepts(["1", "0"], &markers));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    rules: Vec<Rule>,
}

impl Grammar {
    /// Creates a grammar from the given rules.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parses the textual form of a grammar. Continuation lines are joined with their rule
    /// first, see [`combine_rules`]. Lines that are not rules are reported and skipped.
    pub fn parse(text: &str, markers: &Markers) -> Self {
        let rules = combine_rules(text)
            .into_iter()
            .filter_map(|line| match Rule::parse(&line, markers) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!("skipping line: {e}");
                    None
                }
            })
            .collect::<Vec<_>>();
        debug!("parsed grammar with {} rules", rules.len());
        Self { rules }
    }

    /// The rules in the order in which they were given.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// The left-hand side of the first rule.
    pub fn sentence_symbol(&self) -> Option<&Symbol> {
        self.rules.first().map(|rule| &rule.lhs)
    }

    fn alternatives(&self) -> impl Iterator<Item = &Alternative> + '_ {
        self.rules.iter().flat_map(|rule| rule.alternatives.iter())
    }

    /// Decides whether the grammar is left- or right-linear. A grammar is left-linear only if
    /// some alternative has the shape `<T> a` and none has the shape `a <T>`, in all other
    /// cases it is read as right-linear.
    pub fn infer_direction(&self) -> (Direction, Inference) {
        let left = self
            .alternatives()
            .any(|alt| matches!(alt, Alternative::Left(..)));
        let right = self
            .alternatives()
            .any(|alt| matches!(alt, Alternative::Right(..)));
        let inferred = match (left, right) {
            (true, false) => (Direction::Left, Inference::Determined),
            (false, true) => (Direction::Right, Inference::Determined),
            (false, false) => (Direction::Right, Inference::OnlySingleSymbols),
            (true, true) => {
                warn!("grammar mixes left- and right-linear alternatives, reading it as right-linear");
                (Direction::Right, Inference::Mixed)
            }
        };
        trace!("inferred {:?}", inferred);
        inferred
    }
}

/// Reads and parses the grammar stored in `path`. If the file can not be read, the problem
/// is logged and an empty grammar is returned.
pub fn read_grammar<P: AsRef<Path>>(path: P, markers: &Markers) -> Grammar {
    match std::fs::read_to_string(path.as_ref()) {
        Ok(text) => Grammar::parse(&text, markers),
        Err(e) => {
            error!("could not read grammar from {}: {e}", path.as_ref().display());
            Grammar::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuation_lines_are_joined() {
        let text = "<S> -> 0 <S>\n   | 1 <A>\n\n<A> -> ε\n";
        assert_eq!(
            combine_rules(text),
            vec!["<S> -> 0 <S> | 1 <A>".to_string(), "<A> -> ε".to_string()]
        );
    }

    #[test]
    fn alternatives_are_classified() {
        let markers = Markers::default();
        let rule = Rule::parse("<S> -> a <T> | <T> b | c | ε | <T> | a b", &markers).unwrap();
        assert_eq!(rule.lhs, "S");
        assert_eq!(
            rule.alternatives,
            vec![
                Alternative::Right("a".into(), "T".into()),
                Alternative::Left("T".into(), "b".into()),
                Alternative::Terminal("c".into()),
                Alternative::Epsilon,
            ]
        );
        assert_eq!(
            Rule::parse("S -> a", &markers),
            Err(GrammarError::NotARule("S -> a".into()))
        );
        assert_eq!(
            tokenize("<T a"),
            Err(GrammarError::InvalidNonterminal("<T a".into()))
        );
    }

    #[test]
    fn direction_is_inferred() {
        let markers = Markers::default();
        let right = Grammar::parse("<S> -> a <S> | b", &markers);
        assert_eq!(right.infer_direction(), (Direction::Right, Inference::Determined));
        let left = Grammar::parse("<S> -> <S> a | b", &markers);
        assert_eq!(left.infer_direction(), (Direction::Left, Inference::Determined));
        let single = Grammar::parse("<S> -> a | b", &markers);
        assert_eq!(
            single.infer_direction(),
            (Direction::Right, Inference::OnlySingleSymbols)
        );
    }

    #[test_log::test]
    fn mixed_grammars_default_to_right() {
        let markers = Markers::default();
        let mixed = Grammar::parse("<S> -> a <A> | <A> b\n<A> -> c", &markers);
        assert_eq!(mixed.infer_direction(), (Direction::Right, Inference::Mixed));
    }

    #[test]
    fn garbage_lines_are_skipped() {
        let markers = Markers::default();
        let grammar = Grammar::parse("hello\n<S> -> a", &markers);
        // `hello` precedes every rule, so it can not be a continuation line
        assert_eq!(grammar.rules().len(), 1);
        assert_eq!(grammar.sentence_symbol().map(String::as_str), Some("S"));
    }

    #[test]
    fn unreadable_grammar_is_empty() {
        let markers = Markers::default();
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            read_grammar(dir.path().join("missing.txt"), &markers),
            Grammar::default()
        );
        let path = dir.path().join("grammar.txt");
        std::fs::write(&path, "<S> -> 0 <S> | 1").unwrap();
        assert_eq!(read_grammar(&path, &markers).rules().len(), 1);
    }
}
