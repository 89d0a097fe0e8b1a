use std::path::Path;

use tracing::{debug, error, warn};

use crate::prelude::*;

use super::cells;

/// Yields the lines of `text` that are not blank.
fn significant_lines(text: &str) -> impl Iterator<Item = &str> + '_ {
    text.lines().filter(|line| !line.trim().is_empty())
}

/// The positions of the labelled columns of a table, counted after the leading cell of a
/// line. Columns with an empty label are left out, so their cells are never attached to a
/// neighbouring state.
#[derive(Debug, Clone)]
struct Columns(Vec<usize>);

impl Columns {
    fn len(&self) -> usize {
        self.0.len()
    }

    /// Picks the cells of the labelled columns from `row`. A short row yields a short
    /// result. Content in other columns is reported and ignored.
    fn select<'a>(&self, row: &[&'a str], what: &str) -> Vec<&'a str> {
        let ignored = row
            .iter()
            .enumerate()
            .filter(|(i, cell)| !cell.is_empty() && !self.0.contains(i))
            .count();
        if ignored > 0 {
            warn!("{what} line has {ignored} cells outside of labelled columns, ignoring them");
        }
        self.0.iter().map_while(|i| row.get(*i).copied()).collect()
    }
}

/// Takes the cells of the labelled columns of `line` and pads them with empty cells to one
/// per state.
fn fit<'a>(line: &'a str, columns: &Columns, what: &str) -> Vec<&'a str> {
    let all = cells(line).into_iter().skip(1).collect::<Vec<_>>();
    let mut row = columns.select(&all, what);
    if row.len() < columns.len() {
        warn!("{what} line has {} cells for {} states, padding it", row.len(), columns.len());
        row.resize(columns.len(), "");
    }
    row
}

/// Splits a transition line into its input symbol and its cells. Lines without an input
/// symbol are reported and skipped. Shorter lines are kept as they are.
fn transition_row<'a>(line: &'a str, columns: &Columns) -> Option<(&'a str, Vec<&'a str>)> {
    let mut row = cells(line);
    let input = row.remove(0);
    if input.is_empty() {
        warn!("skipping row without input symbol: `{line}`");
        return None;
    }
    Some((input, columns.select(&row, input)))
}

/// Reads the state labels and the columns they belong to. A column without a label is
/// reported and dropped together with all of its cells.
fn state_labels(line: &str) -> Result<(Labels, Columns), ConstructionError> {
    let mut states = Labels::new();
    let mut columns = vec![];
    for (i, label) in cells(line).into_iter().skip(1).enumerate() {
        if label.is_empty() {
            warn!("ignoring column {} without state label", i + 1);
            continue;
        }
        states.push(label).map_err(ConstructionError::DuplicateState)?;
        columns.push(i);
    }
    Ok((states, Columns(columns)))
}

fn resolve(states: &Labels, label: &str) -> Result<StateId, ConstructionError> {
    states
        .index(label)
        .ok_or_else(|| ConstructionError::UnknownState(label.to_string()))
}

fn resolve_optional(states: &Labels, label: &str) -> Result<Option<StateId>, ConstructionError> {
    if label.is_empty() {
        Ok(None)
    } else {
        resolve(states, label).map(Some)
    }
}

/// Parses a Moore table. Empty output cells are read as the blank output of `markers`.
pub fn parse_moore(text: &str, markers: &Markers) -> Result<MooreMachine, ConstructionError> {
    let mut lines = significant_lines(text);
    let (Some(first), Some(second)) = (lines.next(), lines.next()) else {
        warn!("a moore table needs an output line and a state line");
        return Ok(MooreMachine::empty());
    };
    let (states, columns) = state_labels(second)?;
    let outputs = fit(first, &columns, "output")
        .into_iter()
        .map(|o| {
            if o.is_empty() {
                markers.blank_output.clone()
            } else {
                o.to_string()
            }
        })
        .collect();

    let mut inputs = Labels::new();
    let mut transitions = vec![];
    for (input, row) in lines.filter_map(|line| transition_row(line, &columns)) {
        let row = row
            .into_iter()
            .map(|cell| resolve_optional(&states, cell))
            .collect::<Result<Vec<_>, _>>()?;
        inputs.push(input).map_err(ConstructionError::DuplicateInput)?;
        transitions.push(row);
    }
    debug!(
        "read moore table with {} states and {} inputs",
        states.len(),
        inputs.len()
    );
    MooreMachine::from_parts(inputs, states, outputs, transitions)
}

/// Parses a Mealy table. Cells that are not of the form `target/output` are reported and
/// read as undefined.
pub fn parse_mealy(text: &str) -> Result<MealyMachine, ConstructionError> {
    let mut lines = significant_lines(text);
    let Some(first) = lines.next() else {
        warn!("a mealy table needs a state line");
        return Ok(MealyMachine::empty());
    };
    let (states, columns) = state_labels(first)?;

    let mut inputs = Labels::new();
    let mut transitions = vec![];
    for (input, row) in lines.filter_map(|line| transition_row(line, &columns)) {
        let mut parsed = Vec::with_capacity(row.len());
        for cell in row {
            if cell.is_empty() {
                parsed.push(None);
                continue;
            }
            match cell.split_once('/') {
                Some((target, output)) if !target.trim().is_empty() => {
                    let target = resolve(&states, target.trim())?;
                    parsed.push(Some(MealyCell::new(target, output.trim())));
                }
                _ => {
                    warn!("cell `{cell}` on input `{input}` is not of the form target/output");
                    parsed.push(None);
                }
            }
        }
        inputs.push(input).map_err(ConstructionError::DuplicateInput)?;
        transitions.push(parsed);
    }
    debug!(
        "read mealy table with {} states and {} inputs",
        states.len(),
        inputs.len()
    );
    MealyMachine::from_parts(inputs, states, transitions)
}

/// Parses an acceptor table. A state is accepting if its cell in the first line holds the
/// accepting marker.
pub fn parse_nfa(text: &str, markers: &Markers) -> Result<Nfa, ConstructionError> {
    let mut lines = significant_lines(text);
    let (Some(first), Some(second)) = (lines.next(), lines.next()) else {
        warn!("an acceptor table needs an acceptance line and a state line");
        return Ok(Nfa::empty());
    };
    let (states, columns) = state_labels(second)?;
    let accepting = fit(first, &columns, "acceptance")
        .into_iter()
        .map(|mark| {
            if !mark.is_empty() && mark != markers.accepting {
                warn!("unknown acceptance mark `{mark}`, reading it as not accepting");
            }
            mark == markers.accepting
        })
        .collect();

    let mut inputs = Labels::new();
    let mut transitions = vec![];
    for (input, row) in lines.filter_map(|line| transition_row(line, &columns)) {
        let row = row
            .into_iter()
            .map(|cell| {
                cell.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(|t| resolve(&states, t))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        inputs.push(input).map_err(ConstructionError::DuplicateInput)?;
        transitions.push(row);
    }
    Nfa::from_parts(inputs, states, accepting, transitions)
}

fn read_table(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            error!("could not read {}: {e}", path.display());
            None
        }
    }
}

/// Reads a Moore table from `path`. A file that can not be read is reported and gives an
/// empty machine.
pub fn read_moore<P: AsRef<Path>>(path: P, markers: &Markers) -> Result<MooreMachine, ConstructionError> {
    match read_table(path.as_ref()) {
        Some(text) => parse_moore(&text, markers),
        None => Ok(MooreMachine::empty()),
    }
}

/// Reads a Mealy table from `path`, see [`read_moore`].
pub fn read_mealy<P: AsRef<Path>>(path: P) -> Result<MealyMachine, ConstructionError> {
    match read_table(path.as_ref()) {
        Some(text) => parse_mealy(&text),
        None => Ok(MealyMachine::empty()),
    }
}

/// Reads an acceptor table from `path`, see [`read_moore`].
pub fn read_nfa<P: AsRef<Path>>(path: P, markers: &Markers) -> Result<Nfa, ConstructionError> {
    match read_table(path.as_ref()) {
        Some(text) => parse_nfa(&text, markers),
        None => Ok(Nfa::empty()),
    }
}
