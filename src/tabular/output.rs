use std::path::Path;

use itertools::Itertools;
use tracing::debug;

use crate::prelude::*;

use super::{TabularError, SEPARATOR};

fn line<I: IntoIterator<Item = S>, S: AsRef<str>>(first: &str, rest: I) -> String {
    std::iter::once(first.to_string())
        .chain(rest.into_iter().map(|s| s.as_ref().to_string()))
        .join(&SEPARATOR.to_string())
}

fn label(states: &Labels, state: StateId) -> &str {
    states.label(state).map(String::as_str).unwrap_or_default()
}

/// Renders a Moore table. The blank output is written as an empty cell, as are undefined
/// transitions and cells that lie outside of a short row.
pub fn write_moore(moore: &MooreMachine, markers: &Markers) -> String {
    let mut lines = vec![
        line(
            "",
            moore
                .outputs()
                .iter()
                .map(|o| if markers.is_blank(o) { "" } else { o.as_str() }),
        ),
        line("", moore.states().labels()),
    ];
    for (input, symbol) in moore.inputs().iter() {
        lines.push(line(
            symbol,
            (0..moore.size()).map(|q| match moore.target(input, q) {
                Ok(Some(p)) => label(moore.states(), p),
                _ => "",
            }),
        ));
    }
    lines.into_iter().map(|l| l + "\n").collect()
}

/// Renders a Mealy table with cells of the form `target/output`.
pub fn write_mealy(mealy: &MealyMachine) -> String {
    let mut lines = vec![line("", mealy.states().labels())];
    for (input, symbol) in mealy.inputs().iter() {
        lines.push(line(
            symbol,
            (0..mealy.size()).map(|q| match mealy.cell(input, q) {
                Ok(Some(cell)) => format!("{}/{}", label(mealy.states(), cell.target), cell.output),
                _ => String::new(),
            }),
        ));
    }
    lines.into_iter().map(|l| l + "\n").collect()
}

/// Renders an acceptor table, accepting states are marked with the accepting marker and
/// the targets of a cell are separated by commas.
pub fn write_nfa(nfa: &Nfa, markers: &Markers) -> String {
    let mut lines = vec![
        line(
            "",
            nfa.accepting()
                .iter()
                .map(|a| if *a { markers.accepting.as_str() } else { "" }),
        ),
        line("", nfa.states().labels()),
    ];
    for (input, symbol) in nfa.inputs().iter() {
        lines.push(line(
            symbol,
            (0..nfa.size()).map(|q| {
                nfa.targets(input, q)
                    .unwrap_or_default()
                    .iter()
                    .map(|p| label(nfa.states(), *p))
                    .join(",")
            }),
        ));
    }
    lines.into_iter().map(|l| l + "\n").collect()
}

fn save(path: &Path, contents: String) -> Result<(), TabularError> {
    std::fs::write(path, contents).map_err(|source| TabularError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {}", path.display());
    Ok(())
}

/// Writes `moore` to `path`, see [`write_moore`].
pub fn save_moore<P: AsRef<Path>>(path: P, moore: &MooreMachine, markers: &Markers) -> Result<(), TabularError> {
    save(path.as_ref(), write_moore(moore, markers))
}

/// Writes `mealy` to `path`, see [`write_mealy`].
pub fn save_mealy<P: AsRef<Path>>(path: P, mealy: &MealyMachine) -> Result<(), TabularError> {
    save(path.as_ref(), write_mealy(mealy))
}

/// Writes `nfa` to `path`, see [`write_nfa`].
pub fn save_nfa<P: AsRef<Path>>(path: P, nfa: &Nfa, markers: &Markers) -> Result<(), TabularError> {
    save(path.as_ref(), write_nfa(nfa, markers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::input::{parse_mealy, read_mealy, read_moore, read_nfa};

    #[test]
    fn moore_table_is_written() {
        let markers = Markers::default();
        let moore = MooreMachine::builder()
            .with_states([("p", "_"), ("q", "1")])
            .with_transitions([("p", "a", "q"), ("q", "b", "p")])
            .build()
            .unwrap();
        assert_eq!(write_moore(&moore, &markers), ";;1\n;p;q\na;q;\nb;;p\n");
    }

    #[test]
    fn mealy_table_is_written() {
        let text = ";s;t\nx;t/0;s/1\ny;;t/0\n";
        let mealy = parse_mealy(text).unwrap();
        assert_eq!(write_mealy(&mealy), text);
    }

    #[test]
    fn files_round_trip() {
        let markers = Markers::default();
        let dir = tempfile::tempdir().unwrap();

        let moore = crate::tests::cyclic_moore();
        let path = dir.path().join("moore.csv");
        save_moore(&path, &moore, &markers).unwrap();
        assert_eq!(read_moore(&path, &markers), Ok(moore.clone()));

        let mealy = moore.to_mealy();
        let path = dir.path().join("mealy.csv");
        save_mealy(&path, &mealy).unwrap();
        assert_eq!(read_mealy(&path), Ok(mealy));

        let nfa = Grammar::parse("<S> -> a <S> | b <T>\n<T> -> ε", &markers).compile(&markers);
        let path = dir.path().join("nfa.csv");
        save_nfa(&path, &nfa, &markers).unwrap();
        assert_eq!(read_nfa(&path, &markers), Ok(nfa));
    }

    #[test]
    fn saving_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_mealy(dir.path().join("nope").join("out.csv"), &MealyMachine::empty());
        assert!(matches!(result, Err(TabularError::Write { .. })));
    }
}
