//! The table format is a `;`-separated text format with one line per table row.
//!
//! A Moore table starts with a line holding the outputs and a line holding the state labels,
//! both with an empty first cell. Every following line starts with an input symbol and lists
//! the target of each state on that input, an empty cell is an undefined transition.
//! ```text
//! ;0;1;0
//! ;q0;q1;q2
//! a;q1;q2;q0
//! ```
//! A Mealy table has no output line and its cells have the form `target/output`.
//! ```text
//! ;q0;q1
//! a;q1/0;q0/1
//! ```
//! Acceptors are written like Moore tables, the first line marks accepting states and the
//! cells hold comma-separated lists of targets.
//!
//! Reading is forgiving: problems with single rows or cells are logged and the offending
//! part is skipped. Only labels that can not be resolved abort the construction with a
//! [`ConstructionError`](crate::machine::ConstructionError).
use std::path::PathBuf;

use thiserror::Error;

use crate::machine::ConstructionError;

/// Parsing of tables.
pub mod input;
/// Serialization of tables.
pub mod output;

/// The separator between two cells of a row.
pub const SEPARATOR: char = ';';

/// Errors that can occur when machines are loaded from or stored to files.
#[derive(Debug, Error)]
pub enum TabularError {
    /// Writing the output file failed.
    #[error("could not write {}: {source}", path.display())]
    Write {
        /// The file that should have been written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
    /// The table could be read, but it does not describe a valid machine.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Splits a line into its cells, surrounding whitespace of each cell is removed.
pub(crate) fn cells(line: &str) -> Vec<&str> {
    line.split(SEPARATOR).map(str::trim).collect()
}
