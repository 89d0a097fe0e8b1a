use fastrand::Rng;
use tracing::trace;

use crate::prelude::*;

/// Returns the alphabet `a, b, c, ...` with `symbols` letters.
fn alphabet(symbols: usize) -> Labels {
    (b'a'..=b'z')
        .take(symbols)
        .map(|c| (c as char).to_string())
        .collect()
}

fn state_labels(size: usize) -> Labels {
    (0..size).map(|i| format!("s{i}")).collect()
}

/// Draws a transition structure with `size` states over `symbols` inputs, one row per
/// input. Each cell is left undefined with probability `undefined`. Depending on the draw,
/// there may be unreachable states.
fn random_targets(rng: &mut Rng, size: usize, symbols: usize, undefined: f32) -> Vec<Vec<Option<StateId>>> {
    (0..symbols)
        .map(|_| {
            (0..size)
                .map(|_| (rng.f32() >= undefined).then(|| rng.usize(..size)))
                .collect()
        })
        .collect()
}

/// Generate a random [`MooreMachine`] of size `size` by randomly drawing transitions.
/// `symbols` determines the number of inputs, which are named `a, b, ...`, and every state
/// is given an output from `0..outputs`. The algorithm is as follows:
/// 1. Start with `size` states and draw an output for each one.
/// 2. For each state, for each symbol draw a target state and add the corresponding edge.
///
/// Note that the result may contain unreachable states.
pub fn generate_random_moore(rng: &mut Rng, size: usize, symbols: usize, outputs: usize) -> MooreMachine {
    generate_partial_moore(rng, size, symbols, outputs, 0.0)
}

/// Works as [`generate_random_moore`], but leaves each transition undefined with
/// probability `undefined`.
pub fn generate_partial_moore(
    rng: &mut Rng,
    size: usize,
    symbols: usize,
    outputs: usize,
    undefined: f32,
) -> MooreMachine {
    let size = size.max(1);
    let state_outputs = (0..size)
        .map(|_| rng.usize(..outputs.max(1)).to_string())
        .collect();
    let transitions = random_targets(rng, size, symbols, undefined);
    trace!("drew random moore machine with {size} states and {symbols} inputs");
    MooreMachine::from_parts_unchecked(alphabet(symbols), state_labels(size), state_outputs, transitions)
}

/// Works as [`generate_random_moore`], but returns a [`MealyMachine`] instead by randomly
/// coloring the transitions.
pub fn generate_random_mealy(rng: &mut Rng, size: usize, symbols: usize, outputs: usize) -> MealyMachine {
    generate_partial_mealy(rng, size, symbols, outputs, 0.0)
}

/// Works as [`generate_random_mealy`], but leaves each transition undefined with
/// probability `undefined`.
pub fn generate_partial_mealy(
    rng: &mut Rng,
    size: usize,
    symbols: usize,
    outputs: usize,
    undefined: f32,
) -> MealyMachine {
    let size = size.max(1);
    let transitions = random_targets(rng, size, symbols, undefined)
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|target| target.map(|p| MealyCell::new(p, rng.usize(..outputs.max(1)).to_string())))
                .collect()
        })
        .collect();
    trace!("drew random mealy machine with {size} states and {symbols} inputs");
    MealyMachine::from_parts_unchecked(alphabet(symbols), state_labels(size), transitions)
}

/// Generate a random word over the given inputs, its length is drawn uniformly from the range
/// `min_len..=max_len`.
pub fn generate_random_word<'a>(rng: &mut Rng, inputs: &'a Labels, min_len: usize, max_len: usize) -> Vec<&'a str> {
    let labels = inputs.labels().collect::<Vec<_>>();
    if labels.is_empty() {
        return vec![];
    }
    let length = rng.usize(min_len..=max_len);
    (0..length)
        .map(|_| labels[rng.usize(..labels.len())].as_str())
        .collect()
}
