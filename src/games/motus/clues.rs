use std::collections::BTreeMap;

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;
use tracing::debug;

/// What players get to see after a turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TurnClues {
    pub word_length: usize,
    pub letters_placed: BTreeMap<usize, char>,
    pub letters_misplaced: BTreeMap<usize, char>,
    pub tries_left: u32,
    pub won: bool,
}

impl TurnClues {
    pub fn new(word_length: usize, tries_left: u32) -> Self {
        Self {
            word_length,
            tries_left,
            ..Self::default()
        }
    }
}

/// Letters given away at round start: none below four letters.
pub fn hint_count(word_length: usize) -> usize {
    word_length.saturating_sub(3) / 2
}

/// Moves `count` random positions out of `remaining` and returns them.
pub fn reveal_hints<R: Rng + ?Sized>(
    remaining: &mut BTreeMap<usize, char>,
    count: usize,
    rng: &mut R,
) -> BTreeMap<usize, char> {
    let positions: Vec<usize> = remaining.keys().copied().collect();

    let revealed: BTreeMap<usize, char> = positions
        .choose_multiple(rng, count)
        .filter_map(|position| remaining.remove_entry(position))
        .collect();

    debug!(?revealed, "starting hints");
    revealed
}
