use serde::Serialize;

use super::{GameConfig, Multipliers};

pub const PLACED_RATE: i64 = 30;
pub const MISPLACED_RATE: i64 = 10;
pub const WIN_RATE: i64 = 45;
/// Flat award for any letter found with a word that is not in the list.
pub const UNKNOWN_WORD_POINTS: i64 = 5;

pub fn letter_points(placed: bool, known_word: bool, tries_left: u32) -> i64 {
    if !known_word {
        return UNKNOWN_WORD_POINTS;
    }

    let rate = if placed { PLACED_RATE } else { MISPLACED_RATE };
    rate * (i64::from(tries_left) + 1)
}

pub fn win_points(letters_remaining: usize, tries_left: u32) -> i64 {
    WIN_RATE * letters_remaining as i64 * (i64::from(tries_left) + 1)
}

/// Bonuses add up rather than compound, and only count when the matching
/// option is on.
pub fn multiplier(config: &GameConfig, multipliers: Multipliers) -> f32 {
    let mut factor = 1.0;

    if config.diacritics_allowed && multipliers.diacritics > 1.0 {
        factor += multipliers.diacritics - 1.0;
    }

    if config.compounds_allowed && multipliers.compounds > 1.0 {
        factor += multipliers.compounds - 1.0;
    }

    factor
}

/// Divides by ten, rounding half up.
pub fn tenths_rounded(value: i64) -> i64 {
    let quotient = value / 10;

    if value - quotient * 10 >= 5 {
        quotient + 1
    } else {
        quotient
    }
}

/// Round score to ledger points: scaled (fraction dropped), then tenths rounded.
pub fn ledger_points(round_points: i64, multiplier: f32) -> i64 {
    let scaled = (round_points as f32 * multiplier) as i64;
    tenths_rounded(scaled)
}

/// Points earned by each player during the current round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundPoints(Vec<(String, i64)>);

impl RoundPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, player: &str, points: i64) {
        if let Some((_, total)) = self.0.iter_mut().find(|(name, _)| name == player) {
            *total += points;
        } else {
            self.0.push((player.to_owned(), points));
        }
    }

    pub fn get(&self, player: &str) -> Option<i64> {
        self.0
            .iter()
            .find(|(name, _)| name == player)
            .map(|(_, points)| *points)
    }

    /// Puts `winner` first and everyone else in descending order.
    pub fn promote(&mut self, winner: &str) {
        self.0
            .sort_by(|(a_name, a_points), (b_name, b_points)| {
                (b_name == winner)
                    .cmp(&(a_name == winner))
                    .then(b_points.cmp(a_points))
            });
    }

    pub fn map_points(&mut self, mut f: impl FnMut(i64) -> i64) {
        for (_, points) in &mut self.0 {
            *points = f(*points);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.0.iter().map(|(name, points)| (name.as_str(), *points))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}
