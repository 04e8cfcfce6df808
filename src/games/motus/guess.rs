use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterState {
    #[default]
    Absent,
    Misplaced,
    Placed,
}

/// Classifies every letter of `guess` against `secret`.
///
/// A secret letter that is not matched in place explains at most one
/// misplaced guess letter, so repeated letters in a guess only light up as
/// many times as the secret can account for them. Both slices must have the
/// same length.
pub fn classify(secret: &[char], guess: &[char]) -> Vec<LetterState> {
    debug_assert_eq!(secret.len(), guess.len());

    let mut unexplained: HashMap<char, usize> = HashMap::new();
    for (wanted, tried) in secret.iter().zip(guess) {
        if wanted != tried {
            *unexplained.entry(*wanted).or_default() += 1;
        }
    }
    trace!(?unexplained);

    secret
        .iter()
        .zip(guess)
        .map(|(wanted, tried)| {
            if wanted == tried {
                return LetterState::Placed;
            }

            match unexplained.get_mut(tried) {
                Some(count) if *count > 0 => {
                    *count -= 1;
                    LetterState::Misplaced
                }
                _ => LetterState::Absent,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use paste::paste;

    use super::LetterState;

    /// `O` placed, `o` misplaced, `.` absent.
    fn pattern(states: &[LetterState]) -> String {
        states
            .iter()
            .map(|state| match state {
                LetterState::Placed => 'O',
                LetterState::Misplaced => 'o',
                LetterState::Absent => '.',
            })
            .collect()
    }

    macro_rules! classify {
        ($($secret:ident, $guess:ident => $result:expr;)+) => {
            paste! {
                $(
                    #[test]
                    fn [<$secret _ $guess>]() {
                        let secret: Vec<char> = stringify!($secret).chars().collect();
                        let guess: Vec<char> = stringify!($guess).chars().collect();
                        pretty_assertions::assert_eq!(
                            pattern(&super::classify(&secret, &guess)),
                            $result
                        )
                    }
                )+
            }
        };
    }

    classify! {
        alloy, lolly => "ooO.O";
        amber, arbor => "O.O.O";
        mummy, tummy => ".OOOO";
        spend, super => "O.oo.";
        pomme, mmmmm => "..OO.";
        lilas, allia => "ooOo.";
        motus, musto => "Ooooo";
        eerie, eeeee => "OO..O";
        banane, ananas => "oooo..";
        abricot, abricot => "OOOOOOO";
    }

    #[test]
    fn handles_accented_letters() {
        let secret: Vec<char> = "élève".chars().collect();
        let guess: Vec<char> = "évêle".chars().collect();
        pretty_assertions::assert_eq!(
            pattern(&super::classify(&secret, &guess)),
            "Oo.oO"
        );
    }
}
