use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, instrument, trace, warn};

use super::{
    clues::{self, TurnClues},
    guess::{classify, LetterState},
    scoring::{self, RoundPoints},
    words::{strip_diacritics, WordList, WordListProvider},
    Error, GameConfig, Multipliers, ScoreLedger,
};

pub const MAX_TRIES: u32 = 6;

/// Rounds nobody touched for longer than this are dropped silently.
pub const STALE_AFTER_HOURS: i64 = 24;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum RoundStatus {
    #[default]
    Idle,
    Active,
    Won,
    Lost,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Continue,
    RoundOver { won: bool },
}

/// Result of one accepted guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessOutcome {
    pub verdict: Verdict,
    /// The guess is not in the word list. Letters it found were only worth
    /// the flat rate.
    pub unknown_word: bool,
    pub clues: TurnClues,
}

impl GuessOutcome {
    pub fn is_round_over(&self) -> bool {
        matches!(self.verdict, Verdict::RoundOver { .. })
    }

    pub fn won(&self) -> bool {
        self.verdict == Verdict::RoundOver { won: true }
    }
}

/// One channel's game.
///
/// Nothing here looks at the clock on its own: callers run
/// [`GameState::expire_stale`] before each operation, as [`Channel`] does.
///
/// [`Channel`]: super::Channel
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    words: WordList,
    multipliers: Multipliers,

    secret: Vec<char>,
    tries_used: u32,
    max_tries: u32,
    letters_remaining: BTreeMap<usize, char>,
    positions_tried_wrong: BTreeMap<usize, BTreeSet<char>>,
    round_points: RoundPoints,
    turn_clues: TurnClues,

    status: RoundStatus,
    last_played_at: Option<DateTime<Utc>>,
}

impl GameState {
    /// A missing dictionary is not an error yet: the game just cannot start
    /// until the configuration points at one that exists.
    pub fn new(config: GameConfig, provider: &dyn WordListProvider) -> Self {
        let words = match provider.load_words(&config.language, config.word_size) {
            Ok(words) => WordList::new(words, &config),
            Err(err) => {
                warn!(%err, "starting without words");
                WordList::default()
            }
        };
        let multipliers = provider.load_multipliers(&config.language);

        Self {
            config,
            words,
            multipliers,
            secret: Vec::new(),
            tries_used: 0,
            max_tries: MAX_TRIES,
            letters_remaining: BTreeMap::new(),
            positions_tried_wrong: BTreeMap::new(),
            round_points: RoundPoints::new(),
            turn_clues: TurnClues::default(),
            status: RoundStatus::Idle,
            last_played_at: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn words(&self) -> &WordList {
        &self.words
    }

    pub fn multipliers(&self) -> Multipliers {
        self.multipliers
    }

    pub fn is_active(&self) -> bool {
        self.status == RoundStatus::Active
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn tries_used(&self) -> u32 {
        self.tries_used
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    pub fn tries_left(&self) -> u32 {
        self.max_tries.saturating_sub(self.tries_used)
    }

    pub fn letters_remaining(&self) -> &BTreeMap<usize, char> {
        &self.letters_remaining
    }

    pub fn round_points(&self) -> &RoundPoints {
        &self.round_points
    }

    pub fn turn_clues(&self) -> &TurnClues {
        &self.turn_clues
    }

    pub fn last_played_at(&self) -> Option<DateTime<Utc>> {
        self.last_played_at
    }

    /// The secret, once nobody can guess it anymore.
    pub fn revealed_word(&self) -> Option<String> {
        if self.is_active() || self.secret.is_empty() {
            None
        } else {
            Some(self.secret.iter().collect())
        }
    }

    /// Drops an active round last played more than a day before `now`.
    /// Returns whether it did.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> bool {
        let Some(last_played_at) = self.last_played_at else {
            return false;
        };

        if self.is_active() && now - last_played_at > Duration::hours(STALE_AFTER_HOURS) {
            info!(%last_played_at, "round expired");
            self.status = RoundStatus::Idle;
            return true;
        }

        false
    }

    #[instrument(skip_all)]
    pub fn start_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&TurnClues> {
        if self.is_active() {
            return Err(Error::StillRunning);
        }

        let word = self
            .words
            .choose(rng)
            .ok_or_else(|| Error::no_words(&self.config.language, self.config.word_size))?;

        let secret = if self.config.diacritics_allowed {
            word.to_owned()
        } else {
            strip_diacritics(word)
        };
        trace!(secret);

        self.secret = secret.chars().collect();
        self.letters_remaining = self.secret.iter().copied().enumerate().collect();
        self.positions_tried_wrong.clear();
        self.round_points.clear();
        self.tries_used = 0;

        self.turn_clues = TurnClues::new(self.secret.len(), self.max_tries);
        if self.config.hints_enabled {
            let count = clues::hint_count(self.secret.len());
            self.turn_clues.letters_placed =
                clues::reveal_hints(&mut self.letters_remaining, count, rng);
        }

        self.status = RoundStatus::Active;
        self.last_played_at = Some(Utc::now());

        info!(length = self.secret.len(), "round started");
        Ok(&self.turn_clues)
    }

    #[instrument(skip(self))]
    pub fn abort(&mut self) -> Result<()> {
        if !self.is_active() {
            return Err(Error::NoActiveGame);
        }

        self.status = RoundStatus::Aborted;
        info!("round aborted");
        Ok(())
    }

    /// Plays `guess` for `player`. A win pays out into `ledger`.
    #[instrument(skip(self, ledger))]
    pub fn submit_guess(
        &mut self,
        player: &str,
        guess: &str,
        ledger: &mut ScoreLedger,
    ) -> Result<GuessOutcome> {
        if !self.is_active() {
            return Err(Error::NoActiveGame);
        }

        let guess = if self.config.diacritics_allowed {
            guess.to_owned()
        } else {
            strip_diacritics(guess)
        };
        let letters: Vec<char> = guess.chars().collect();

        if letters.len() != self.secret.len() || letters.iter().any(|ch| ch.is_whitespace()) {
            debug!(guess, "rejected");
            return Err(Error::InvalidGuess(guess));
        }

        self.tries_used += 1;
        self.last_played_at = Some(Utc::now());
        let tries_left = self.tries_left();

        if letters == self.secret {
            return Ok(self.process_win(player, tries_left, ledger));
        }

        let known_word = self.words.contains(&guess);
        let outcome = self.process_try(player, &letters, known_word, tries_left);

        if self.tries_used >= self.max_tries {
            self.status = RoundStatus::Lost;
            info!(tries = self.tries_used, "round lost");

            return Ok(GuessOutcome {
                verdict: Verdict::RoundOver { won: false },
                ..outcome
            });
        }

        Ok(outcome)
    }

    fn process_try(
        &mut self,
        player: &str,
        letters: &[char],
        known_word: bool,
        tries_left: u32,
    ) -> GuessOutcome {
        let states = classify(&self.secret, letters);
        let mut clues = TurnClues::new(self.secret.len(), tries_left);

        // placements first, so a letter fixed in this guess no longer counts
        // as findable elsewhere
        for (position, _) in states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == LetterState::Placed)
        {
            if self.letters_remaining.remove(&position).is_some() {
                let points = scoring::letter_points(true, known_word, tries_left);
                self.round_points.grant(player, points);
                trace!(position, points, "placed");
            }
            clues.letters_placed.insert(position, letters[position]);
        }

        for (position, _) in states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == LetterState::Misplaced)
        {
            let letter = letters[position];
            let findable = self.letters_remaining.values().any(|ch| *ch == letter);

            if findable
                && self
                    .positions_tried_wrong
                    .entry(position)
                    .or_default()
                    .insert(letter)
            {
                let points = scoring::letter_points(false, known_word, tries_left);
                self.round_points.grant(player, points);
                trace!(position, points, "misplaced");
            }
            clues.letters_misplaced.insert(position, letter);
        }

        debug!(?clues, known_word);
        self.turn_clues = clues.clone();

        GuessOutcome {
            verdict: Verdict::Continue,
            unknown_word: !known_word,
            clues,
        }
    }

    fn process_win(
        &mut self,
        player: &str,
        tries_left: u32,
        ledger: &mut ScoreLedger,
    ) -> GuessOutcome {
        let bonus = scoring::win_points(self.letters_remaining.len(), tries_left);
        self.round_points.grant(player, bonus);
        self.round_points.promote(player);

        let factor = scoring::multiplier(&self.config, self.multipliers);
        self.round_points
            .map_points(|points| scoring::ledger_points(points, factor));

        for (name, points) in self.round_points.iter() {
            ledger.add(name, points);
        }

        let mut clues = TurnClues::new(self.secret.len(), tries_left);
        clues.letters_placed = self.secret.iter().copied().enumerate().collect();
        clues.won = true;
        self.turn_clues = clues.clone();

        self.letters_remaining.clear();
        self.status = RoundStatus::Won;
        info!(player, bonus, factor, "round won");

        GuessOutcome {
            verdict: Verdict::RoundOver { won: true },
            unknown_word: false,
            clues,
        }
    }

    /// Swaps in `candidate` if its word list loads, otherwise keeps
    /// everything as it was.
    fn reconfigure(
        &mut self,
        candidate: GameConfig,
        provider: &dyn WordListProvider,
    ) -> Result<()> {
        let words = provider.load_words(&candidate.language, candidate.word_size)?;

        self.words = WordList::new(words, &candidate);
        self.multipliers = provider.load_multipliers(&candidate.language);
        self.config = candidate;

        debug!(config = ?self.config, words = self.words.len(), "reconfigured");
        Ok(())
    }

    #[instrument(skip(self, provider))]
    pub fn set_language(&mut self, language: &str, provider: &dyn WordListProvider) -> Result<()> {
        let candidate = GameConfig {
            language: language.to_owned(),
            ..self.config.clone()
        };
        self.reconfigure(candidate, provider)
    }

    #[instrument(skip(self, provider))]
    pub fn set_word_size(&mut self, word_size: u16, provider: &dyn WordListProvider) -> Result<()> {
        let candidate = GameConfig {
            word_size,
            ..self.config.clone()
        };
        self.reconfigure(candidate, provider)
    }

    #[instrument(skip_all)]
    pub fn enable_hard_mode(&mut self, provider: &dyn WordListProvider) -> Result<()> {
        self.reconfigure(self.config.clone().into_hard_mode(), provider)
    }

    #[instrument(skip_all)]
    pub fn enable_hints(&mut self, provider: &dyn WordListProvider) -> Result<()> {
        let candidate = GameConfig {
            hints_enabled: true,
            ..self.config.clone()
        };
        self.reconfigure(candidate, provider)
    }

    #[instrument(skip_all)]
    pub fn disable_diacritics(&mut self, provider: &dyn WordListProvider) -> Result<()> {
        let candidate = GameConfig {
            diacritics_allowed: false,
            ..self.config.clone()
        };
        self.reconfigure(candidate, provider)
    }

    #[instrument(skip_all)]
    pub fn disable_compounds(&mut self, provider: &dyn WordListProvider) -> Result<()> {
        let candidate = GameConfig {
            compounds_allowed: false,
            ..self.config.clone()
        };
        self.reconfigure(candidate, provider)
    }
}
