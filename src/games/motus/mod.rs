//! Motus: guess the channel's secret word in six tries.
//!
//! [`GameState`] runs the rounds and scores the guesses, [`ScoreLedger`]
//! keeps the totals, [`Channel`] wires both to a save store and
//! [`Channels`] hands out one locked channel per id.

mod error;
pub use error::Error;

mod config;
pub use self::config::GameConfig;

pub mod words;
pub use words::{FsWordLists, MemoryWordLists, Multipliers, WordList, WordListProvider};

pub mod guess;
pub use guess::LetterState;

pub mod scoring;
pub use scoring::RoundPoints;

mod clues;
pub use clues::TurnClues;

mod game;
pub use game::{GameState, GuessOutcome, RoundStatus, Verdict, MAX_TRIES, STALE_AFTER_HOURS};

mod ledger;
pub use ledger::ScoreLedger;

pub mod configs;
pub use configs::ConfigBook;

mod channel;
pub use channel::{ledger_key, Channel, ChannelId, SharedStore, SharedWords, TOP_SCORES_RANGE};

mod cache;
pub use cache::Channels;
