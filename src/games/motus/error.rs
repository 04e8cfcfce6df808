use thiserror::Error;

use super::words::WordsError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("no game is running in this channel")]
    NoActiveGame,

    #[error("a game is still running in this channel")]
    StillRunning,

    #[error("no words available for language `{language}` with {size} letters")]
    NoWordsAvailable { language: String, size: u16 },

    #[error("guess `{0}` does not fit the secret word")]
    InvalidGuess(String),

    #[error("top scores can only be listed for 2 to 10 players, not {0}")]
    InvalidTopCount(usize),
}

impl Error {
    pub(crate) fn no_words(language: impl Into<String>, size: u16) -> Self {
        Self::NoWordsAvailable {
            language: language.into(),
            size,
        }
    }
}

impl From<WordsError> for Error {
    fn from(value: WordsError) -> Self {
        match value {
            WordsError::NotFound { language, size } => Self::NoWordsAvailable { language, size },
        }
    }
}
