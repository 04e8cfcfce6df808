use thiserror::Error as ThisError;

use crate::{games::motus, settings, store::StoreError};

/// Anything the crate can fail with, for hosts that want a single type.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Game(#[from] motus::Error),

    #[error(transparent)]
    Words(#[from] motus::words::WordsError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Settings(#[from] settings::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::games::motus;

    #[test]
    fn game_errors_keep_their_message() {
        let err: Error = motus::Error::StillRunning.into();
        assert_eq!(err.to_string(), "a game is still running in this channel");
    }
}
