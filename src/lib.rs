#![warn(clippy::perf)]
#![warn(clippy::unwrap_used)]

//! One Motus word-guessing game per chat channel.
//!
//! The chat gateway stays outside: it parses commands, calls into a
//! [`Channel`] from [`Channels`] and renders what comes back.

pub mod errors;
pub use errors::{Error, Result};

pub mod games;
pub use games::motus::{Channel, Channels, GameConfig, GameState, ScoreLedger};

pub mod logging;

pub mod settings;
pub use settings::Settings;

pub mod store;
pub use store::{FsSaveStore, MemoryStore, SaveStore};
