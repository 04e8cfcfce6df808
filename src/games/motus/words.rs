use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use rand::{seq::SliceRandom, Rng};
use thiserror::Error;
use tracing::{debug, instrument, trace, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::GameConfig;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WordsError {
    #[error("no word list for language `{language}` with {size} letters")]
    NotFound { language: String, size: u16 },
}

/// Score bonuses a language grants for playing with diacritics or compound
/// words enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multipliers {
    pub diacritics: f32,
    pub compounds: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            diacritics: 1.0,
            compounds: 1.0,
        }
    }
}

/// Source of dictionaries, keyed by language code and word length.
pub trait WordListProvider {
    fn load_words(&self, language: &str, size: u16) -> Result<Vec<String>, WordsError>;

    /// Missing multipliers are `1.0`.
    fn load_multipliers(&self, language: &str) -> Multipliers;
}

/// Removes accents and other combining marks, recomposing what is left.
pub fn strip_diacritics(word: &str) -> String {
    word.nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .nfc()
        .collect()
}

pub fn is_compound(word: &str) -> bool {
    word.contains('-')
}

/// The dictionary a channel currently plays with.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<String>,
    known: HashSet<String>,
}

impl WordList {
    /// Applies the config's compound filter. When diacritics are disallowed,
    /// lookups go through the stripped form of every word.
    pub fn new(words: Vec<String>, config: &GameConfig) -> Self {
        let words: Vec<String> = if config.compounds_allowed {
            words
        } else {
            words.into_iter().filter(|word| !is_compound(word)).collect()
        };

        let known = if config.diacritics_allowed {
            words.iter().cloned().collect()
        } else {
            words.iter().map(|word| strip_diacritics(word)).collect()
        };

        Self { words, known }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// `word` must already be normalized the way the list was built.
    pub fn contains(&self, word: &str) -> bool {
        self.known.contains(word)
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.words.choose(rng).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.words.iter().map(String::as_str)
    }
}

/// Reads dictionaries laid out as
/// `<root>/<language>/Dictionaries/<size>L.txt`, one whitespace separated
/// list per file, with optional `diacritics_multiplier.txt` and
/// `compounds_multiplier.txt` next to the `Dictionaries` folder.
#[derive(Debug, Clone)]
pub struct FsWordLists {
    root: PathBuf,
}

impl FsWordLists {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dictionary_path(&self, language: &str, size: u16) -> PathBuf {
        self.root
            .join(language)
            .join("Dictionaries")
            .join(format!("{size}L.txt"))
    }

    fn read_multiplier(&self, language: &str, file: &str) -> f32 {
        let path = self.root.join(language).join(file);

        let Ok(text) = fs::read_to_string(&path) else {
            trace!(?path, "no multiplier file");
            return 1.0;
        };

        text.trim().parse().unwrap_or_else(|_| {
            warn!(?path, "multiplier could not be parsed, using 1.0");
            1.0
        })
    }
}

impl WordListProvider for FsWordLists {
    #[instrument(skip(self))]
    fn load_words(&self, language: &str, size: u16) -> Result<Vec<String>, WordsError> {
        let path = self.dictionary_path(language, size);

        let text = fs::read_to_string(&path).map_err(|err| {
            debug!(?path, %err, "dictionary unavailable");
            WordsError::NotFound {
                language: language.to_owned(),
                size,
            }
        })?;

        let words: Vec<String> = text
            .trim_start_matches('\u{feff}')
            .split_whitespace()
            .map(str::to_owned)
            .collect();

        debug!(count = words.len(), "dictionary loaded");
        Ok(words)
    }

    fn load_multipliers(&self, language: &str) -> Multipliers {
        Multipliers {
            diacritics: self.read_multiplier(language, "diacritics_multiplier.txt"),
            compounds: self.read_multiplier(language, "compounds_multiplier.txt"),
        }
    }
}

/// Word lists held in memory, for tests and embedders that bring their own
/// dictionaries.
#[derive(Debug, Clone, Default)]
pub struct MemoryWordLists {
    words: HashMap<(String, u16), Vec<String>>,
    multipliers: HashMap<String, Multipliers>,
}

impl MemoryWordLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// The list's size key is the char count of its first word. Lists whose
    /// words are too long for a `u16` size are left out.
    pub fn with_words<I, S>(mut self, language: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: Vec<String> = words.into_iter().map(Into::into).collect();
        let length = words.first().map_or(0, |word| word.chars().count());

        match u16::try_from(length) {
            Ok(size) => {
                self.words.insert((language.to_owned(), size), words);
            }
            Err(_) => warn!(language, length, "word too long for a list size, skipping list"),
        }

        self
    }

    pub fn with_multipliers(mut self, language: &str, multipliers: Multipliers) -> Self {
        self.multipliers.insert(language.to_owned(), multipliers);
        self
    }
}

impl WordListProvider for MemoryWordLists {
    fn load_words(&self, language: &str, size: u16) -> Result<Vec<String>, WordsError> {
        self.words
            .get(&(language.to_owned(), size))
            .cloned()
            .ok_or_else(|| WordsError::NotFound {
                language: language.to_owned(),
                size,
            })
    }

    fn load_multipliers(&self, language: &str) -> Multipliers {
        self.multipliers
            .get(language)
            .copied()
            .unwrap_or_default()
    }
}
