use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{error, info, instrument, warn};

use super::{
    ConfigBook, Error, GameConfig, GameState, GuessOutcome, ScoreLedger, TurnClues,
    WordListProvider,
};
use crate::store::SaveStore;

pub type ChannelId = u64;

pub type SharedWords = Arc<dyn WordListProvider + Send + Sync>;
pub type SharedStore = Arc<dyn SaveStore + Send + Sync>;

type Result<T, E = Error> = std::result::Result<T, E>;

/// Players may ask for a leaderboard of this many.
pub const TOP_SCORES_RANGE: std::ops::RangeInclusive<usize> = 2..=10;

pub fn ledger_key(channel: ChannelId) -> String {
    channel.to_string()
}

/// Everything one channel plays with, plus where it gets saved.
///
/// Every operation first drops a stale round, and persists the ledger or the
/// channel config when they change. Save failures are logged and otherwise
/// ignored.
pub struct Channel {
    id: ChannelId,
    game: GameState,
    ledger: ScoreLedger,
    rng: StdRng,
    clock: fn() -> DateTime<Utc>,
    words: SharedWords,
    store: SharedStore,
    configs: Arc<Mutex<ConfigBook>>,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("id", &self.id)
            .field("game", &self.game)
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl Channel {
    /// Config comes from the book, falling back to `defaults`; the ledger
    /// from the store when one was saved.
    #[instrument(skip(defaults, words, store, configs))]
    pub fn open(
        id: ChannelId,
        defaults: &GameConfig,
        words: SharedWords,
        store: SharedStore,
        configs: Arc<Mutex<ConfigBook>>,
    ) -> Self {
        let config = configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
            .unwrap_or_else(|| defaults.clone());

        let game = GameState::new(config, words.as_ref());
        let ledger = load_ledger(store.as_ref(), id);

        let channel = Self {
            id,
            game,
            ledger,
            rng: StdRng::from_entropy(),
            clock: Utc::now,
            words,
            store,
            configs,
        };
        channel.sync_config();

        info!(players = channel.ledger.len(), "channel opened");
        channel
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// What stale rounds are measured against.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn id(&self) -> ChannelId {
        self.id
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    fn refresh(&mut self) {
        self.game.expire_stale((self.clock)());
    }

    pub fn start_round(&mut self) -> Result<TurnClues> {
        self.refresh();
        self.game.start_round(&mut self.rng).cloned()
    }

    /// Returns the secret word for the reveal.
    pub fn abort(&mut self) -> Result<String> {
        self.refresh();
        self.game.abort()?;
        Ok(self.game.revealed_word().unwrap_or_default())
    }

    pub fn guess(&mut self, player: &str, word: &str) -> Result<GuessOutcome> {
        self.refresh();
        let outcome = self.game.submit_guess(player, word, &mut self.ledger)?;

        if outcome.won() {
            self.save_ledger();
        }

        Ok(outcome)
    }

    pub fn top_scores(&mut self, n: usize) -> Result<Vec<(String, i64)>> {
        self.refresh();

        if !TOP_SCORES_RANGE.contains(&n) {
            return Err(Error::InvalidTopCount(n));
        }

        Ok(self
            .ledger
            .top(n)
            .into_iter()
            .map(|(name, total)| (name.to_owned(), total))
            .collect())
    }

    pub fn set_language(&mut self, language: &str) -> Result<()> {
        self.refresh();
        let result = self.game.set_language(language, self.words.as_ref());
        self.sync_config();
        result
    }

    pub fn set_word_size(&mut self, word_size: u16) -> Result<()> {
        self.refresh();
        let result = self.game.set_word_size(word_size, self.words.as_ref());
        self.sync_config();
        result
    }

    pub fn enable_hard_mode(&mut self) -> Result<()> {
        self.refresh();
        let result = self.game.enable_hard_mode(self.words.as_ref());
        self.sync_config();
        result
    }

    pub fn enable_hints(&mut self) -> Result<()> {
        self.refresh();
        let result = self.game.enable_hints(self.words.as_ref());
        self.sync_config();
        result
    }

    pub fn disable_diacritics(&mut self) -> Result<()> {
        self.refresh();
        let result = self.game.disable_diacritics(self.words.as_ref());
        self.sync_config();
        result
    }

    pub fn disable_compounds(&mut self) -> Result<()> {
        self.refresh();
        let result = self.game.disable_compounds(self.words.as_ref());
        self.sync_config();
        result
    }

    fn sync_config(&self) {
        self.configs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sync(self.id, self.game.config(), self.store.as_ref());
    }

    fn save_ledger(&self) {
        if let Err(err) = self
            .store
            .save(&ledger_key(self.id), &self.ledger.to_string())
        {
            error!(channel = self.id, %err, "could not save scores");
        }
    }
}

fn load_ledger(store: &dyn SaveStore, id: ChannelId) -> ScoreLedger {
    let key = ledger_key(id);

    if !store.exists(&key) {
        return ScoreLedger::new();
    }

    match store.load(&key) {
        Ok(text) => ScoreLedger::parse(&text),
        Err(err) => {
            warn!(channel = id, %err, "scores unreadable, starting empty");
            ScoreLedger::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        games::motus::{configs::DEFAULT_KEY, MemoryWordLists, STALE_AFTER_HOURS},
        store::{MemoryStore, StoreError},
    };

    struct BrokenStore;

    impl SaveStore for BrokenStore {
        fn exists(&self, _key: &str) -> bool {
            false
        }

        fn load(&self, key: &str) -> Result<String, StoreError> {
            Err(StoreError::Missing(key.to_owned()))
        }

        fn save(&self, key: &str, _contents: &str) -> Result<(), StoreError> {
            Err(StoreError::Io {
                key: key.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk on fire"),
            })
        }
    }

    fn defaults() -> GameConfig {
        GameConfig {
            hints_enabled: false,
            word_size: 5,
            ..GameConfig::default()
        }
    }

    fn words() -> SharedWords {
        Arc::new(
            MemoryWordLists::new()
                .with_words("en", ["alloy"])
                .with_words("en", ["abricot"])
                .with_words("fr", ["livre"]),
        )
    }

    fn open(store: SharedStore) -> Channel {
        let configs = Arc::new(Mutex::new(ConfigBook::load(store.as_ref(), DEFAULT_KEY)));
        Channel::open(9, &defaults(), words(), store, configs).with_rng(StdRng::seed_from_u64(5))
    }

    #[test]
    fn win_saves_ledger() {
        let store = Arc::new(MemoryStore::new());
        let mut channel = open(store.clone());

        channel.start_round().expect("words available");
        let outcome = channel.guess("ann", "alloy").expect("valid guess");

        assert!(outcome.won());
        assert_eq!(store.get("9").as_deref(), Some("ann|135"));
    }

    #[test]
    fn ledger_survives_reopen() {
        let store = Arc::new(MemoryStore::new());
        store.save("9", "bob|40\nann|10").expect("infallible");

        let mut channel = open(store.clone());
        assert_eq!(channel.ledger().total("bob"), Some(40));

        channel.start_round().expect("words available");
        channel.guess("ann", "alloy").expect("valid guess");

        let mut reopened = open(store);
        assert_eq!(
            reopened.top_scores(2).expect("in range"),
            vec![("ann".to_owned(), 145), ("bob".to_owned(), 40)]
        );
    }

    #[test]
    fn top_scores_bounds() {
        let mut channel = open(Arc::new(MemoryStore::new()));

        assert_eq!(channel.top_scores(1), Err(Error::InvalidTopCount(1)));
        assert_eq!(channel.top_scores(11), Err(Error::InvalidTopCount(11)));
        assert_eq!(channel.top_scores(10), Ok(Vec::new()));
    }

    #[test]
    fn abort_reveals_word() {
        let mut channel = open(Arc::new(MemoryStore::new()));

        assert_eq!(channel.abort(), Err(Error::NoActiveGame));
        channel.start_round().expect("words available");
        assert_eq!(channel.abort().as_deref(), Ok("alloy"));
        assert_eq!(channel.abort(), Err(Error::NoActiveGame));
    }

    #[test]
    fn config_changes_are_persisted() {
        let store = Arc::new(MemoryStore::new());
        let mut channel = open(store.clone());

        // opening records the defaults
        let book = ConfigBook::load(store.as_ref(), DEFAULT_KEY);
        assert_eq!(book.get(9), Some(&defaults()));

        channel.set_language("fr").expect("words available");
        assert_eq!(
            channel.set_word_size(9),
            Err(Error::no_words("fr", 9))
        );

        let book = ConfigBook::load(store.as_ref(), DEFAULT_KEY);
        assert_eq!(book.get(9).map(|config| config.language.as_str()), Some("fr"));
        assert_eq!(book.get(9).map(|config| config.word_size), Some(5));

        let reopened = open(store);
        assert_eq!(reopened.game().config().language, "fr");
    }

    #[test]
    #[traced_test]
    fn broken_store_does_not_break_the_game() {
        let mut channel = open(Arc::new(BrokenStore));

        channel.start_round().expect("words available");
        let outcome = channel.guess("ann", "alloy").expect("valid guess");

        assert!(outcome.won());
        assert_eq!(channel.ledger().total("ann"), Some(135));
        assert!(logs_contain("could not save scores"));
        assert!(logs_contain("could not save channel configs"));

        channel.enable_hard_mode().expect("words available");
        assert!(channel.game().config().diacritics_allowed);
    }

    fn a_day_later() -> DateTime<Utc> {
        Utc::now() + chrono::Duration::hours(STALE_AFTER_HOURS + 1)
    }

    #[test]
    fn stale_round_dropped_on_next_command() {
        let mut channel = open(Arc::new(MemoryStore::new())).with_clock(a_day_later);

        channel.start_round().expect("words available");
        assert!(channel.game().is_active());

        assert_eq!(channel.guess("ann", "alloy"), Err(Error::NoActiveGame));
        assert!(!channel.game().is_active());
        assert_eq!(channel.game().revealed_word().as_deref(), Some("alloy"));
        assert_eq!(channel.ledger().total("ann"), None);

        channel.start_round().expect("idle again");
    }
}
