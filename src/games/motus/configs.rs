use std::collections::BTreeMap;

use tracing::{debug, error, instrument, warn};

use super::{ChannelId, GameConfig};
use crate::store::SaveStore;

pub const DEFAULT_KEY: &str = "games_configs";

/// Last saved configuration of every channel, kept as one JSON record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigBook {
    key: String,
    configs: BTreeMap<ChannelId, GameConfig>,
}

impl ConfigBook {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            configs: BTreeMap::new(),
        }
    }

    /// Starts empty when the record is missing or unreadable.
    #[instrument(skip(store))]
    pub fn load(store: &dyn SaveStore, key: &str) -> Self {
        let mut book = Self::new(key);

        if !store.exists(key) {
            debug!("no saved channel configs");
            return book;
        }

        let text = match store.load(key) {
            Ok(text) => text,
            Err(err) => {
                warn!(%err, "channel configs unreadable, starting over");
                return book;
            }
        };

        match serde_json::from_str(&text) {
            Ok(configs) => book.configs = configs,
            Err(err) => warn!(%err, "channel configs malformed, starting over"),
        }

        debug!(channels = book.configs.len(), "channel configs loaded");
        book
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self, channel: ChannelId) -> Option<&GameConfig> {
        self.configs.get(&channel)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Records `config` for `channel` and saves the book if it drifted.
    /// A failed save is logged; the book keeps the new value either way.
    #[instrument(skip(self, config, store))]
    pub fn sync(&mut self, channel: ChannelId, config: &GameConfig, store: &dyn SaveStore) -> bool {
        if self.configs.get(&channel) == Some(config) {
            return false;
        }

        self.configs.insert(channel, config.clone());

        match serde_json::to_string(&self.configs) {
            Ok(text) => {
                if let Err(err) = store.save(&self.key, &text) {
                    error!(%err, "could not save channel configs");
                }
            }
            Err(err) => error!(%err, "could not serialize channel configs"),
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::*;
    use crate::store::{MemoryStore, StoreError};

    #[test]
    fn saves_only_on_drift() {
        let store = MemoryStore::new();
        let mut book = ConfigBook::new(DEFAULT_KEY);
        let config = GameConfig::default();

        assert!(book.sync(7, &config, &store));
        let saved = store.get(DEFAULT_KEY).expect("saved");

        assert!(!book.sync(7, &config, &store));

        let hard = config.clone().into_hard_mode();
        assert!(book.sync(7, &hard, &store));
        assert_ne!(store.get(DEFAULT_KEY).expect("saved"), saved);
        assert_eq!(book.get(7), Some(&hard));
    }

    #[test]
    fn reloads_what_it_saved() {
        let store = MemoryStore::new();
        let mut book = ConfigBook::new(DEFAULT_KEY);
        book.sync(1, &GameConfig::default(), &store);
        book.sync(
            2,
            &GameConfig {
                language: "fr".to_owned(),
                ..GameConfig::default()
            },
            &store,
        );

        assert_eq!(ConfigBook::load(&store, DEFAULT_KEY), book);
    }

    #[test]
    #[traced_test]
    fn garbage_starts_empty() {
        let store = MemoryStore::new();
        store.save(DEFAULT_KEY, "not json").expect("infallible");

        let book = ConfigBook::load(&store, DEFAULT_KEY);
        assert!(book.is_empty());
        assert!(logs_contain("channel configs malformed"));
    }

    struct UnreadableStore;

    impl SaveStore for UnreadableStore {
        fn exists(&self, _key: &str) -> bool {
            true
        }

        fn load(&self, key: &str) -> Result<String, StoreError> {
            Err(StoreError::Io {
                key: key.to_owned(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "locked"),
            })
        }

        fn save(&self, _key: &str, _contents: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    #[traced_test]
    fn unreadable_store_starts_empty() {
        let book = ConfigBook::load(&UnreadableStore, DEFAULT_KEY);

        assert!(book.is_empty());
        assert_eq!(book.key(), DEFAULT_KEY);
        assert!(logs_contain("channel configs unreadable"));
    }
}
