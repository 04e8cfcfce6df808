use std::{
    collections::HashMap,
    panic,
    sync::{Arc, Mutex as SyncMutex},
};

use tokio::{
    sync::{Mutex, RwLock},
    task,
};
use tracing::{debug, warn};

use super::{
    channel::{SharedStore, SharedWords},
    Channel, ChannelId, ConfigBook, FsWordLists, GameConfig,
};
use crate::{settings::Settings, store::FsSaveStore};

/// Every channel's game, each behind its own lock so one channel never waits
/// on another.
#[derive(Clone)]
pub struct Channels {
    channels: Arc<RwLock<HashMap<ChannelId, Arc<Mutex<Channel>>>>>,
    defaults: GameConfig,
    words: SharedWords,
    store: SharedStore,
    configs: Arc<SyncMutex<ConfigBook>>,
}

impl Channels {
    pub fn new(
        defaults: GameConfig,
        words: SharedWords,
        store: SharedStore,
        configs_key: &str,
    ) -> Self {
        let configs = ConfigBook::load(store.as_ref(), configs_key);

        Self {
            channels: Arc::default(),
            defaults,
            words,
            store,
            configs: Arc::new(SyncMutex::new(configs)),
        }
    }

    /// Dictionaries and saves on disk, where `settings` points.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.defaults.clone(),
            Arc::new(FsWordLists::new(&settings.words_dir)),
            Arc::new(FsSaveStore::new(&settings.saves_dir)),
            &settings.configs_key,
        )
    }

    /// The channel's handle, opened on first use.
    ///
    /// Opening reads dictionaries and saves, so it runs on the blocking pool
    /// without holding the registry lock. When two callers race to open the
    /// same channel, the first one to insert wins and both get its handle.
    pub async fn get(&self, id: ChannelId) -> Arc<Mutex<Channel>> {
        if let Some(channel) = self.channels.read().await.get(&id) {
            return channel.clone();
        }

        let opened = Arc::new(Mutex::new(self.open(id).await));

        self.channels
            .write()
            .await
            .entry(id)
            .or_insert(opened)
            .clone()
    }

    async fn open(&self, id: ChannelId) -> Channel {
        debug!(id, "opening channel");

        let defaults = self.defaults.clone();
        let words = self.words.clone();
        let store = self.store.clone();
        let configs = self.configs.clone();
        let open = move || Channel::open(id, &defaults, words, store, configs);

        match task::spawn_blocking(open.clone()).await {
            Ok(channel) => channel,
            Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
            Err(err) => {
                warn!(id, %err, "blocking pool unavailable, opening in place");
                open()
            }
        }
    }

    /// Forgets the channel's in-memory state. Its saved scores and config stay.
    pub async fn remove(&self, id: ChannelId) {
        self.channels.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.channels.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.channels.read().await.is_empty()
    }
}
