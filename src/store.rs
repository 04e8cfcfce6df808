use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::{instrument, trace};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no save named `{0}`")]
    Missing(String),

    #[error("save `{key}` could not be accessed: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Key/value text storage for ledgers and channel configs.
pub trait SaveStore {
    fn exists(&self, key: &str) -> bool;

    fn load(&self, key: &str) -> Result<String, StoreError>;

    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError>;
}

/// One `<key>.save` text file per key.
#[derive(Debug, Clone)]
pub struct FsSaveStore {
    dir: PathBuf,
}

impl FsSaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.save"))
    }
}

impl SaveStore for FsSaveStore {
    fn exists(&self, key: &str) -> bool {
        self.path(key).is_file()
    }

    #[instrument(skip(self))]
    fn load(&self, key: &str) -> Result<String, StoreError> {
        fs::read_to_string(self.path(key)).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::Missing(key.to_owned()),
            _ => StoreError::Io {
                key: key.to_owned(),
                source,
            },
        })
    }

    #[instrument(skip(self, contents))]
    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            key: key.to_owned(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_error)?;
        fs::write(self.path(key), contents).map_err(io_error)?;

        trace!(bytes = contents.len(), "saved");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl SaveStore for MemoryStore {
    fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn load(&self, key: &str) -> Result<String, StoreError> {
        self.get(key)
            .ok_or_else(|| StoreError::Missing(key.to_owned()))
    }

    fn save(&self, key: &str, contents: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), contents.to_owned());
        Ok(())
    }
}
