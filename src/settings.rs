use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::games::motus::{configs, GameConfig};

const ENV_PREFIX: &str = "MOTUSBOT";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file read error: {0}")]
    Read(config::ConfigError),

    #[error("parsing error: {0}")]
    Parse(config::ConfigError),
}

/// Where the bot finds its dictionaries and keeps its saves.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    #[serde(default = "default_words_dir")]
    pub words_dir: PathBuf,

    #[serde(default = "default_saves_dir")]
    pub saves_dir: PathBuf,

    /// Save key of the per-channel config record.
    #[serde(default = "default_configs_key")]
    pub configs_key: String,

    /// Used by channels that never saved a config of their own.
    #[serde(default)]
    pub defaults: GameConfig,
}

fn default_words_dir() -> PathBuf {
    PathBuf::from("Lang")
}

fn default_saves_dir() -> PathBuf {
    PathBuf::from("Saves")
}

fn default_configs_key() -> String {
    configs::DEFAULT_KEY.to_owned()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            words_dir: default_words_dir(),
            saves_dir: default_saves_dir(),
            configs_key: default_configs_key(),
            defaults: GameConfig::default(),
        }
    }
}

impl Settings {
    /// Reads `.env`, then the TOML file named by `MOTUSBOT_TOML`
    /// (`./motusbot.toml` by default), then `MOTUSBOT_*` variables.
    pub fn load() -> Result<Self, Error> {
        dotenvy::dotenv().ok();

        let path = if let Ok(path) = std::env::var("MOTUSBOT_TOML") {
            info!(path, "looking for config file with MOTUSBOT_TOML...");
            PathBuf::from(path)
        } else {
            let path = PathBuf::from("./motusbot.toml");
            warn!(?path, "MOTUSBOT_TOML env unset, using default path");
            path
        };

        Self::from_file(&path)
    }

    /// A missing file leaves every setting at its default.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        Self::from_sources(path, ENV_PREFIX)
    }

    /// `<prefix>_SAVES_DIR`, `<prefix>_DEFAULTS__WORD_SIZE` and so on
    /// override the file.
    fn from_sources(path: &Path, env_prefix: &str) -> Result<Self, Error> {
        let settings: Self = ::config::Config::builder()
            .add_source(::config::File::from(path).required(false))
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(Error::Read)?
            .try_deserialize()
            .map_err(Error::Parse)?;

        info!(?settings, "settings loaded");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = Settings::from_file(&dir.path().join("nope.toml")).expect("defaults");

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn reads_toml() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("motusbot.toml");
        fs::write(
            &path,
            r#"
words_dir = "/srv/motus/Lang"
configs_key = "configs"

[defaults]
language = "fr"
word_size = 8
hints_enabled = false
"#,
        )
        .expect("write");

        let settings = Settings::from_file(&path).expect("valid");

        assert_eq!(settings.words_dir, PathBuf::from("/srv/motus/Lang"));
        assert_eq!(settings.saves_dir, PathBuf::from("Saves"));
        assert_eq!(settings.configs_key, "configs");
        assert_eq!(
            settings.defaults,
            GameConfig {
                language: "fr".to_owned(),
                word_size: 8,
                hints_enabled: false,
                ..GameConfig::default()
            }
        );
    }

    #[test]
    fn bad_values_fail_to_parse() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("motusbot.toml");
        fs::write(&path, "[defaults]\nword_size = \"seven\"\n").expect("write");

        assert!(matches!(Settings::from_file(&path), Err(Error::Parse(_))));
    }

    #[test]
    fn environment_overrides_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("motusbot.toml");
        fs::write(&path, "saves_dir = \"/from/file\"\n[defaults]\nword_size = 8\n")
            .expect("write");

        // own prefix, other tests read MOTUSBOT_* in parallel
        std::env::set_var("MOTUSBOTTEST_SAVES_DIR", "/from/env");
        std::env::set_var("MOTUSBOTTEST_DEFAULTS__WORD_SIZE", "6");

        let settings = Settings::from_sources(&path, "MOTUSBOTTEST").expect("valid");

        assert_eq!(settings.saves_dir, PathBuf::from("/from/env"));
        assert_eq!(settings.defaults.word_size, 6);
        assert_eq!(settings.words_dir, PathBuf::from("Lang"));
    }
}
