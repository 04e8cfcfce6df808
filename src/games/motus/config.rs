use serde::{Deserialize, Serialize};

/// Per-channel game options.
///
/// Compared structurally to tell when a channel's configuration drifted from
/// what was last persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub language: String,
    pub diacritics_allowed: bool,
    pub compounds_allowed: bool,
    pub hints_enabled: bool,
    pub word_size: u16,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            language: "en".to_owned(),
            diacritics_allowed: false,
            compounds_allowed: false,
            hints_enabled: true,
            word_size: 7,
        }
    }
}

impl GameConfig {
    /// Diacritics and compounds allowed, no starting hints.
    pub fn into_hard_mode(mut self) -> Self {
        self.diacritics_allowed = true;
        self.compounds_allowed = true;
        self.hints_enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::GameConfig;

    #[test]
    fn defaults() {
        let config = GameConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.word_size, 7);
        assert!(config.hints_enabled);
        assert!(!config.diacritics_allowed);
        assert!(!config.compounds_allowed);
    }

    #[test]
    fn hard_mode_flips_all_three() {
        let hard = GameConfig::default().into_hard_mode();
        assert!(hard.diacritics_allowed && hard.compounds_allowed && !hard.hints_enabled);
        assert_eq!(hard.word_size, GameConfig::default().word_size);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "language": "fr", "word_size": 8 }"#).expect("hard-coded");

        assert_eq!(
            config,
            GameConfig {
                language: "fr".to_owned(),
                word_size: 8,
                ..GameConfig::default()
            }
        );
    }
}
