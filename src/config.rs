use std::path::Path;
use std::time::Duration;

use tracing::warn;

use crate::engine::GameRules;
use crate::error::ConfigError;

/// Largest board edge a chat message can reasonably show.
pub const MAX_BOARD_EDGE: usize = 16;

/// Board and timing rules shared by every game.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub columns: usize,
    pub join_timeout_secs: u64,
    pub default_turn_timer_secs: u64,
    /// Winner's credit as a percentage of the bet (198 = 1.98x).
    pub payout_percent: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: 6,
            columns: 7,
            join_timeout_secs: 15,
            default_turn_timer_secs: 15,
            payout_percent: 198,
        }
    }
}

impl GameConfig {
    pub fn rules(&self) -> GameRules {
        GameRules {
            rows: self.rows,
            columns: self.columns,
            join_timeout: Duration::from_secs(self.join_timeout_secs),
            payout_percent: self.payout_percent,
        }
    }
}

/// Starting funds for the built-in in-memory ledger.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub starting_balance: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            starting_balance: 1_000,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub game: GameConfig,
    pub ledger: LedgerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.game;
        if game.rows == 0 || game.rows > MAX_BOARD_EDGE {
            return Err(ConfigError::Validation(format!(
                "game.rows must be in [1, {MAX_BOARD_EDGE}]"
            )));
        }
        if game.columns == 0 || game.columns > MAX_BOARD_EDGE {
            return Err(ConfigError::Validation(format!(
                "game.columns must be in [1, {MAX_BOARD_EDGE}]"
            )));
        }
        if game.join_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "game.join_timeout_secs must be > 0".into(),
            ));
        }
        if !(5..=60).contains(&game.default_turn_timer_secs) {
            return Err(ConfigError::Validation(
                "game.default_turn_timer_secs must be in [5, 60]".into(),
            ));
        }
        if game.payout_percent == 0 {
            return Err(ConfigError::Validation(
                "game.payout_percent must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        config.validate().expect("default config should be valid");
        assert_eq!(config.game.rules(), GameRules::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
[game]
rows = 8
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.game.rows, 8);
        assert_eq!(config.game.columns, 7);
        assert_eq!(config.ledger.starting_balance, 1_000);
    }

    #[test]
    fn test_empty_toml_uses_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.game.payout_percent, 198);
        assert_eq!(config.game.join_timeout_secs, 15);
    }

    #[test]
    fn test_validation_rejects_zero_rows() {
        let mut config = AppConfig::default();
        config.game.rows = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_huge_board() {
        let mut config = AppConfig::default();
        config.game.columns = MAX_BOARD_EDGE + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_join_timeout() {
        let mut config = AppConfig::default();
        config.game.join_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_turn_timer_out_of_range() {
        let mut config = AppConfig::default();
        config.game.default_turn_timer_secs = 61;
        assert!(config.validate().is_err());
        config.game.default_turn_timer_secs = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_payout() {
        let mut config = AppConfig::default();
        config.game.payout_percent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = AppConfig::load_or_default(Path::new("nonexistent_config.toml")).unwrap();
        assert_eq!(config.game.rows, 6);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[ledger]
starting_balance = 50
"#
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ledger.starting_balance, 50);
        assert_eq!(config.game.columns, 7);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[game]\npayout_percent = 0\n").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let toml_str = AppConfig::default_toml().unwrap();
        let config: AppConfig = toml::from_str(&toml_str).unwrap();
        config.validate().expect("roundtripped config should be valid");
    }
}
