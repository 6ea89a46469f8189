use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable consulted when no `--config` flag is given.
pub const CONFIG_ENV: &str = "PATTERNS_CONFIG";

// =============================================================================
// Errors
// =============================================================================

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Value {value} for '{field}' is out of range (min: {min}, max: {max})")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config ({} problem(s)): {}", problems.len(), problems.join("; "))]
    Invalid { problems: Vec<String> },
}

impl ConfigError {
    pub fn out_of_range(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PaymentConfig {
    pub paytm_attempts: u32,
    pub razorpay_attempts: u32,
    pub paytm_success_rate: f64,
    pub razorpay_success_rate: f64,
    /// Base delay between retries; zero keeps demos instant.
    pub retry_base_delay_ms: u64,
    pub seed: u64,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            paytm_attempts: 3,
            razorpay_attempts: 1,
            paytm_success_rate: 0.2,
            razorpay_success_rate: 0.9,
            retry_base_delay_ms: 0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnakeLadderConfig {
    pub board_size: u32,
    pub dice_faces: u32,
    pub difficulty: Difficulty,
    pub seed: u64,
}

impl Default for SnakeLadderConfig {
    fn default() -> Self {
        Self {
            board_size: 100,
            dice_faces: 6,
            difficulty: Difficulty::Medium,
            seed: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TicTacToeConfig {
    pub board_size: usize,
}

impl Default for TicTacToeConfig {
    fn default() -> Self {
        Self { board_size: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlyweightConfig {
    pub asteroid_count: usize,
}

impl Default for FlyweightConfig {
    fn default() -> Self {
        Self {
            asteroid_count: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub output_path: PathBuf,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            output_path: std::env::temp_dir().join("document.txt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeliveryConfig {
    pub search_radius_km: f64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MusicConfig {
    pub seed: u64,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self { seed: 11 }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub payment: PaymentConfig,
    pub snake_ladder: SnakeLadderConfig,
    pub tic_tac_toe: TicTacToeConfig,
    pub flyweight: FlyweightConfig,
    pub document: DocumentConfig,
    pub delivery: DeliveryConfig,
    pub music: MusicConfig,
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Explicit path first, then `PATTERNS_CONFIG`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    /// Collects every problem instead of stopping at the first.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        let mut check = |field: &str, value: f64, min: f64, max: f64| {
            if !(min..=max).contains(&value) {
                problems.push(ConfigError::out_of_range(field, value, min, max).to_string());
            }
        };

        check("payment.paytm_success_rate", self.payment.paytm_success_rate, 0.0, 1.0);
        check(
            "payment.razorpay_success_rate",
            self.payment.razorpay_success_rate,
            0.0,
            1.0,
        );
        check("payment.paytm_attempts", self.payment.paytm_attempts as f64, 1.0, 10.0);
        check(
            "payment.razorpay_attempts",
            self.payment.razorpay_attempts as f64,
            1.0,
            10.0,
        );
        check(
            "snake_ladder.board_size",
            self.snake_ladder.board_size as f64,
            10.0,
            400.0,
        );
        check(
            "snake_ladder.dice_faces",
            self.snake_ladder.dice_faces as f64,
            2.0,
            20.0,
        );
        check(
            "tic_tac_toe.board_size",
            self.tic_tac_toe.board_size as f64,
            3.0,
            10.0,
        );
        check(
            "flyweight.asteroid_count",
            self.flyweight.asteroid_count as f64,
            1.0,
            10_000_000.0,
        );
        check(
            "delivery.search_radius_km",
            self.delivery.search_radius_km,
            0.1,
            100.0,
        );

        if self.logging.level.trim().is_empty() {
            problems.push("logging.level must not be empty".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid { problems })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.payment.paytm_attempts, 3);
        assert_eq!(config.snake_ladder.board_size, 100);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [payment]
            seed = 99

            [tic_tac_toe]
            board_size = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.payment.seed, 99);
        assert_eq!(config.payment.razorpay_attempts, 1);
        assert_eq!(config.tic_tac_toe.board_size, 4);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validation_accumulates_problems() {
        let result = AppConfig::from_toml_str(
            r#"
            [payment]
            paytm_success_rate = 1.5

            [tic_tac_toe]
            board_size = 1
            "#,
        );

        match result {
            Err(ConfigError::Invalid { problems }) => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("paytm_success_rate"));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_error_is_reported() {
        let result = AppConfig::from_toml_str("[payment\nseed = ");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_snake_ladder_difficulty_parses_lowercase() {
        let config = AppConfig::from_toml_str("[snake_ladder]\ndifficulty = \"hard\"").unwrap();
        assert_eq!(config.snake_ladder.difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[delivery]\nsearch_radius_km = 7.5").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.delivery.search_radius_km, 7.5);
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = AppConfig::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
