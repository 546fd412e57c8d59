use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Block type used for blocks created from plain text.
pub const DEFAULT_BLOCK_TYPE: &str = "unstyled";
/// Length of generated block keys.
pub const DEFAULT_BLOCK_KEY_LENGTH: usize = 5;
/// Shortest configurable key length (65536 distinct keys).
pub const MIN_BLOCK_KEY_LENGTH: usize = 4;
/// Longest key length: the number of hex digits in a UUID.
pub const MAX_BLOCK_KEY_LENGTH: usize = 32;
/// Pattern splitting plain text into blocks (any CRLF, CR or LF).
pub const DEFAULT_TEXT_DELIMITER: &str = r"\r\n?|\n";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error(
        "Block key length must be between {min} and {max}, got {0}",
        min = MIN_BLOCK_KEY_LENGTH,
        max = MAX_BLOCK_KEY_LENGTH
    )]
    InvalidBlockKeyLength(usize),

    #[error("Default block type must not be empty")]
    BlankBlockType,
}

/// Settings for an editing session.
///
/// Every field has a default, so a config file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Type tag for blocks built by `create_from_text` and for the placeholder
    /// block of an otherwise empty document.
    pub default_block_type: String,
    /// Number of characters in a generated block key.
    pub block_key_length: usize,
    /// Regular expression used to split plain text into blocks.
    pub text_delimiter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_block_type: DEFAULT_BLOCK_TYPE.to_string(),
            block_key_length: DEFAULT_BLOCK_KEY_LENGTH,
            text_delimiter: DEFAULT_TEXT_DELIMITER.to_string(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// Load the user config, falling back to defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/inkdraft");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_BLOCK_KEY_LENGTH..=MAX_BLOCK_KEY_LENGTH).contains(&self.block_key_length) {
            return Err(ConfigError::InvalidBlockKeyLength(self.block_key_length));
        }
        if self.default_block_type.trim().is_empty() {
            return Err(ConfigError::BlankBlockType);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/inkdraft/config.toml"));
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert_eq!(config.default_block_type, "unstyled");
        assert_eq!(config.block_key_length, 5);
        assert_eq!(config.text_delimiter, r"\r\n?|\n");
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            default_block_type: "paragraph".to_string(),
            block_key_length: 8,
            text_delimiter: r"\n\n".to_string(),
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config_content = r#"
default_block_type = "header-one"
"#;

        let config: Config = toml::from_str(config_content).unwrap();

        assert_eq!(config.default_block_type, "header-one");
        assert_eq!(config.block_key_length, DEFAULT_BLOCK_KEY_LENGTH);
        assert_eq!(config.text_delimiter, DEFAULT_TEXT_DELIMITER);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/config.toml");
        let test_config = Config {
            block_key_length: 12,
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_load_rejects_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "block_key_length = \"five\"").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_load_rejects_zero_key_length() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "block_key_length = 0").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidBlockKeyLength(0))
        ));
    }

    #[rstest]
    #[case(MIN_BLOCK_KEY_LENGTH - 1)]
    #[case(MAX_BLOCK_KEY_LENGTH + 1)]
    fn test_validate_rejects_key_length_out_of_range(#[case] length: usize) {
        let config = Config {
            block_key_length: length,
            ..Config::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBlockKeyLength(l)) if l == length
        ));
    }

    #[test]
    fn test_validate_accepts_key_length_bounds() {
        for length in [MIN_BLOCK_KEY_LENGTH, MAX_BLOCK_KEY_LENGTH] {
            let config = Config {
                block_key_length: length,
                ..Config::default()
            };

            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_load_rejects_blank_block_type() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "default_block_type = \"  \"").unwrap();

        let result = Config::load_from_path(&config_file);

        assert!(matches!(result, Err(ConfigError::BlankBlockType)));
    }
}
