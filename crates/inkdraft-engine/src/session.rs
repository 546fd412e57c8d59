use anyhow::Context;
use inkdraft_config::Config;
use regex::Regex;

use crate::model::{
    BlockKey, BlockType, CharacterMetadataPool, EntityMap, KeyGenerator, default_text_delimiter,
};

/// Shared services for one editing session.
///
/// Owns the character metadata pool, the entity registry, and the block key
/// generator, along with the defaults used when building content from plain
/// text. Every [`crate::model::ContentState`] built from a session shares its
/// entity registry. Sessions are cheap to clone; clones share all services.
#[derive(Debug, Clone)]
pub struct Session {
    pool: CharacterMetadataPool,
    entity_map: EntityMap,
    keys: KeyGenerator,
    default_block_type: BlockType,
    text_delimiter: Regex,
}

impl Session {
    pub fn new() -> Self {
        Self {
            pool: CharacterMetadataPool::new(),
            entity_map: EntityMap::new(),
            keys: KeyGenerator::default(),
            default_block_type: BlockType::from(inkdraft_config::DEFAULT_BLOCK_TYPE),
            text_delimiter: default_text_delimiter().clone(),
        }
    }

    /// Build a session from configuration.
    ///
    /// Fails when [`Config::validate`] does or the delimiter pattern does not
    /// compile.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let text_delimiter = Regex::new(&config.text_delimiter).with_context(|| {
            format!("Invalid text delimiter pattern: {}", config.text_delimiter)
        })?;
        log::debug!(
            "Starting session with block type {} and key length {}",
            config.default_block_type,
            config.block_key_length
        );

        Ok(Self {
            pool: CharacterMetadataPool::new(),
            entity_map: EntityMap::new(),
            keys: KeyGenerator::new(config.block_key_length),
            default_block_type: BlockType::from(config.default_block_type.as_str()),
            text_delimiter,
        })
    }

    /// Build a session from the user's config file, or defaults if there is
    /// none.
    pub fn from_user_config() -> anyhow::Result<Self> {
        let config = Config::load_or_default().context("Failed to load inkdraft config")?;
        Self::from_config(&config)
    }

    pub fn pool(&self) -> &CharacterMetadataPool {
        &self.pool
    }

    pub fn entity_map(&self) -> &EntityMap {
        &self.entity_map
    }

    pub fn key_generator(&self) -> &KeyGenerator {
        &self.keys
    }

    pub fn generate_key(&self) -> BlockKey {
        self.keys.generate()
    }

    pub fn default_block_type(&self) -> &BlockType {
        &self.default_block_type
    }

    pub fn text_delimiter(&self) -> &Regex {
        &self.text_delimiter
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentState;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_session() {
        let session = Session::new();

        assert_eq!(session.default_block_type(), &BlockType::Unstyled);
        assert_eq!(session.key_generator().key_length(), 5);
        assert!(session.text_delimiter().is_match("\r\n"));
        assert_eq!(session.pool().len(), 1);
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = Config {
            default_block_type: "paragraph".to_string(),
            block_key_length: 8,
            text_delimiter: ";".to_string(),
        };

        let session = Session::from_config(&config).unwrap();
        let content = ContentState::create_from_text("a;b", None, &session);

        assert_eq!(content.block_map().len(), 2);
        assert_eq!(content.first_block().block_type(), &BlockType::Paragraph);
        assert_eq!(content.first_block().key().as_str().len(), 8);
    }

    #[test]
    fn test_from_config_rejects_bad_delimiter() {
        let config = Config {
            text_delimiter: "(".to_string(),
            ..Config::default()
        };

        let err = Session::from_config(&config).unwrap_err();

        assert!(err.to_string().contains("Invalid text delimiter pattern"));
    }

    #[test]
    fn test_from_config_rejects_blank_block_type() {
        let config = Config {
            default_block_type: "  ".to_string(),
            ..Config::default()
        };

        assert!(Session::from_config(&config).is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_key_length() {
        for block_key_length in [0, 2, 33] {
            let config = Config {
                block_key_length,
                ..Config::default()
            };

            assert!(Session::from_config(&config).is_err(), "length {block_key_length}");
        }
    }

    #[test]
    fn test_clones_share_services() {
        let session = Session::new();
        let clone = session.clone();

        let key = clone.generate_key();

        assert!(session.key_generator().is_known(&key));
        assert!(session.entity_map().ptr_eq(clone.entity_map()));
    }
}
