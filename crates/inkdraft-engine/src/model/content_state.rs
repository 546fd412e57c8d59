use std::sync::OnceLock;

use regex::Regex;

use crate::error::ModelError;
use crate::model::{
    BlockKey, BlockMap, CharacterList, ContentBlock, EntityData, EntityInstance, EntityKey,
    EntityMap, EntityMutability, SelectionState, sanitize_text,
};
use crate::session::Session;

/// Delimiter used by [`ContentState::plain_text`] when none is given.
pub const DEFAULT_PLAIN_TEXT_DELIMITER: &str = "\n";

/// Splits plain text on any CRLF, CR or LF sequence.
pub fn default_text_delimiter() -> &'static Regex {
    static DELIMITER: OnceLock<Regex> = OnceLock::new();
    DELIMITER.get_or_init(|| {
        Regex::new(inkdraft_config::DEFAULT_TEXT_DELIMITER).expect("Invalid text delimiter regex")
    })
}

/// Wrapper accepted by [`ContentState::create_from_block_array`] alongside a
/// plain block sequence.
#[derive(Debug, Clone, Default)]
pub struct ContentBlocks {
    pub content_blocks: Vec<ContentBlock>,
}

/// The block sequences [`ContentState::create_from_block_array`] accepts.
#[derive(Debug, Clone)]
pub enum BlockArray {
    Blocks(Vec<ContentBlock>),
    Wrapped(ContentBlocks),
}

impl BlockArray {
    pub fn into_blocks(self) -> Vec<ContentBlock> {
        match self {
            BlockArray::Blocks(blocks) => blocks,
            BlockArray::Wrapped(wrapper) => wrapper.content_blocks,
        }
    }
}

impl From<Vec<ContentBlock>> for BlockArray {
    fn from(blocks: Vec<ContentBlock>) -> Self {
        BlockArray::Blocks(blocks)
    }
}

impl From<ContentBlocks> for BlockArray {
    fn from(wrapper: ContentBlocks) -> Self {
        BlockArray::Wrapped(wrapper)
    }
}

/// Immutable snapshot of a document.
///
/// Holds the blocks in order, the selection recorded before and after the
/// edit that produced this snapshot, and a handle to the session's entity
/// registry. Every edit returns a new `ContentState`; older snapshots stay
/// valid and share all unchanged blocks with newer ones.
///
/// The entity registry is *not* per-snapshot: entities created through any
/// snapshot of a session are visible from all of them.
#[derive(Debug, Clone)]
pub struct ContentState {
    block_map: BlockMap,
    entity_map: EntityMap,
    selection_before: SelectionState,
    selection_after: SelectionState,
}

impl ContentState {
    /// Build a content state from blocks in document order.
    ///
    /// Block keys are registered with the session's key generator. An empty
    /// sequence yields a document with one empty block of the session's
    /// default type. Both recorded selections start collapsed at the start
    /// of the first block.
    pub fn create_from_block_array(blocks: impl Into<BlockArray>, session: &Session) -> Self {
        let mut blocks = blocks.into().into_blocks();
        if blocks.is_empty() {
            let placeholder = ContentBlock::builder(session.generate_key())
                .block_type(session.default_block_type().clone())
                .build(session.pool());
            log::debug!(
                "No blocks given, synthesizing empty block {}",
                placeholder.key()
            );
            blocks.push(placeholder);
        }
        for block in &blocks {
            session.key_generator().register(block.key());
        }

        let selection = SelectionState::create_empty(blocks[0].key().clone());
        Self {
            block_map: BlockMap::from_blocks(blocks),
            entity_map: session.entity_map().clone(),
            selection_before: selection.clone(),
            selection_after: selection,
        }
    }

    /// Build a content state with one block per `delimiter`-separated segment
    /// of `text`.
    ///
    /// `None` uses the session's delimiter. Each segment is sanitized and
    /// gets an all-empty character list.
    pub fn create_from_text(text: &str, delimiter: Option<&Regex>, session: &Session) -> Self {
        let delimiter = delimiter.unwrap_or_else(|| session.text_delimiter());
        let blocks: Vec<ContentBlock> = delimiter
            .split(text)
            .map(|segment| {
                let segment = sanitize_text(segment);
                let length = segment.chars().count();
                ContentBlock::builder(session.generate_key())
                    .block_type(session.default_block_type().clone())
                    .text(segment)
                    .characters(CharacterList::repeat(session.pool().empty(), length))
                    .build(session.pool())
            })
            .collect();
        log::debug!("Created {} block(s) from {} bytes of text", blocks.len(), text.len());
        Self::create_from_block_array(blocks, session)
    }

    pub fn block_map(&self) -> &BlockMap {
        &self.block_map
    }

    pub fn entity_map(&self) -> &EntityMap {
        &self.entity_map
    }

    pub fn selection_before(&self) -> &SelectionState {
        &self.selection_before
    }

    pub fn selection_after(&self) -> &SelectionState {
        &self.selection_after
    }

    pub fn block_for_key(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.block_map.get(key)
    }

    pub fn key_before(&self, key: &BlockKey) -> Option<&BlockKey> {
        self.block_map.key_before(key)
    }

    pub fn key_after(&self, key: &BlockKey) -> Option<&BlockKey> {
        self.block_map.key_after(key)
    }

    pub fn block_before(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.block_map.block_before(key)
    }

    pub fn block_after(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.block_map.block_after(key)
    }

    pub fn blocks_as_vec(&self) -> Vec<ContentBlock> {
        self.block_map.iter().cloned().collect()
    }

    /// Panics if the block map is empty, which construction never allows.
    pub fn first_block(&self) -> &ContentBlock {
        self.block_map
            .first()
            .expect("content state has no blocks")
    }

    /// Panics if the block map is empty, which construction never allows.
    pub fn last_block(&self) -> &ContentBlock {
        self.block_map
            .last()
            .expect("content state has no blocks")
    }

    /// Block texts joined with `delimiter` (a newline when `None` or empty).
    pub fn plain_text(&self, delimiter: Option<&str>) -> String {
        let delimiter = delimiter
            .filter(|d| !d.is_empty())
            .unwrap_or(DEFAULT_PLAIN_TEXT_DELIMITER);
        self.block_map
            .iter()
            .map(ContentBlock::text)
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// True if there is more than one block or the only block has text.
    pub fn has_text(&self) -> bool {
        self.block_map.len() > 1 || !self.first_block().is_empty()
    }

    /// Register a new entity in the shared registry.
    ///
    /// The registry is shared, so the returned state is this one; read the
    /// key from [`ContentState::last_created_entity_key`].
    pub fn create_entity(
        &self,
        entity_type: impl Into<String>,
        mutability: EntityMutability,
        data: EntityData,
    ) -> Self {
        self.entity_map.create(entity_type, mutability, data);
        self.clone()
    }

    pub fn add_entity(&self, instance: EntityInstance) -> Self {
        self.entity_map.add(instance);
        self.clone()
    }

    pub fn merge_entity_data(&self, key: EntityKey, to_merge: EntityData) -> Result<Self, ModelError> {
        self.entity_map.merge_data(key, to_merge)?;
        Ok(self.clone())
    }

    pub fn replace_entity_data(&self, key: EntityKey, new_data: EntityData) -> Result<Self, ModelError> {
        self.entity_map.replace_data(key, new_data)?;
        Ok(self.clone())
    }

    pub fn entity(&self, key: EntityKey) -> Result<EntityInstance, ModelError> {
        self.entity_map.get(key)
    }

    pub fn last_created_entity_key(&self) -> Option<EntityKey> {
        self.entity_map.last_created_key()
    }

    /// Replace the whole block map.
    ///
    /// Panics on an empty map.
    #[must_use]
    pub fn with_block_map(&self, block_map: BlockMap) -> Self {
        assert!(!block_map.is_empty(), "content state has no blocks");
        Self {
            block_map,
            ..self.clone()
        }
    }

    /// Store `block` under its key, sharing every other block.
    #[must_use]
    pub fn with_block(&self, block: ContentBlock) -> Self {
        Self {
            block_map: self.block_map.with_block(block),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_selection_before(&self, selection: SelectionState) -> Self {
        Self {
            selection_before: selection,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_selection_after(&self, selection: SelectionState) -> Self {
        Self {
            selection_after: selection,
            ..self.clone()
        }
    }
}
