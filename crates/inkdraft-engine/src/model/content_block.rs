use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{
    BlockKey, CharacterMetadata, CharacterMetadataPool, EntityKey, InlineStyle, PersistentVec,
};

/// One [`CharacterMetadata`] per character of a block's text.
pub type CharacterList = PersistentVec<CharacterMetadata>;

static EMPTY_STYLE: InlineStyle = InlineStyle::new();

/// Block type tag.
///
/// Known tags get their own variant; anything else is kept verbatim in
/// [`BlockType::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    #[default]
    Unstyled,
    Paragraph,
    HeaderOne,
    HeaderTwo,
    HeaderThree,
    HeaderFour,
    HeaderFive,
    HeaderSix,
    UnorderedListItem,
    OrderedListItem,
    Blockquote,
    CodeBlock,
    Atomic,
    Custom(String),
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::Unstyled => "unstyled",
            BlockType::Paragraph => "paragraph",
            BlockType::HeaderOne => "header-one",
            BlockType::HeaderTwo => "header-two",
            BlockType::HeaderThree => "header-three",
            BlockType::HeaderFour => "header-four",
            BlockType::HeaderFive => "header-five",
            BlockType::HeaderSix => "header-six",
            BlockType::UnorderedListItem => "unordered-list-item",
            BlockType::OrderedListItem => "ordered-list-item",
            BlockType::Blockquote => "blockquote",
            BlockType::CodeBlock => "code-block",
            BlockType::Atomic => "atomic",
            BlockType::Custom(tag) => tag,
        }
    }
}

impl From<&str> for BlockType {
    fn from(tag: &str) -> Self {
        match tag {
            "unstyled" => BlockType::Unstyled,
            "paragraph" => BlockType::Paragraph,
            "header-one" => BlockType::HeaderOne,
            "header-two" => BlockType::HeaderTwo,
            "header-three" => BlockType::HeaderThree,
            "header-four" => BlockType::HeaderFour,
            "header-five" => BlockType::HeaderFive,
            "header-six" => BlockType::HeaderSix,
            "unordered-list-item" => BlockType::UnorderedListItem,
            "ordered-list-item" => BlockType::OrderedListItem,
            "blockquote" => BlockType::Blockquote,
            "code-block" => BlockType::CodeBlock,
            "atomic" => BlockType::Atomic,
            other => BlockType::Custom(other.to_string()),
        }
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        BlockType::from(tag.as_str())
    }
}

impl From<BlockType> for String {
    fn from(block_type: BlockType) -> Self {
        block_type.as_str().to_string()
    }
}

/// A paragraph-level unit: text plus one metadata entry per character.
///
/// Lengths and offsets count Unicode scalar values (`char`s). Text and
/// character list are shared with every copy of the block until one of them
/// changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    key: BlockKey,
    block_type: BlockType,
    text: Arc<str>,
    characters: CharacterList,
    depth: u32,
    length: usize,
}

impl ContentBlock {
    pub fn builder(key: impl Into<BlockKey>) -> ContentBlockBuilder {
        ContentBlockBuilder {
            key: key.into(),
            block_type: BlockType::default(),
            text: String::new(),
            characters: None,
            depth: 0,
        }
    }

    pub fn key(&self) -> &BlockKey {
        &self.key
    }

    pub fn block_type(&self) -> &BlockType {
        &self.block_type
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn characters(&self) -> &CharacterList {
        &self.characters
    }

    /// Text length in characters.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn character_at(&self, offset: usize) -> Option<&CharacterMetadata> {
        self.characters.get(offset)
    }

    /// Style at `offset`; empty past the end of the block.
    pub fn inline_style_at(&self, offset: usize) -> &InlineStyle {
        self.character_at(offset)
            .map_or(&EMPTY_STYLE, CharacterMetadata::style)
    }

    /// Entity at `offset`; `None` past the end of the block.
    pub fn entity_at(&self, offset: usize) -> Option<EntityKey> {
        self.character_at(offset).and_then(CharacterMetadata::entity)
    }

    /// Maximal runs of identical style for which `filter` holds.
    pub fn find_style_ranges(
        &self,
        filter: impl Fn(&CharacterMetadata) -> bool,
    ) -> Vec<Range<usize>> {
        self.find_ranges(|a, b| a.style() == b.style(), filter)
    }

    /// Maximal runs of identical entity for which `filter` holds.
    pub fn find_entity_ranges(
        &self,
        filter: impl Fn(&CharacterMetadata) -> bool,
    ) -> Vec<Range<usize>> {
        self.find_ranges(|a, b| a.entity() == b.entity(), filter)
    }

    fn find_ranges(
        &self,
        are_equal: impl Fn(&CharacterMetadata, &CharacterMetadata) -> bool,
        filter: impl Fn(&CharacterMetadata) -> bool,
    ) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut run_start = 0;
        let mut previous: Option<&CharacterMetadata> = None;

        for (index, character) in self.characters.iter().enumerate() {
            if let Some(prev) = previous
                && !are_equal(prev, character)
            {
                if filter(prev) {
                    ranges.push(run_start..index);
                }
                run_start = index;
            }
            previous = Some(character);
        }

        if let Some(prev) = previous
            && filter(prev)
        {
            ranges.push(run_start..self.length);
        }
        ranges
    }

    /// Replace the character list, keeping the text.
    ///
    /// Panics if the list length differs from the text length.
    #[must_use]
    pub fn with_characters(&self, characters: CharacterList) -> Self {
        assert_eq!(
            characters.len(),
            self.length,
            "character list length must match text length of block {}",
            self.key
        );
        Self {
            characters,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_type(&self, block_type: BlockType) -> Self {
        Self {
            block_type,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_depth(&self, depth: u32) -> Self {
        Self {
            depth,
            ..self.clone()
        }
    }
}

/// Builder for [`ContentBlock`] with the usual defaults: `unstyled`, empty
/// text, depth 0 and an all-empty character list.
#[derive(Debug, Clone)]
pub struct ContentBlockBuilder {
    key: BlockKey,
    block_type: BlockType,
    text: String,
    characters: Option<CharacterList>,
    depth: u32,
}

impl ContentBlockBuilder {
    pub fn block_type(mut self, block_type: impl Into<BlockType>) -> Self {
        self.block_type = block_type.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn characters(mut self, characters: CharacterList) -> Self {
        self.characters = Some(characters);
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Build the block, filling missing characters with the pool's empty
    /// metadata.
    ///
    /// Panics if explicit characters do not match the text length.
    pub fn build(self, pool: &CharacterMetadataPool) -> ContentBlock {
        let length = self.text.chars().count();
        let characters = self
            .characters
            .unwrap_or_else(|| CharacterList::repeat(pool.empty(), length));
        assert_eq!(
            characters.len(),
            length,
            "character list length must match text length of block {}",
            self.key
        );
        ContentBlock {
            key: self.key,
            block_type: self.block_type,
            text: Arc::from(self.text),
            characters,
            depth: self.depth,
            length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CharacterMetadataConfig;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_builder_defaults() {
        let pool = CharacterMetadataPool::new();

        let block = ContentBlock::builder("a").text("hello").build(&pool);

        assert_eq!(block.key(), &BlockKey::from("a"));
        assert_eq!(block.block_type(), &BlockType::Unstyled);
        assert_eq!(block.length(), 5);
        assert_eq!(block.depth(), 0);
        assert!(
            block
                .characters()
                .iter()
                .all(|c| CharacterMetadata::ptr_eq(c, &pool.empty()))
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        let pool = CharacterMetadataPool::new();

        let block = ContentBlock::builder("a").text("héllo ✓").build(&pool);

        assert_eq!(block.length(), 7);
        assert_eq!(block.characters().len(), 7);
    }

    #[test]
    #[should_panic(expected = "character list length must match")]
    fn test_mismatched_characters_panic() {
        let pool = CharacterMetadataPool::new();

        ContentBlock::builder("a")
            .text("abc")
            .characters(CharacterList::repeat(pool.empty(), 2))
            .build(&pool);
    }

    #[test]
    fn test_style_and_entity_lookup() {
        let pool = CharacterMetadataPool::new();
        let bold = pool.create(CharacterMetadataConfig::new().with_style("BOLD"));
        let linked = pool.create(CharacterMetadataConfig::new().with_entity(Some(EntityKey::new(2))));
        let block = ContentBlock::builder("a")
            .text("ab")
            .characters(CharacterList::from_vec(vec![bold, linked]))
            .build(&pool);

        assert!(block.inline_style_at(0).contains("BOLD"));
        assert!(block.inline_style_at(1).is_empty());
        assert!(block.inline_style_at(10).is_empty());
        assert_eq!(block.entity_at(0), None);
        assert_eq!(block.entity_at(1), Some(EntityKey::new(2)));
        assert_eq!(block.entity_at(10), None);
    }

    fn block_with_entities(pool: &CharacterMetadataPool, entities: &[Option<u64>]) -> ContentBlock {
        let characters: CharacterList = entities
            .iter()
            .map(|e| pool.create(CharacterMetadataConfig::new().with_entity(e.map(EntityKey::new))))
            .collect();
        ContentBlock::builder("a")
            .text("x".repeat(entities.len()))
            .characters(characters)
            .build(pool)
    }

    #[rstest]
    #[case(&[], vec![])]
    #[case(&[None, None], vec![])]
    #[case(&[Some(1), Some(1), None], vec![0..2])]
    #[case(&[None, Some(1), Some(2), Some(2)], vec![1..2, 2..4])]
    #[case(&[Some(1), None, Some(1)], vec![0..1, 2..3])]
    fn test_find_entity_ranges(#[case] entities: &[Option<u64>], #[case] expected: Vec<Range<usize>>) {
        let pool = CharacterMetadataPool::new();
        let block = block_with_entities(&pool, entities);

        let ranges = block.find_entity_ranges(|c| c.entity().is_some());

        assert_eq!(ranges, expected);
    }

    #[test]
    fn test_find_style_ranges() {
        let pool = CharacterMetadataPool::new();
        let bold = pool.create(CharacterMetadataConfig::new().with_style("BOLD"));
        let bold_italic = pool.apply_style(&bold, "ITALIC");
        let block = ContentBlock::builder("a")
            .text("abcd")
            .characters(CharacterList::from_vec(vec![
                bold.clone(),
                bold_italic,
                bold,
                pool.empty(),
            ]))
            .build(&pool);

        let bold_runs = block.find_style_ranges(|c| c.has_style("BOLD"));

        assert_eq!(bold_runs, vec![0..1, 1..2, 2..3]);
    }

    #[test]
    fn test_with_characters_shares_text() {
        let pool = CharacterMetadataPool::new();
        let block = ContentBlock::builder("a").text("ab").build(&pool);
        let bold = pool.create(CharacterMetadataConfig::new().with_style("BOLD"));

        let updated = block.with_characters(block.characters().set(0, bold));

        assert!(Arc::ptr_eq(&block.text, &updated.text));
        assert!(updated.inline_style_at(0).contains("BOLD"));
        assert!(block.inline_style_at(0).is_empty());
    }

    #[test]
    fn test_with_type_and_depth() {
        let pool = CharacterMetadataPool::new();
        let block = ContentBlock::builder("a").build(&pool);

        let item = block.with_type(BlockType::UnorderedListItem).with_depth(2);

        assert_eq!(item.block_type(), &BlockType::UnorderedListItem);
        assert_eq!(item.depth(), 2);
        assert_eq!(block.block_type(), &BlockType::Unstyled);
    }

    #[rstest]
    #[case("unstyled", BlockType::Unstyled)]
    #[case("header-two", BlockType::HeaderTwo)]
    #[case("code-block", BlockType::CodeBlock)]
    #[case("callout", BlockType::Custom("callout".to_string()))]
    fn test_block_type_tags(#[case] tag: &str, #[case] expected: BlockType) {
        let block_type = BlockType::from(tag);

        assert_eq!(block_type, expected);
        assert_eq!(block_type.as_str(), tag);
    }
}
