use crate::error::ModelError;
use crate::model::{CharacterMetadataPool, ContentBlock, ContentState, EntityKey, SelectionState};
use crate::transaction::{map_character_range, update_selected_blocks};

/// Point every character in `[start, end)` of `block` at `entity_key`
/// (`None` clears the entity).
///
/// Characters outside the range keep their instances and storage; an empty
/// range returns the block unchanged.
///
/// # Panics
///
/// If `start > end` or `end` is past the end of the block.
pub fn apply_entity_to_content_block(
    pool: &CharacterMetadataPool,
    block: &ContentBlock,
    start: usize,
    end: usize,
    entity_key: Option<EntityKey>,
) -> ContentBlock {
    assert!(
        start <= end && end <= block.length(),
        "entity range {start}..{end} is out of bounds for block {} (length {})",
        block.key(),
        block.length()
    );
    map_character_range(block, start, end, |current| {
        pool.apply_entity(current, entity_key)
    })
}

/// Apply `entity_key` to every character covered by `selection`.
///
/// The selection becomes both the before and after selection of the result.
/// Fails if the selection refers to a block that is not in `content` or to
/// an offset past the end of one.
pub fn apply_entity_to_content_state(
    pool: &CharacterMetadataPool,
    content: &ContentState,
    selection: &SelectionState,
    entity_key: Option<EntityKey>,
) -> Result<ContentState, ModelError> {
    update_selected_blocks(content, selection, |block, start, end| {
        apply_entity_to_content_block(pool, block, start, end, entity_key)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKey, CharacterMetadata, CharacterMetadataConfig, EntityData, EntityMutability};
    use crate::tests::{content_from_text, test_session};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn entities(block: &ContentBlock) -> Vec<Option<u64>> {
        block
            .characters()
            .iter()
            .map(|c| c.entity().map(EntityKey::get))
            .collect()
    }

    #[rstest]
    #[case(0, 5, vec![Some(1); 5])]
    #[case(1, 3, vec![None, Some(1), Some(1), None, None])]
    #[case(4, 5, vec![None, None, None, None, Some(1)])]
    #[case(2, 2, vec![None; 5])]
    fn test_applies_exactly_the_range(
        #[case] start: usize,
        #[case] end: usize,
        #[case] expected: Vec<Option<u64>>,
    ) {
        let pool = CharacterMetadataPool::new();
        let block = ContentBlock::builder("a").text("hello").build(&pool);

        let updated = apply_entity_to_content_block(&pool, &block, start, end, Some(EntityKey::new(1)));

        assert_eq!(entities(&updated), expected);
        assert_eq!(updated.text(), "hello");
    }

    #[test]
    fn test_outside_range_keeps_instances() {
        let pool = CharacterMetadataPool::new();
        let bold = pool.create(CharacterMetadataConfig::new().with_style("BOLD"));
        let block = ContentBlock::builder("a")
            .text("abc")
            .characters([bold.clone(), bold.clone(), bold].into_iter().collect())
            .build(&pool);

        let updated = apply_entity_to_content_block(&pool, &block, 1, 2, Some(EntityKey::new(3)));

        for offset in [0, 2] {
            assert!(CharacterMetadata::ptr_eq(
                block.character_at(offset).unwrap(),
                updated.character_at(offset).unwrap()
            ));
        }
        assert!(updated.inline_style_at(1).contains("BOLD"));
        assert_eq!(updated.entity_at(1), Some(EntityKey::new(3)));
    }

    #[test]
    fn test_empty_range_and_reapplication_share_storage() {
        let pool = CharacterMetadataPool::new();
        let block = ContentBlock::builder("a").text("abc").build(&pool);
        let key = Some(EntityKey::new(1));

        let unchanged = apply_entity_to_content_block(&pool, &block, 1, 1, key);
        let once = apply_entity_to_content_block(&pool, &block, 0, 3, key);
        let twice = apply_entity_to_content_block(&pool, &once, 0, 3, key);

        assert!(unchanged.characters().ptr_eq(block.characters()));
        assert_eq!(once, twice);
        assert!(twice.characters().ptr_eq(once.characters()));
    }

    #[test]
    fn test_none_clears_entity() {
        let pool = CharacterMetadataPool::new();
        let block = ContentBlock::builder("a").text("ab").build(&pool);
        let linked = apply_entity_to_content_block(&pool, &block, 0, 2, Some(EntityKey::new(1)));

        let cleared = apply_entity_to_content_block(&pool, &linked, 0, 2, None);

        assert_eq!(entities(&cleared), vec![None, None]);
        assert!(CharacterMetadata::ptr_eq(cleared.character_at(0).unwrap(), &pool.empty()));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_range_past_end_panics() {
        let pool = CharacterMetadataPool::new();
        let block = ContentBlock::builder("a").text("ab").build(&pool);

        apply_entity_to_content_block(&pool, &block, 1, 3, None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_inverted_range_panics() {
        let pool = CharacterMetadataPool::new();
        let block = ContentBlock::builder("a").text("abc").build(&pool);

        apply_entity_to_content_block(&pool, &block, 2, 1, None);
    }

    #[test]
    fn test_content_state_across_blocks() {
        let session = test_session();
        let content = content_from_text(&session, "abc\ndef\nghi\njkl");
        let key = content
            .create_entity("LINK", EntityMutability::Mutable, EntityData::new())
            .last_created_entity_key();
        let keys: Vec<BlockKey> = content.block_map().keys().cloned().collect();
        let selection = SelectionState::new(keys[0].clone(), 2, keys[2].clone(), 1);

        let updated = apply_entity_to_content_state(session.pool(), &content, &selection, key).unwrap();

        let block = |i: usize| updated.block_for_key(&keys[i]).unwrap();
        assert_eq!(entities(block(0)), vec![None, None, Some(1)]);
        assert_eq!(entities(block(1)), vec![Some(1); 3]);
        assert_eq!(entities(block(2)), vec![Some(1), None, None]);
        assert!(
            block(3)
                .characters()
                .ptr_eq(content.block_for_key(&keys[3]).unwrap().characters())
        );
        assert_eq!(updated.selection_before(), &selection);
        assert_eq!(updated.selection_after(), &selection);
    }

    #[test]
    fn test_content_state_backward_selection() {
        let session = test_session();
        let content = content_from_text(&session, "abcd");
        let block_key = content.first_block().key().clone();
        let selection = SelectionState::new(block_key.clone(), 3, block_key, 1);

        let updated = apply_entity_to_content_state(
            session.pool(),
            &content,
            &selection,
            Some(EntityKey::new(9)),
        )
        .unwrap();

        assert_eq!(entities(updated.first_block()), vec![None, Some(9), Some(9), None]);
    }

    #[test]
    fn test_content_state_stale_selection() {
        let session = test_session();
        let content = content_from_text(&session, "abc");
        let selection = SelectionState::create_empty(BlockKey::from("gone"));

        let result = apply_entity_to_content_state(session.pool(), &content, &selection, None);

        assert_eq!(
            result.unwrap_err(),
            ModelError::BlockNotFound(BlockKey::from("gone"))
        );
    }
}
