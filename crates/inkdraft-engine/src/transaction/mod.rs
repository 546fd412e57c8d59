/*!
 * # Transactions
 *
 * Pure functions that take a model value and return an edited copy. Nothing
 * here mutates in place: unchanged characters keep their interned instances
 * and unchanged blocks keep their storage.
 *
 * - **`apply_entity`**: point a character range (or a selection) at an entity
 * - **`modify_inline_style`**: add or remove an inline style over a selection
 */

mod apply_entity;
mod modify_inline_style;

pub use apply_entity::{apply_entity_to_content_block, apply_entity_to_content_state};
pub use modify_inline_style::{apply_inline_style, remove_inline_style};

use crate::error::ModelError;
use crate::model::{CharacterMetadata, ContentBlock, ContentState, SelectionState};

/// Replace the metadata of every character in `[start, end)` with
/// `update(current)`.
///
/// Returns a clone of `block` when no character changed, so its character
/// list stays shared.
fn map_character_range(
    block: &ContentBlock,
    start: usize,
    end: usize,
    update: impl Fn(&CharacterMetadata) -> CharacterMetadata,
) -> ContentBlock {
    let changes: Vec<(usize, CharacterMetadata)> = block
        .characters()
        .iter()
        .enumerate()
        .skip(start)
        .take(end.saturating_sub(start))
        .filter_map(|(offset, current)| {
            let updated = update(current);
            (!CharacterMetadata::ptr_eq(current, &updated)).then_some((offset, updated))
        })
        .collect();

    if changes.is_empty() {
        return block.clone();
    }
    let characters = changes
        .into_iter()
        .fold(block.characters().clone(), |list, (offset, metadata)| {
            list.set(offset, metadata)
        });
    block.with_characters(characters)
}

/// Run `update(block, start, end)` over every block the selection touches
/// and record `selection` as both the before and after selection.
///
/// The first block is covered from the selection's start offset, the last up
/// to its end offset, and blocks in between entirely. Empty ranges are
/// skipped.
fn update_selected_blocks(
    content: &ContentState,
    selection: &SelectionState,
    update: impl Fn(&ContentBlock, usize, usize) -> ContentBlock,
) -> Result<ContentState, ModelError> {
    selection.validate(content)?;
    let block_map = content.block_map();

    let mut start = (selection.start_key(), selection.start_offset());
    let mut end = (selection.end_key(), selection.end_offset());
    let mut start_index = block_map
        .index_of(start.0)
        .ok_or_else(|| ModelError::BlockNotFound(start.0.clone()))?;
    let mut end_index = block_map
        .index_of(end.0)
        .ok_or_else(|| ModelError::BlockNotFound(end.0.clone()))?;
    if start_index > end_index || (start_index == end_index && start.1 > end.1) {
        log::debug!("Selection direction disagrees with document order: {selection}");
        std::mem::swap(&mut start, &mut end);
        std::mem::swap(&mut start_index, &mut end_index);
    }

    let mut updated = content.clone();
    for index in start_index..=end_index {
        let Some(block) = block_map.get_index(index) else {
            break;
        };
        let from = if index == start_index { start.1 } else { 0 };
        let to = if index == end_index {
            end.1
        } else {
            block.length()
        };
        if from == to {
            continue;
        }
        let changed = update(block, from, to);
        if !changed.characters().ptr_eq(block.characters()) {
            updated = updated.with_block(changed);
        }
    }

    Ok(updated
        .with_selection_before(selection.clone())
        .with_selection_after(selection.clone()))
}
