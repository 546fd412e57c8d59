use crate::error::ModelError;
use crate::model::{CharacterMetadataPool, ContentState, SelectionState};
use crate::transaction::{map_character_range, update_selected_blocks};

/// Add `style` to every character covered by `selection`.
pub fn apply_inline_style(
    pool: &CharacterMetadataPool,
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState, ModelError> {
    log::debug!("Applying inline style {style} to {selection}");
    update_selected_blocks(content, selection, |block, start, end| {
        map_character_range(block, start, end, |current| pool.apply_style(current, style))
    })
}

/// Remove `style` from every character covered by `selection`.
pub fn remove_inline_style(
    pool: &CharacterMetadataPool,
    content: &ContentState,
    selection: &SelectionState,
    style: &str,
) -> Result<ContentState, ModelError> {
    log::debug!("Removing inline style {style} from {selection}");
    update_selected_blocks(content, selection, |block, start, end| {
        map_character_range(block, start, end, |current| pool.remove_style(current, style))
    })
}
