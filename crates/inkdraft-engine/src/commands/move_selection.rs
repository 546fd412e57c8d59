use crate::model::{EditorState, SelectionPatch, SelectionState};

/// Move the focus `max_distance` characters back from the start of the
/// selection.
///
/// Stays within the block when possible. Otherwise the focus lands at the end
/// of the previous block, and no further, or at offset 0 when there is no
/// previous block. The result is marked backward and keeps the anchor.
///
/// Offsets count `char`s; grapheme clusters are not taken into account.
pub fn move_selection_backward(editor_state: &EditorState, max_distance: usize) -> SelectionState {
    let selection = editor_state.selection();
    let content = editor_state.current_content();
    let key = selection.start_key();
    let offset = selection.start_offset();

    let (focus_key, focus_offset) = if max_distance <= offset {
        (key.clone(), offset - max_distance)
    } else {
        match content.block_before(key) {
            Some(before) => (before.key().clone(), before.length()),
            None => (key.clone(), 0),
        }
    };

    selection.merge(
        SelectionPatch::new()
            .focus(focus_key, focus_offset)
            .is_backward(true),
    )
}

/// Move the focus `max_distance` characters forward from the start of the
/// selection.
///
/// Stays within the block when possible. Otherwise the focus lands at the
/// start of the next block, or at the end of the current block when it is
/// the last one. Direction and anchor are left as they were.
///
/// A selection whose start block is not in the current content is returned
/// unchanged.
pub fn move_selection_forward(editor_state: &EditorState, max_distance: usize) -> SelectionState {
    let selection = editor_state.selection();
    let content = editor_state.current_content();
    let key = selection.start_key();
    let offset = selection.start_offset();

    let Some(block) = content.block_for_key(key) else {
        log::warn!("Cannot move selection forward from unknown block {key}");
        return selection.clone();
    };

    let remaining = block.length().saturating_sub(offset);
    let (focus_key, focus_offset) = if max_distance <= remaining {
        (key.clone(), offset + max_distance)
    } else {
        match content.key_after(key) {
            Some(after) => (after.clone(), 0),
            None => (key.clone(), block.length()),
        }
    };

    selection.merge(SelectionPatch::new().focus(focus_key, focus_offset))
}
