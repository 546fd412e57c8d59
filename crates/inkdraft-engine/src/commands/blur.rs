use crate::model::EditorState;

/// Drop focus from the selection.
///
/// Returns `None` when the selection is already unfocused, otherwise a new
/// editor state with the same content and an unfocused selection.
pub fn on_blur(editor_state: &EditorState) -> Option<EditorState> {
    let selection = editor_state.selection();
    if !selection.has_focus() {
        return None;
    }
    log::trace!("Blurring editor at {selection}");
    Some(editor_state.accept_selection(selection.with_has_focus(false)))
}
