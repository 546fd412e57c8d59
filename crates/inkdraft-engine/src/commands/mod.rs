//! Editor-level commands: read an [`crate::model::EditorState`] and return
//! the next selection or editor state.

mod blur;
mod move_selection;

pub use blur::on_blur;
pub use move_selection::{move_selection_backward, move_selection_forward};
