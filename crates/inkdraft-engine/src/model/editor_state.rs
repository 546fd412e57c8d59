use crate::model::{ContentState, SelectionState};

/// Top-level editor value: the current content and the live selection.
///
/// Like everything in the model it is immutable; each change produces a new
/// `EditorState`.
#[derive(Debug, Clone)]
pub struct EditorState {
    current_content: ContentState,
    selection: SelectionState,
}

impl EditorState {
    /// Wrap `content`, taking its `selection_after` as the live selection.
    pub fn create_with_content(content: ContentState) -> Self {
        let selection = content.selection_after().clone();
        Self {
            current_content: content,
            selection,
        }
    }

    pub fn current_content(&self) -> &ContentState {
        &self.current_content
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Replace the live selection, keeping the content.
    #[must_use]
    pub fn accept_selection(&self, selection: SelectionState) -> Self {
        Self {
            current_content: self.current_content.clone(),
            selection,
        }
    }

    /// Make `content` current and move the live selection to where the edit
    /// that produced it left it.
    #[must_use]
    pub fn push(&self, content: ContentState) -> Self {
        log::trace!("Pushing content, selection now {}", content.selection_after());
        Self::create_with_content(content)
    }
}
