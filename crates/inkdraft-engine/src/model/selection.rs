use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{BlockKey, ContentState};

/// Immutable anchor/focus selection addressed by block key and character
/// offset.
///
/// Blocks are referenced by key only, so a selection taken from an older
/// snapshot is checked with [`SelectionState::validate`] rather than
/// trusted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionState {
    anchor_key: BlockKey,
    anchor_offset: usize,
    focus_key: BlockKey,
    focus_offset: usize,
    is_backward: bool,
    has_focus: bool,
}

/// Field overrides for [`SelectionState::merge`]. `None` keeps the current
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionPatch {
    pub anchor_key: Option<BlockKey>,
    pub anchor_offset: Option<usize>,
    pub focus_key: Option<BlockKey>,
    pub focus_offset: Option<usize>,
    pub is_backward: Option<bool>,
    pub has_focus: Option<bool>,
}

impl SelectionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(mut self, key: BlockKey, offset: usize) -> Self {
        self.anchor_key = Some(key);
        self.anchor_offset = Some(offset);
        self
    }

    pub fn focus(mut self, key: BlockKey, offset: usize) -> Self {
        self.focus_key = Some(key);
        self.focus_offset = Some(offset);
        self
    }

    pub fn is_backward(mut self, is_backward: bool) -> Self {
        self.is_backward = Some(is_backward);
        self
    }

    pub fn has_focus(mut self, has_focus: bool) -> Self {
        self.has_focus = Some(has_focus);
        self
    }
}

impl SelectionState {
    /// Selection between two points.
    ///
    /// Direction can only be derived here when both points are in the same
    /// block; across blocks it is forward unless merged otherwise.
    pub fn new(
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
    ) -> Self {
        let is_backward = anchor_key == focus_key && focus_offset < anchor_offset;
        Self {
            anchor_key,
            anchor_offset,
            focus_key,
            focus_offset,
            is_backward,
            has_focus: false,
        }
    }

    /// Collapsed, unfocused selection at the start of `key`.
    pub fn create_empty(key: BlockKey) -> Self {
        Self::new(key.clone(), 0, key, 0)
    }

    pub fn anchor_key(&self) -> &BlockKey {
        &self.anchor_key
    }

    pub fn anchor_offset(&self) -> usize {
        self.anchor_offset
    }

    pub fn focus_key(&self) -> &BlockKey {
        &self.focus_key
    }

    pub fn focus_offset(&self) -> usize {
        self.focus_offset
    }

    pub fn is_backward(&self) -> bool {
        self.is_backward
    }

    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    pub fn start_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.focus_key
        } else {
            &self.anchor_key
        }
    }

    pub fn start_offset(&self) -> usize {
        if self.is_backward {
            self.focus_offset
        } else {
            self.anchor_offset
        }
    }

    pub fn end_key(&self) -> &BlockKey {
        if self.is_backward {
            &self.anchor_key
        } else {
            &self.focus_key
        }
    }

    pub fn end_offset(&self) -> usize {
        if self.is_backward {
            self.anchor_offset
        } else {
            self.focus_offset
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Whether an edge of the selection falls in `[start, end]` of `block_key`.
    ///
    /// When the whole selection is inside that block, any overlap counts.
    pub fn has_edge_within(&self, block_key: &BlockKey, start: usize, end: usize) -> bool {
        if self.anchor_key == self.focus_key && &self.anchor_key == block_key {
            return start <= self.end_offset() && self.start_offset() <= end;
        }
        let offset = if &self.anchor_key == block_key {
            self.anchor_offset
        } else if &self.focus_key == block_key {
            self.focus_offset
        } else {
            return false;
        };
        start <= offset && offset <= end
    }

    #[must_use]
    pub fn merge(&self, patch: SelectionPatch) -> Self {
        Self {
            anchor_key: patch.anchor_key.unwrap_or_else(|| self.anchor_key.clone()),
            anchor_offset: patch.anchor_offset.unwrap_or(self.anchor_offset),
            focus_key: patch.focus_key.unwrap_or_else(|| self.focus_key.clone()),
            focus_offset: patch.focus_offset.unwrap_or(self.focus_offset),
            is_backward: patch.is_backward.unwrap_or(self.is_backward),
            has_focus: patch.has_focus.unwrap_or(self.has_focus),
        }
    }

    #[must_use]
    pub fn collapse_to_start(&self) -> Self {
        let key = self.start_key().clone();
        let offset = self.start_offset();
        self.merge(
            SelectionPatch::new()
                .anchor(key.clone(), offset)
                .focus(key, offset)
                .is_backward(false),
        )
    }

    #[must_use]
    pub fn collapse_to_end(&self) -> Self {
        let key = self.end_key().clone();
        let offset = self.end_offset();
        self.merge(
            SelectionPatch::new()
                .anchor(key.clone(), offset)
                .focus(key, offset)
                .is_backward(false),
        )
    }

    #[must_use]
    pub fn with_has_focus(&self, has_focus: bool) -> Self {
        Self {
            has_focus,
            ..self.clone()
        }
    }

    /// Check both points against `content`: the blocks must exist and the
    /// offsets must not exceed their lengths.
    pub fn validate(&self, content: &ContentState) -> Result<(), ModelError> {
        for (key, offset) in [
            (&self.anchor_key, self.anchor_offset),
            (&self.focus_key, self.focus_offset),
        ] {
            let block = content
                .block_for_key(key)
                .ok_or_else(|| ModelError::BlockNotFound(key.clone()))?;
            if offset > block.length() {
                return Err(ModelError::OffsetOutOfRange {
                    key: key.clone(),
                    offset,
                    length: block.length(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Anchor: {}:{}, Focus: {}:{}, Is Backward: {}, Has Focus: {}",
            self.anchor_key,
            self.anchor_offset,
            self.focus_key,
            self.focus_offset,
            self.is_backward,
            self.has_focus
        )
    }
}
