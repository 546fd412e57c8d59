use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::model::{BlockKey, ContentBlock, PersistentVec, persistent};

/// Ordered, keyed collection of blocks in document order.
///
/// Blocks live in a [`PersistentVec`]; a key-to-position table sits beside
/// it. Replacing a block in place shares the table with the previous map,
/// only changes to the set or order of keys rebuild it.
#[derive(Clone)]
pub struct BlockMap {
    blocks: PersistentVec<ContentBlock>,
    index: Arc<HashMap<BlockKey, usize>>,
}

impl BlockMap {
    /// Build a map from blocks in document order.
    ///
    /// A repeated key replaces the earlier block at the earlier position.
    pub fn from_blocks(blocks: impl IntoIterator<Item = ContentBlock>) -> Self {
        let mut ordered: Vec<ContentBlock> = Vec::new();
        let mut index = HashMap::new();
        for block in blocks {
            match index.get(block.key()) {
                Some(&position) => {
                    log::warn!("Duplicate block key {}, keeping the later block", block.key());
                    ordered[position] = block;
                }
                None => {
                    index.insert(block.key().clone(), ordered.len());
                    ordered.push(block);
                }
            }
        }
        Self {
            blocks: PersistentVec::from_vec(ordered),
            index: Arc::new(index),
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, key: &BlockKey) -> Option<&ContentBlock> {
        self.index_of(key).and_then(|position| self.blocks.get(position))
    }

    pub fn contains_key(&self, key: &BlockKey) -> bool {
        self.index.contains_key(key)
    }

    /// Position of `key` in document order.
    pub fn index_of(&self, key: &BlockKey) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn get_index(&self, position: usize) -> Option<&ContentBlock> {
        self.blocks.get(position)
    }

    pub fn first(&self) -> Option<&ContentBlock> {
        self.blocks.first()
    }

    pub fn last(&self) -> Option<&ContentBlock> {
        self.blocks.last()
    }

    pub fn block_before(&self, key: &BlockKey) -> Option<&ContentBlock> {
        let position = self.index_of(key)?;
        position
            .checked_sub(1)
            .and_then(|before| self.blocks.get(before))
    }

    pub fn block_after(&self, key: &BlockKey) -> Option<&ContentBlock> {
        let position = self.index_of(key)?;
        self.blocks.get(position + 1)
    }

    pub fn key_before(&self, key: &BlockKey) -> Option<&BlockKey> {
        self.block_before(key).map(ContentBlock::key)
    }

    pub fn key_after(&self, key: &BlockKey) -> Option<&BlockKey> {
        self.block_after(key).map(ContentBlock::key)
    }

    pub fn iter(&self) -> persistent::Iter<'_, ContentBlock> {
        self.blocks.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &BlockKey> {
        self.blocks.iter().map(ContentBlock::key)
    }

    /// Return a map with `block` stored under its key.
    ///
    /// An existing key is replaced in place; a new key is appended.
    #[must_use]
    pub fn with_block(&self, block: ContentBlock) -> Self {
        match self.index_of(block.key()) {
            Some(position) => Self {
                blocks: self.blocks.set(position, block),
                index: Arc::clone(&self.index),
            },
            None => {
                log::debug!("Appending block {} to block map", block.key());
                Self::from_blocks(self.blocks.iter().cloned().chain(std::iter::once(block)))
            }
        }
    }

    /// True when both maps keep their key table in the same allocation.
    pub fn shares_index_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.index, &other.index)
    }
}

impl PartialEq for BlockMap {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

impl Eq for BlockMap {}

impl fmt::Debug for BlockMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.blocks.iter().map(|block| (block.key(), block)))
            .finish()
    }
}

impl<'a> IntoIterator for &'a BlockMap {
    type Item = &'a ContentBlock;
    type IntoIter = persistent::Iter<'a, ContentBlock>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
