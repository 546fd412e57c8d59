use crate::model::{BlockKey, EntityKey};

/// Recoverable failures of model lookups and validation.
///
/// Invariant violations (an empty block map, a character list whose length
/// does not match its text) are not represented here: they panic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Unknown entity key: {0}")]
    EntityNotFound(EntityKey),
    #[error("Block not found: {0}")]
    BlockNotFound(BlockKey),
    #[error("Offset {offset} is out of range for block {key} (length {length})")]
    OffsetOutOfRange {
        key: BlockKey,
        offset: usize,
        length: usize,
    },
}
