/*!
 * # Immutable Document Model
 *
 * Every value in this module is immutable. Edits return new values that share
 * all unchanged parts with the old ones, so any snapshot can be kept around
 * (for undo, diffing or rendering) at the cost of only what changed.
 *
 * ## Layers
 *
 * - **`character_metadata`**: interned per-character style/entity records
 * - **`content_block`**: one paragraph-level block of text plus its metadata
 * - **`block_map`**: ordered, keyed collection of blocks
 * - **`selection`**: anchor/focus selection addressed by block key and offset
 * - **`entity`**: the session-wide registry of out-of-band entity records
 * - **`content_state`**: a document snapshot tying the above together
 * - **`editor_state`**: current content plus the live selection
 *
 * Interning pool, entity registry and key generation are owned by a
 * [`crate::session::Session`] and passed in explicitly.
 */

mod block_map;
mod character_metadata;
mod content_block;
mod content_state;
mod editor_state;
mod entity;
mod keys;
pub mod persistent;
mod sanitize;
mod selection;

pub use block_map::BlockMap;
pub use character_metadata::{
    CharacterMetadata, CharacterMetadataConfig, CharacterMetadataPool, InlineStyle,
};
pub use content_block::{BlockType, CharacterList, ContentBlock, ContentBlockBuilder};
pub use content_state::{
    BlockArray, ContentBlocks, ContentState, DEFAULT_PLAIN_TEXT_DELIMITER, default_text_delimiter,
};
pub use editor_state::EditorState;
pub use entity::{EntityData, EntityInstance, EntityKey, EntityMap, EntityMutability, EntityRegistry};
pub use keys::{BlockKey, KeyGenerator};
pub use persistent::PersistentVec;
pub use sanitize::sanitize_text;
pub use selection::{SelectionPatch, SelectionState};
