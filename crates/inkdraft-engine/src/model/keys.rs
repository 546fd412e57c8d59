use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier of a block within a document.
///
/// Cloning is a reference count bump, so keys are passed around by value.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockKey(Arc<str>);

impl BlockKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockKey({:?})", &*self.0)
    }
}

impl From<&str> for BlockKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for BlockKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

/// Keys seen so far, with the number of generatable (lowercase hex) keys per
/// length.
#[derive(Debug, Default)]
struct SeenKeys {
    keys: HashSet<BlockKey>,
    hex_by_length: HashMap<usize, usize>,
}

impl SeenKeys {
    fn insert(&mut self, key: BlockKey) -> bool {
        let is_hex = key
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c));
        let length = key.as_str().len();
        let inserted = self.keys.insert(key);
        if inserted && is_hex {
            *self.hex_by_length.entry(length).or_default() += 1;
        }
        inserted
    }

    fn is_full(&self, length: usize) -> bool {
        16usize
            .checked_pow(length as u32)
            .is_some_and(|capacity| self.hex_by_length.get(&length).copied().unwrap_or(0) >= capacity)
    }
}

/// Produces block keys that never collide with a key it has handed out or
/// been told about.
///
/// Clones share the same set of seen keys.
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    seen: Arc<Mutex<SeenKeys>>,
    length: usize,
}

impl KeyGenerator {
    pub const MAX_LENGTH: usize = inkdraft_config::MAX_BLOCK_KEY_LENGTH;

    pub fn new(length: usize) -> Self {
        Self {
            seen: Arc::new(Mutex::new(SeenKeys::default())),
            length: length.clamp(1, Self::MAX_LENGTH),
        }
    }

    /// Generate a fresh random key.
    ///
    /// Keys have the configured length while unused keys of that length
    /// remain. Once all of them are taken, keys grow one hex digit at a time
    /// until there is room.
    pub fn generate(&self) -> BlockKey {
        let mut seen = self.seen.lock();
        let mut length = self.length;
        while length < Self::MAX_LENGTH && seen.is_full(length) {
            length += 1;
        }
        if length != self.length {
            log::debug!("Block keys of length {} are used up, generating length {length}", self.length);
        }
        loop {
            let raw = Uuid::new_v4().simple().to_string();
            let key = BlockKey::new(&raw[..length]);
            if seen.insert(key.clone()) {
                return key;
            }
            log::debug!("Block key collision on {key}, regenerating");
        }
    }

    /// Mark a key supplied from outside as live so it is never generated.
    pub fn register(&self, key: &BlockKey) {
        self.seen.lock().insert(key.clone());
    }

    pub fn is_known(&self, key: &BlockKey) -> bool {
        self.seen.lock().keys.contains(key)
    }

    pub fn key_length(&self) -> usize {
        self.length
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(inkdraft_config::DEFAULT_BLOCK_KEY_LENGTH)
    }
}
