//! Per-character metadata and its interning pool.
//!
//! Documents use only a handful of distinct (style, entity) combinations, so
//! every [`CharacterMetadata`] is obtained from a [`CharacterMetadataPool`]
//! that hands out one shared instance per combination. Character lists are
//! then vectors of reference-counted pointers into the pool.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::EntityKey;

/// Set of inline style names (e.g. `BOLD`, `ITALIC`) applied to a character.
///
/// Ordered so that equal sets have one canonical form regardless of the
/// order styles were applied in.
pub type InlineStyle = BTreeSet<String>;

#[derive(Debug, PartialEq, Eq, Hash)]
struct MetadataRecord {
    style: InlineStyle,
    entity: Option<EntityKey>,
}

/// Interned style and entity annotation of one character.
///
/// Values come only from a [`CharacterMetadataPool`]; cloning shares the
/// pooled instance.
#[derive(Clone)]
pub struct CharacterMetadata(Arc<MetadataRecord>);

impl CharacterMetadata {
    pub fn style(&self) -> &InlineStyle {
        &self.0.style
    }

    pub fn entity(&self) -> Option<EntityKey> {
        self.0.entity
    }

    pub fn has_style(&self, style: &str) -> bool {
        self.0.style.contains(style)
    }

    /// True when both values are the same pooled instance.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for CharacterMetadata {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other) || self.0 == other.0
    }
}

impl Eq for CharacterMetadata {}

impl Hash for CharacterMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for CharacterMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacterMetadata")
            .field("style", &self.0.style)
            .field("entity", &self.0.entity)
            .finish()
    }
}

/// Options for [`CharacterMetadataPool::create`]. Unset fields keep their
/// defaults: no style, no entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterMetadataConfig {
    pub style: InlineStyle,
    pub entity: Option<EntityKey>,
}

impl CharacterMetadataConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style.insert(style.into());
        self
    }

    pub fn with_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.style.extend(styles.into_iter().map(Into::into));
        self
    }

    pub fn with_entity(mut self, entity: Option<EntityKey>) -> Self {
        self.entity = entity;
        self
    }

    fn is_empty(&self) -> bool {
        self.style.is_empty() && self.entity.is_none()
    }
}

struct PoolInner {
    entries: Mutex<HashMap<MetadataRecord, CharacterMetadata>>,
    empty: CharacterMetadata,
}

/// Interning table for [`CharacterMetadata`].
///
/// Seeded with the empty entry and grows monotonically. Clones share the
/// table. Lookup and insertion happen under one lock, so two threads can
/// never intern the same combination twice.
#[derive(Clone)]
pub struct CharacterMetadataPool {
    inner: Arc<PoolInner>,
}

impl CharacterMetadataPool {
    pub fn new() -> Self {
        let empty = CharacterMetadata(Arc::new(MetadataRecord {
            style: InlineStyle::new(),
            entity: None,
        }));
        let mut entries = HashMap::new();
        entries.insert(
            MetadataRecord {
                style: InlineStyle::new(),
                entity: None,
            },
            empty.clone(),
        );
        Self {
            inner: Arc::new(PoolInner {
                entries: Mutex::new(entries),
                empty,
            }),
        }
    }

    /// The shared instance with no style and no entity.
    pub fn empty(&self) -> CharacterMetadata {
        self.inner.empty.clone()
    }

    /// Return the canonical instance for `config`, interning it on first use.
    pub fn create(&self, config: CharacterMetadataConfig) -> CharacterMetadata {
        if config.is_empty() {
            return self.empty();
        }
        self.intern(MetadataRecord {
            style: config.style,
            entity: config.entity,
        })
    }

    #[must_use]
    pub fn apply_style(&self, record: &CharacterMetadata, style: &str) -> CharacterMetadata {
        if record.has_style(style) {
            return self.canonical(record);
        }
        let mut with_style = record.style().clone();
        with_style.insert(style.to_string());
        self.intern(MetadataRecord {
            style: with_style,
            entity: record.entity(),
        })
    }

    #[must_use]
    pub fn remove_style(&self, record: &CharacterMetadata, style: &str) -> CharacterMetadata {
        if !record.has_style(style) {
            return self.canonical(record);
        }
        let mut without_style = record.style().clone();
        without_style.remove(style);
        self.intern(MetadataRecord {
            style: without_style,
            entity: record.entity(),
        })
    }

    /// Point `record` at `entity_key`. An unchanged key returns `record`
    /// itself.
    #[must_use]
    pub fn apply_entity(
        &self,
        record: &CharacterMetadata,
        entity_key: Option<EntityKey>,
    ) -> CharacterMetadata {
        if record.entity() == entity_key {
            return record.clone();
        }
        self.intern(MetadataRecord {
            style: record.style().clone(),
            entity: entity_key,
        })
    }

    /// Number of distinct interned combinations, including the empty one.
    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    /// Never true: the pool is seeded with the empty entry.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Same-pool instance for a value that may come from another pool.
    fn canonical(&self, record: &CharacterMetadata) -> CharacterMetadata {
        let existing = self.inner.entries.lock().get(record.0.as_ref()).cloned();
        existing.unwrap_or_else(|| {
            self.intern(MetadataRecord {
                style: record.style().clone(),
                entity: record.entity(),
            })
        })
    }

    fn intern(&self, key: MetadataRecord) -> CharacterMetadata {
        let mut entries = self.inner.entries.lock();
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }
        log::trace!(
            "Interning character metadata style={:?} entity={:?} (pool size {})",
            key.style,
            key.entity,
            entries.len() + 1
        );
        let created = CharacterMetadata(Arc::new(MetadataRecord {
            style: key.style.clone(),
            entity: key.entity,
        }));
        entries.insert(key, created.clone());
        created
    }
}

impl Default for CharacterMetadataPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CharacterMetadataPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharacterMetadataPool")
            .field("len", &self.len())
            .finish()
    }
}
