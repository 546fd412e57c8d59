//! Entity registry.
//!
//! Entities are out-of-band records (links, mentions, embedded media) that
//! characters point at through an [`EntityKey`]. The registry is shared by
//! every content state of one session: creating or updating an entity through
//! one snapshot is visible from all of them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Key/value payload stored on an entity.
pub type EntityData = serde_json::Map<String, serde_json::Value>;

/// Opaque reference from character metadata to a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(u64);

impl EntityKey {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How editing treats text covered by an entity.
///
/// The model only records this; enforcement belongs to the editing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityMutability {
    /// Text can change freely; the entity stays attached.
    Mutable,
    /// Any change to the text removes the entity.
    Immutable,
    /// Text is treated as separate segments that are removed individually.
    Segmented,
}

/// A registered entity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityInstance {
    #[serde(rename = "type")]
    entity_type: String,
    mutability: EntityMutability,
    data: EntityData,
}

impl EntityInstance {
    pub fn new(
        entity_type: impl Into<String>,
        mutability: EntityMutability,
        data: EntityData,
    ) -> Self {
        Self {
            entity_type: entity_type.into(),
            mutability,
            data,
        }
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    pub fn mutability(&self) -> EntityMutability {
        self.mutability
    }

    pub fn data(&self) -> &EntityData {
        &self.data
    }
}

/// Storage behind an [`EntityMap`]. Keys are handed out sequentially from 1.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    instances: HashMap<EntityKey, EntityInstance>,
    instance_key: u64,
}

impl EntityRegistry {
    pub fn create(
        &mut self,
        entity_type: impl Into<String>,
        mutability: EntityMutability,
        data: EntityData,
    ) -> EntityKey {
        self.add(EntityInstance::new(entity_type, mutability, data))
    }

    pub fn add(&mut self, instance: EntityInstance) -> EntityKey {
        self.instance_key += 1;
        let key = EntityKey(self.instance_key);
        self.instances.insert(key, instance);
        key
    }

    pub fn get(&self, key: EntityKey) -> Result<&EntityInstance, ModelError> {
        self.instances
            .get(&key)
            .ok_or(ModelError::EntityNotFound(key))
    }

    /// Shallow-merge `to_merge` into the stored data; incoming values win.
    pub fn merge_data(
        &mut self,
        key: EntityKey,
        to_merge: EntityData,
    ) -> Result<&EntityInstance, ModelError> {
        let instance = self
            .instances
            .get_mut(&key)
            .ok_or(ModelError::EntityNotFound(key))?;
        instance.data.extend(to_merge);
        Ok(instance)
    }

    pub fn replace_data(
        &mut self,
        key: EntityKey,
        new_data: EntityData,
    ) -> Result<&EntityInstance, ModelError> {
        let instance = self
            .instances
            .get_mut(&key)
            .ok_or(ModelError::EntityNotFound(key))?;
        instance.data = new_data;
        Ok(instance)
    }

    pub fn last_created_key(&self) -> Option<EntityKey> {
        (self.instance_key > 0).then_some(EntityKey(self.instance_key))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Shared handle to a session's [`EntityRegistry`].
///
/// Clones refer to the same registry. Lookups return owned copies so no lock
/// is held past the call.
#[derive(Debug, Clone, Default)]
pub struct EntityMap {
    registry: Arc<RwLock<EntityRegistry>>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &self,
        entity_type: impl Into<String>,
        mutability: EntityMutability,
        data: EntityData,
    ) -> EntityKey {
        let entity_type = entity_type.into();
        let key = self
            .registry
            .write()
            .create(entity_type.clone(), mutability, data);
        log::debug!("Created {mutability:?} entity {key} of type {entity_type}");
        key
    }

    pub fn add(&self, instance: EntityInstance) -> EntityKey {
        self.registry.write().add(instance)
    }

    pub fn get(&self, key: EntityKey) -> Result<EntityInstance, ModelError> {
        self.registry.read().get(key).cloned()
    }

    pub fn merge_data(&self, key: EntityKey, to_merge: EntityData) -> Result<EntityInstance, ModelError> {
        log::debug!("Merging {} field(s) into entity {key}", to_merge.len());
        self.registry.write().merge_data(key, to_merge).cloned()
    }

    pub fn replace_data(&self, key: EntityKey, new_data: EntityData) -> Result<EntityInstance, ModelError> {
        log::debug!("Replacing data of entity {key}");
        self.registry.write().replace_data(key, new_data).cloned()
    }

    pub fn last_created_key(&self) -> Option<EntityKey> {
        self.registry.read().last_created_key()
    }

    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    /// True when both handles refer to the same registry.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registry, &other.registry)
    }
}
