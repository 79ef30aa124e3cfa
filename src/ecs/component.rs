//! Component kinds and their per-kind storage
//!
//! Kinds are plain strings, but each one is bound to a single Rust payload
//! type at registration. Storage for a kind is therefore homogeneous and the
//! payload type is checked whenever a component is written or read.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use log::debug;

use crate::error::{EcsError, Result};

/// Trait for component payloads
pub trait Component: Send + Sync + 'static {}

/// Dense identifier assigned to a kind at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(pub(crate) u32);

/// What the registry knows about a kind.
#[derive(Debug, Clone)]
pub struct KindInfo {
    pub id: KindId,
    pub name: String,
    pub type_id: TypeId,
    pub type_name: &'static str,
}

/// Declares which component kinds exist.
#[derive(Default)]
pub struct ComponentRegistry {
    by_name: HashMap<String, KindId>,
    kinds: Vec<KindInfo>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `kind` as storing payloads of type `T`.
    pub fn register<T: Component>(&mut self, kind: &str) -> Result<KindId> {
        if self.by_name.contains_key(kind) {
            return Err(EcsError::DuplicateKind(kind.to_string()));
        }
        let id = KindId(self.kinds.len() as u32);
        self.kinds.push(KindInfo {
            id,
            name: kind.to_string(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        });
        self.by_name.insert(kind.to_string(), id);
        debug!("registered component kind `{kind}` as {}", std::any::type_name::<T>());
        Ok(id)
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.by_name.contains_key(kind)
    }

    pub fn resolve(&self, kind: &str) -> Result<&KindInfo> {
        self.by_name
            .get(kind)
            .map(|id| &self.kinds[id.0 as usize])
            .ok_or_else(|| EcsError::UnregisteredKind(kind.to_string()))
    }

    /// Resolve `kind` and check that it stores `T`.
    pub fn resolve_typed<T: Component>(&self, kind: &str) -> Result<KindId> {
        let info = self.resolve(kind)?;
        if info.type_id != TypeId::of::<T>() {
            return Err(EcsError::KindTypeMismatch {
                kind: kind.to_string(),
                expected: info.type_name,
                found: std::any::type_name::<T>(),
            });
        }
        Ok(info.id)
    }

    pub fn info(&self, id: KindId) -> &KindInfo {
        &self.kinds[id.0 as usize]
    }

    /// Registered kind names, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.kinds.iter().map(|info| info.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Type-erased component storage
pub trait ComponentStorage: Send + Sync {
    fn remove(&mut self, index: u32) -> bool;
    fn has(&self, index: u32) -> bool;
    fn indices(&self) -> Vec<u32>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Concrete storage for a specific payload type, keyed by entity slot
pub struct TypedComponentStorage<T: Component> {
    pub(crate) data: HashMap<u32, T>,
}

impl<T: Component> TypedComponentStorage<T> {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn insert(&mut self, index: u32, component: T) -> Option<T> {
        self.data.insert(index, component)
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.data.get(&index)
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.data.get_mut(&index)
    }

    pub fn take(&mut self, index: u32) -> Option<T> {
        self.data.remove(&index)
    }
}

impl<T: Component> Default for TypedComponentStorage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentStorage for TypedComponentStorage<T> {
    fn remove(&mut self, index: u32) -> bool {
        self.data.remove(&index).is_some()
    }

    fn has(&self, index: u32) -> bool {
        self.data.contains_key(&index)
    }

    fn indices(&self) -> Vec<u32> {
        self.data.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
