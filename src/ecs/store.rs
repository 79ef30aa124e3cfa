//! Entity store - owns entity identity and all component data

use std::collections::HashMap;

use log::trace;

use super::component::{
    Component, ComponentRegistry, ComponentStorage, KindId, TypedComponentStorage,
};
use super::entity::EntityAllocator;
use super::{Entity, Query};
use crate::error::{EcsError, Result};

/// Holds every live entity and the components attached to it.
///
/// Writes and typed reads take the [`ComponentRegistry`] so kind validation
/// stays in one place.
pub struct EntityStore {
    allocator: EntityAllocator,
    /// Kinds held by each slot; emptied when the slot is freed.
    held: Vec<Vec<KindId>>,
    storages: HashMap<KindId, Box<dyn ComponentStorage>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            held: Vec::new(),
            storages: HashMap::new(),
        }
    }

    /// Create an entity with no components
    pub fn create(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        let slot = entity.index() as usize;
        if slot == self.held.len() {
            self.held.push(Vec::new());
        }
        debug_assert!(self.held[slot].is_empty(), "recycled slot still holds components");
        trace!("created entity {entity}");
        entity
    }

    /// Destroy an entity and remove all its components
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        self.ensure_alive(entity)?;
        let index = entity.index();
        for kind in std::mem::take(&mut self.held[index as usize]) {
            if let Some(storage) = self.storages.get_mut(&kind) {
                storage.remove(index);
            }
        }
        self.allocator.deallocate(entity);
        trace!("destroyed entity {entity}");
        Ok(())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    pub fn len(&self) -> usize {
        self.allocator.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attach `data` under `kind`, replacing any previous value.
    pub fn set_component<T: Component>(
        &mut self,
        registry: &ComponentRegistry,
        entity: Entity,
        kind: &str,
        data: T,
    ) -> Result<()> {
        self.ensure_alive(entity)?;
        let kind_id = registry.resolve_typed::<T>(kind)?;

        let storage = self
            .storages
            .entry(kind_id)
            .or_insert_with(|| Box::new(TypedComponentStorage::<T>::new()));
        let storage = storage
            .as_any_mut()
            .downcast_mut::<TypedComponentStorage<T>>()
            .ok_or_else(|| mismatch::<T>(registry, kind))?;

        if storage.insert(entity.index(), data).is_none() {
            self.held[entity.index() as usize].push(kind_id);
        }
        Ok(())
    }

    /// `Ok(None)` when the entity is alive but lacks `kind`.
    pub fn get_component<T: Component>(
        &self,
        registry: &ComponentRegistry,
        entity: Entity,
        kind: &str,
    ) -> Result<Option<&T>> {
        self.ensure_alive(entity)?;
        let kind_id = registry.resolve_typed::<T>(kind)?;
        let Some(storage) = self.storages.get(&kind_id) else {
            return Ok(None);
        };
        let storage = storage
            .as_any()
            .downcast_ref::<TypedComponentStorage<T>>()
            .ok_or_else(|| mismatch::<T>(registry, kind))?;
        Ok(storage.get(entity.index()))
    }

    pub fn get_component_mut<T: Component>(
        &mut self,
        registry: &ComponentRegistry,
        entity: Entity,
        kind: &str,
    ) -> Result<Option<&mut T>> {
        self.ensure_alive(entity)?;
        let kind_id = registry.resolve_typed::<T>(kind)?;
        let Some(storage) = self.storages.get_mut(&kind_id) else {
            return Ok(None);
        };
        let storage = storage
            .as_any_mut()
            .downcast_mut::<TypedComponentStorage<T>>()
            .ok_or_else(|| mismatch::<T>(registry, kind))?;
        Ok(storage.get_mut(entity.index()))
    }

    /// Detach `kind` from the entity, returning the removed value.
    pub fn remove_component<T: Component>(
        &mut self,
        registry: &ComponentRegistry,
        entity: Entity,
        kind: &str,
    ) -> Result<Option<T>> {
        self.ensure_alive(entity)?;
        let kind_id = registry.resolve_typed::<T>(kind)?;
        let Some(storage) = self.storages.get_mut(&kind_id) else {
            return Ok(None);
        };
        let storage = storage
            .as_any_mut()
            .downcast_mut::<TypedComponentStorage<T>>()
            .ok_or_else(|| mismatch::<T>(registry, kind))?;
        let removed = storage.take(entity.index());
        if removed.is_some() {
            self.held[entity.index() as usize].retain(|held| *held != kind_id);
        }
        Ok(removed)
    }

    /// Untyped presence check.
    pub fn has_component(
        &self,
        registry: &ComponentRegistry,
        entity: Entity,
        kind: &str,
    ) -> Result<bool> {
        self.ensure_alive(entity)?;
        let kind_id = registry.resolve(kind)?.id;
        Ok(self.held[entity.index() as usize].contains(&kind_id))
    }

    /// Kind names currently attached to the entity, in attach order.
    pub fn kinds_of<'r>(
        &self,
        registry: &'r ComponentRegistry,
        entity: Entity,
    ) -> Result<Vec<&'r str>> {
        self.ensure_alive(entity)?;
        Ok(self.held[entity.index() as usize]
            .iter()
            .map(|id| registry.info(*id).name.as_str())
            .collect())
    }

    /// Every live entity holding all of `kinds`, ordered by slot.
    ///
    /// An empty `kinds` matches every live entity.
    pub fn query(&self, registry: &ComponentRegistry, kinds: &[&str]) -> Result<Query> {
        let mut ids = Vec::with_capacity(kinds.len());
        for kind in kinds {
            ids.push(registry.resolve(kind)?.id);
        }
        if ids.is_empty() {
            return Ok(Query::new(self.allocator.iter().collect()));
        }

        let mut storages = Vec::with_capacity(ids.len());
        for id in &ids {
            match self.storages.get(id) {
                Some(storage) => storages.push(storage.as_ref()),
                // Nothing was ever stored under this kind.
                None => return Ok(Query::new(Vec::new())),
            }
        }
        storages.sort_by_key(|storage| storage.len());

        let Some((smallest, rest)) = storages.split_first() else {
            return Ok(Query::default());
        };
        let mut indices: Vec<u32> = smallest
            .indices()
            .into_iter()
            .filter(|index| rest.iter().all(|storage| storage.has(*index)))
            .collect();
        indices.sort_unstable();

        let entities = indices
            .into_iter()
            .filter_map(|index| self.allocator.entity_at(index))
            .collect();
        Ok(Query::new(entities))
    }

    fn ensure_alive(&self, entity: Entity) -> Result<()> {
        if self.allocator.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::EntityNotFound(entity))
        }
    }
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatch<T: Component>(registry: &ComponentRegistry, kind: &str) -> EcsError {
    let expected = registry
        .resolve(kind)
        .map(|info| info.type_name)
        .unwrap_or("unknown");
    EcsError::KindTypeMismatch {
        kind: kind.to_string(),
        expected,
        found: std::any::type_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[derive(Debug, Clone, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Debug, Clone, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }
    impl Component for Velocity {}

    fn registry() -> ComponentRegistry {
        let mut registry = ComponentRegistry::new();
        registry.register::<Position>("position").unwrap();
        registry.register::<Velocity>("velocity").unwrap();
        registry
    }

    #[test]
    fn test_store_entity_lifecycle() {
        let mut store = EntityStore::new();

        let e1 = store.create();
        let e2 = store.create();
        assert!(store.is_alive(e1));
        assert_eq!(store.len(), 2);

        store.destroy(e1).unwrap();
        assert!(!store.is_alive(e1));
        assert!(store.is_alive(e2));
        assert_eq!(store.len(), 1);

        let err = store.destroy(e1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_store_components() {
        let registry = registry();
        let mut store = EntityStore::new();
        let entity = store.create();

        assert_eq!(
            store.get_component::<Position>(&registry, entity, "position").unwrap(),
            None
        );

        store
            .set_component(&registry, entity, "position", Position { x: 1.0, y: 2.0 })
            .unwrap();
        store
            .set_component(&registry, entity, "velocity", Velocity { dx: 0.5, dy: 0.5 })
            .unwrap();

        if let Some(vel) = store
            .get_component_mut::<Velocity>(&registry, entity, "velocity")
            .unwrap()
        {
            vel.dx = 1.0;
        }

        let vel = store
            .get_component::<Velocity>(&registry, entity, "velocity")
            .unwrap()
            .unwrap();
        assert_eq!(vel.dx, 1.0);
        assert_eq!(
            store.kinds_of(&registry, entity).unwrap(),
            vec!["position", "velocity"]
        );
    }

    #[test]
    fn test_failed_write_leaves_entity_untouched() {
        let registry = registry();
        let mut store = EntityStore::new();
        let entity = store.create();

        let err = store
            .set_component(&registry, entity, "position", Velocity { dx: 1.0, dy: 1.0 })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = store
            .set_component(&registry, entity, "tile", Position { x: 0.0, y: 0.0 })
            .unwrap_err();
        assert!(matches!(err, EcsError::UnregisteredKind(kind) if kind == "tile"));

        assert!(store.kinds_of(&registry, entity).unwrap().is_empty());
    }

    #[test]
    fn test_recycled_slot_starts_empty() {
        let registry = registry();
        let mut store = EntityStore::new();
        let old = store.create();
        store
            .set_component(&registry, old, "position", Position { x: 9.0, y: 9.0 })
            .unwrap();
        store.destroy(old).unwrap();

        let new = store.create();
        assert_eq!(new.index(), old.index());
        assert_eq!(
            store.get_component::<Position>(&registry, new, "position").unwrap(),
            None
        );
        let err = store
            .get_component::<Position>(&registry, old, "position")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_remove_component() {
        let registry = registry();
        let mut store = EntityStore::new();
        let entity = store.create();
        store
            .set_component(&registry, entity, "position", Position { x: 1.0, y: 1.0 })
            .unwrap();

        let removed = store
            .remove_component::<Position>(&registry, entity, "position")
            .unwrap();
        assert_eq!(removed, Some(Position { x: 1.0, y: 1.0 }));
        assert!(!store.has_component(&registry, entity, "position").unwrap());
        assert!(store.query(&registry, &["position"]).unwrap().is_empty());
    }

    #[test]
    fn test_query_matches_all_kinds() {
        let registry = registry();
        let mut store = EntityStore::new();
        let both = store.create();
        let only_pos = store.create();
        let only_vel = store.create();

        store
            .set_component(&registry, both, "position", Position { x: 0.0, y: 0.0 })
            .unwrap();
        store
            .set_component(&registry, both, "velocity", Velocity { dx: 0.0, dy: 0.0 })
            .unwrap();
        store
            .set_component(&registry, only_pos, "position", Position { x: 0.0, y: 0.0 })
            .unwrap();
        store
            .set_component(&registry, only_vel, "velocity", Velocity { dx: 0.0, dy: 0.0 })
            .unwrap();

        let q = store.query(&registry, &["position", "velocity"]).unwrap();
        assert_eq!(q.as_slice(), &[both]);
        let q = store.query(&registry, &["velocity", "position"]).unwrap();
        assert_eq!(q.as_slice(), &[both]);
        let q = store.query(&registry, &["position"]).unwrap();
        assert_eq!(q.as_slice(), &[both, only_pos]);
        let q = store.query(&registry, &[]).unwrap();
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_query_rejects_unregistered_kind() {
        let registry = registry();
        let store = EntityStore::new();
        let err = store.query(&registry, &["tile"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_query_is_a_snapshot() {
        let registry = registry();
        let mut store = EntityStore::new();
        let a = store.create();
        store
            .set_component(&registry, a, "position", Position { x: 0.0, y: 0.0 })
            .unwrap();

        let q = store.query(&registry, &["position"]).unwrap();
        for entity in &q {
            let spawned = store.create();
            store
                .set_component(&registry, spawned, "position", Position { x: 1.0, y: 1.0 })
                .unwrap();
            store.destroy(entity).unwrap();
        }
        assert_eq!(q.as_slice(), &[a]);
        assert_eq!(q.iter().count(), 1);
        assert_eq!(store.query(&registry, &["position"]).unwrap().len(), 1);
    }
}
