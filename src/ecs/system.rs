//! Systems and the registry that owns them

use std::any::Any;
use std::collections::HashMap;

use anyhow::Result;
use log::debug;

use super::component::{Component, ComponentRegistry};
use super::store::EntityStore;
use super::{Entity, Query};
use crate::error::EcsError;

/// A named unit of behavior run once per tick.
///
/// Implementors also provide `as_any`/`as_any_mut` so callers can get the
/// concrete system back from the registry.
pub trait System: Any {
    /// Component kinds that must be registered before this system is.
    fn required_components(&self) -> &[&'static str] {
        &[]
    }

    /// Called once when the system is registered.
    fn on_register(&mut self, _components: &ComponentRegistry) -> Result<()> {
        Ok(())
    }

    fn on_tick(&mut self, ctx: &mut SystemContext<'_>) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// What a system sees while it runs.
pub struct SystemContext<'a> {
    pub tick: u64,
    components: &'a ComponentRegistry,
    entities: &'a mut EntityStore,
}

impl<'a> SystemContext<'a> {
    pub fn new(tick: u64, components: &'a ComponentRegistry, entities: &'a mut EntityStore) -> Self {
        Self {
            tick,
            components,
            entities,
        }
    }

    pub fn components(&self) -> &ComponentRegistry {
        self.components
    }

    pub fn query(&self, kinds: &[&str]) -> Result<Query, EcsError> {
        self.entities.query(self.components, kinds)
    }

    pub fn get_component<T: Component>(&self, entity: Entity, kind: &str) -> Result<Option<&T>, EcsError> {
        self.entities.get_component(self.components, entity, kind)
    }

    pub fn get_component_mut<T: Component>(
        &mut self,
        entity: Entity,
        kind: &str,
    ) -> Result<Option<&mut T>, EcsError> {
        self.entities.get_component_mut(self.components, entity, kind)
    }

    pub fn set_component<T: Component>(&mut self, entity: Entity, kind: &str, data: T) -> Result<(), EcsError> {
        self.entities.set_component(self.components, entity, kind, data)
    }

    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    pub fn destroy_entity(&mut self, entity: Entity) -> Result<(), EcsError> {
        self.entities.destroy(entity)
    }
}

/// Named systems in registration order.
#[derive(Default)]
pub struct SystemRegistry {
    systems: Vec<(String, Box<dyn System>)>,
    by_name: HashMap<String, usize>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `system` under `name`.
    ///
    /// Fails if the name is taken, if a required component kind is missing
    /// from `components`, or if `on_register` fails. The registry is left
    /// unchanged on failure.
    pub fn register(
        &mut self,
        name: &str,
        mut system: Box<dyn System>,
        components: &ComponentRegistry,
    ) -> Result<(), EcsError> {
        if self.by_name.contains_key(name) {
            return Err(EcsError::DuplicateSystem(name.to_string()));
        }
        if let Some(kind) = system
            .required_components()
            .iter()
            .find(|kind| !components.is_registered(kind))
        {
            return Err(EcsError::MissingDependency {
                system: name.to_string(),
                kind: kind.to_string(),
            });
        }
        system
            .on_register(components)
            .map_err(|source| EcsError::System {
                name: name.to_string(),
                source,
            })?;

        self.by_name.insert(name.to_string(), self.systems.len());
        self.systems.push((name.to_string(), system));
        debug!("registered system `{name}`");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn System, EcsError> {
        let index = self.index_of(name)?;
        Ok(self.systems[index].1.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut dyn System, EcsError> {
        let index = self.index_of(name)?;
        Ok(self.systems[index].1.as_mut())
    }

    pub fn get_as<T: System>(&self, name: &str) -> Result<&T, EcsError> {
        self.get(name)?
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| type_mismatch::<T>(name))
    }

    pub fn get_as_mut<T: System>(&mut self, name: &str) -> Result<&mut T, EcsError> {
        self.get_mut(name)?
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| type_mismatch::<T>(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// System names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|(name, _)| name.as_str())
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Box<dyn System>)> {
        self.systems
            .iter_mut()
            .map(|(name, system)| (name.as_str(), system))
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    fn index_of(&self, name: &str) -> Result<usize, EcsError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| EcsError::SystemNotFound(name.to_string()))
    }
}

fn type_mismatch<T>(name: &str) -> EcsError {
    EcsError::SystemTypeMismatch {
        name: name.to_string(),
        expected: std::any::type_name::<T>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct Tile;
    impl Component for Tile {}

    #[derive(Default)]
    struct CountingSystem {
        registered: bool,
        call_count: u32,
    }

    impl System for CountingSystem {
        fn required_components(&self) -> &[&'static str] {
            &["tile"]
        }

        fn on_register(&mut self, _components: &ComponentRegistry) -> Result<()> {
            self.registered = true;
            Ok(())
        }

        fn on_tick(&mut self, _ctx: &mut SystemContext<'_>) -> Result<()> {
            self.call_count += 1;
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct RefusingSystem;

    impl System for RefusingSystem {
        fn on_register(&mut self, _components: &ComponentRegistry) -> Result<()> {
            anyhow::bail!("not today")
        }

        fn on_tick(&mut self, _ctx: &mut SystemContext<'_>) -> Result<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn components() -> ComponentRegistry {
        let mut components = ComponentRegistry::new();
        components.register::<Tile>("tile").unwrap();
        components
    }

    #[test]
    fn test_register_and_get() {
        let components = components();
        let mut registry = SystemRegistry::new();
        registry
            .register("tile", Box::new(CountingSystem::default()), &components)
            .unwrap();

        assert!(registry.contains("tile"));
        let system = registry.get_as::<CountingSystem>("tile").unwrap();
        assert!(system.registered);

        let err = registry.get("display").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_duplicate_name_fails() {
        let components = components();
        let mut registry = SystemRegistry::new();
        registry
            .register("tile", Box::new(CountingSystem::default()), &components)
            .unwrap();

        let err = registry
            .register("tile", Box::new(CountingSystem::default()), &components)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_dependency_fails() {
        let mut registry = SystemRegistry::new();
        let err = registry
            .register(
                "tile",
                Box::new(CountingSystem::default()),
                &ComponentRegistry::new(),
            )
            .unwrap_err();
        assert!(matches!(err, EcsError::MissingDependency { ref kind, .. } if kind == "tile"));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_failed_on_register_is_not_kept() {
        let mut registry = SystemRegistry::new();
        let err = registry
            .register("refusing", Box::new(RefusingSystem), &ComponentRegistry::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::System);
        assert!(!registry.contains("refusing"));
    }

    #[test]
    fn test_typed_lookup_mismatch() {
        let mut registry = SystemRegistry::new();
        registry
            .register("display", Box::new(CountingSystem::default()), &components())
            .unwrap();
        let err = registry.get_as::<RefusingSystem>("display").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_names_keep_registration_order() {
        let components = components();
        let mut registry = SystemRegistry::new();
        registry
            .register("b", Box::new(CountingSystem::default()), &components)
            .unwrap();
        registry
            .register("a", Box::new(CountingSystem::default()), &components)
            .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
