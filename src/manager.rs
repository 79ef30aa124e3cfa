//! Manager - the single façade over component kinds, entities and systems

use std::time::{Duration, Instant};

use log::trace;

use crate::ecs::{
    Component, ComponentRegistry, Entity, EntityStore, Query, System, SystemContext,
    SystemRegistry,
};
use crate::error::{EcsError, Result};

/// Statistics for a single tick
#[derive(Debug, Clone)]
pub struct TickStats {
    pub tick: u64,
    pub duration: Duration,
    pub system_times: Vec<(String, Duration)>,
}

/// Owns every registry and is the only mutation surface collaborators use.
///
/// Kind validation is left to the [`ComponentRegistry`]; the manager only
/// routes calls.
pub struct Manager {
    components: ComponentRegistry,
    entities: EntityStore,
    systems: SystemRegistry,
    tick_count: u64,
    stats_history: Vec<TickStats>,
    max_stats_history: usize,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            components: ComponentRegistry::new(),
            entities: EntityStore::new(),
            systems: SystemRegistry::new(),
            tick_count: 0,
            stats_history: Vec::new(),
            max_stats_history: 100,
        }
    }

    pub fn register_component<T: Component>(&mut self, kind: &str) -> Result<()> {
        self.components.register::<T>(kind).map(|_| ())
    }

    pub fn register_system(&mut self, name: &str, system: impl System) -> Result<()> {
        self.systems
            .register(name, Box::new(system), &self.components)
    }

    pub fn get_system(&self, name: &str) -> Result<&dyn System> {
        self.systems.get(name)
    }

    pub fn get_system_mut(&mut self, name: &str) -> Result<&mut dyn System> {
        self.systems.get_mut(name)
    }

    /// Typed lookup, e.g. `manager.system::<DisplaySystem>("display")`.
    pub fn system<T: System>(&self, name: &str) -> Result<&T> {
        self.systems.get_as(name)
    }

    pub fn system_mut<T: System>(&mut self, name: &str) -> Result<&mut T> {
        self.systems.get_as_mut(name)
    }

    pub fn create_entity(&mut self) -> Entity {
        self.entities.create()
    }

    pub fn destroy_entity(&mut self, entity: Entity) -> Result<()> {
        self.entities.destroy(entity)
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn set_component<T: Component>(&mut self, entity: Entity, kind: &str, data: T) -> Result<()> {
        self.entities
            .set_component(&self.components, entity, kind, data)
    }

    pub fn get_component<T: Component>(&self, entity: Entity, kind: &str) -> Result<Option<&T>> {
        self.entities.get_component(&self.components, entity, kind)
    }

    pub fn get_component_mut<T: Component>(
        &mut self,
        entity: Entity,
        kind: &str,
    ) -> Result<Option<&mut T>> {
        self.entities
            .get_component_mut(&self.components, entity, kind)
    }

    pub fn remove_component<T: Component>(&mut self, entity: Entity, kind: &str) -> Result<Option<T>> {
        self.entities
            .remove_component(&self.components, entity, kind)
    }

    pub fn query(&self, kinds: &[&str]) -> Result<Query> {
        self.entities.query(&self.components, kinds)
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn systems(&self) -> &SystemRegistry {
        &self.systems
    }

    /// Get current tick count
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Run every system once, in registration order.
    ///
    /// The first failing system aborts the tick.
    pub fn tick(&mut self) -> Result<TickStats> {
        let tick_start = Instant::now();
        self.tick_count += 1;
        let tick = self.tick_count;
        let mut system_times = Vec::with_capacity(self.systems.len());

        for (name, system) in self.systems.iter_mut() {
            let system_start = Instant::now();
            let mut ctx = SystemContext::new(tick, &self.components, &mut self.entities);
            system
                .on_tick(&mut ctx)
                .map_err(|source| EcsError::System {
                    name: name.to_string(),
                    source,
                })?;
            system_times.push((name.to_string(), system_start.elapsed()));
        }

        let stats = TickStats {
            tick,
            duration: tick_start.elapsed(),
            system_times,
        };
        trace!("tick {tick} took {:?}", stats.duration);

        self.stats_history.push(stats.clone());
        if self.stats_history.len() > self.max_stats_history {
            self.stats_history.remove(0);
        }
        Ok(stats)
    }

    /// Run `ticks` ticks back to back.
    pub fn run(&mut self, ticks: u64) -> Result<()> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }

    /// Get recent tick statistics
    pub fn recent_stats(&self) -> &[TickStats] {
        &self.stats_history
    }

    /// Get average tick time from recent history
    pub fn average_tick_time(&self) -> Option<Duration> {
        if self.stats_history.is_empty() {
            return None;
        }

        let total: Duration = self.stats_history.iter().map(|s| s.duration).sum();
        Some(total / self.stats_history.len() as u32)
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
