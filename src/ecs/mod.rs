//! Entity Component System (ECS) core
//!
//! Entities are generational handles, components are typed payloads stored
//! per string kind, and systems are named behavior units run each tick.

pub mod component;
pub mod entity;
pub mod query;
pub mod store;
pub mod system;

pub use component::{Component, ComponentRegistry, KindId, KindInfo};
pub use entity::Entity;
pub use query::Query;
pub use store::EntityStore;
pub use system::{System, SystemContext, SystemRegistry};
