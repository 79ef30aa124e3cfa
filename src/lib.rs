//! # kindred
//!
//! A small Entity-Component-System runtime. Entities are opaque handles,
//! components are typed payloads registered under string kinds, and systems
//! are named behavior units the [`Manager`] runs once per tick. A built-in
//! display system turns positioned drawables into frames for a render
//! backend.

pub mod components;
pub mod config;
pub mod display;
pub mod ecs;
pub mod engine;
pub mod error;
pub mod manager;
pub mod rng;
pub mod stress;

pub use config::Config;
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use error::{EcsError, ErrorKind};
pub use manager::{Manager, TickStats};
