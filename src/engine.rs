//! Engine - a Manager bootstrapped with the built-in kinds and display system

use log::info;

use crate::components::{DrawableData, WorldLocationData, DRAWABLE, WORLD_LOCATION};
use crate::config::DisplayConfig;
use crate::display::{DisplaySystem, RenderBackend, DISPLAY_SYSTEM};
use crate::ecs::{Component, System};
use crate::error::Result;
use crate::manager::{Manager, TickStats};

type SetupStep = Box<dyn FnOnce(&mut Manager) -> Result<()>>;

pub struct EngineSettings {
    pub display: DisplayConfig,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    backend: Option<Box<dyn RenderBackend>>,
    steps: Vec<SetupStep>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            backend: None,
            steps: Vec::new(),
        }
    }

    pub fn with_backend(mut self, backend: impl RenderBackend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Register an extra component kind after the built-in ones.
    pub fn with_component<T: Component>(mut self, kind: &str) -> Self {
        let kind = kind.to_string();
        self.steps
            .push(Box::new(move |manager| manager.register_component::<T>(&kind)));
        self
    }

    /// Register an extra system after `display`. Steps run in call order.
    pub fn with_system(mut self, name: &str, system: impl System) -> Self {
        let name = name.to_string();
        self.steps
            .push(Box::new(move |manager| manager.register_system(&name, system)));
        self
    }

    pub fn build(self) -> Result<Engine> {
        let mut manager = Manager::new();
        manager.register_component::<WorldLocationData>(WORLD_LOCATION)?;
        manager.register_component::<DrawableData>(DRAWABLE)?;

        let DisplayConfig {
            width,
            height,
            smoothing,
        } = self.settings.display;
        let mut display = DisplaySystem::new(width, height);
        if !smoothing {
            display.disable_smoothing();
        }
        if let Some(backend) = self.backend {
            display.set_backend(backend);
        }
        manager.register_system(DISPLAY_SYSTEM, display)?;

        for step in self.steps {
            step(&mut manager)?;
        }
        info!(
            "engine ready: {width}x{height} display, {} component kinds, {} systems",
            manager.components().len(),
            manager.systems().len()
        );
        Ok(Engine { manager })
    }
}

pub struct Engine {
    manager: Manager,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        EngineBuilder::new(settings).build()
    }

    pub fn manager(&self) -> &Manager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut Manager {
        &mut self.manager
    }

    pub fn display(&self) -> Result<&DisplaySystem> {
        self.manager.system(DISPLAY_SYSTEM)
    }

    pub fn display_mut(&mut self) -> Result<&mut DisplaySystem> {
        self.manager.system_mut(DISPLAY_SYSTEM)
    }

    pub fn tick(&mut self) -> Result<TickStats> {
        self.manager.tick()
    }

    pub fn run(&mut self, ticks: u64) -> Result<()> {
        self.manager.run(ticks)?;
        if let Some(average) = self.manager.average_tick_time() {
            info!(
                "ran {ticks} ticks over {} entities, average tick {average:?}",
                self.manager.entity_count()
            );
        }
        Ok(())
    }
}
