//! Per-frame orchestration: registry changes in, render-node writes out.

use crate::animation::palette::Palette;
use crate::api::config::EngineConfig;
use crate::api::error::{EngineError, Result};
use crate::api::types::{EntityId, Transition};
use crate::components::entity::TimedEntity;
use crate::core::compositor::TransformCompositor;
use crate::core::registry::{Registry, RegistryEvent, SubscriberId};
use crate::core::scheduler::ActivationScheduler;

/// Drives a set of timed entities from a host-supplied clock.
///
/// The host calls [`Engine::update`] once per frame with the playback
/// position. Time may jump backwards at any point.
pub struct Engine {
    registry: Registry,
    scheduler: ActivationScheduler,
    compositor: TransformCompositor,
    palette: Palette,
    config: EngineConfig,
    subscriber: SubscriberId,
}

impl Engine {
    pub fn new(palette: Palette) -> Self {
        Self::with_config(EngineConfig::default(), palette)
    }

    pub fn with_config(config: EngineConfig, palette: Palette) -> Self {
        let mut registry = Registry::with_capacity(config.initial_capacity);
        let subscriber = registry.subscribe();
        log::info!(
            "engine created: {} palette colors, recalculate threshold {}",
            palette.len(),
            config.recalculate_threshold
        );
        Self {
            registry,
            scheduler: ActivationScheduler::with_config(&config),
            compositor: TransformCompositor::new(config.depth_bias),
            palette,
            config,
            subscriber,
        }
    }

    /// Bulk-load a level. Fails on the first entity that would be rejected
    /// by [`Engine::insert`].
    pub fn from_entities(
        config: EngineConfig,
        palette: Palette,
        entities: impl IntoIterator<Item = TimedEntity>,
    ) -> Result<Self> {
        let mut engine = Self::with_config(config, palette);
        for entity in entities {
            engine.insert(entity)?;
        }
        log::info!("loaded {} entities", engine.registry.len());
        Ok(engine)
    }

    // -- Host binding --

    /// Register an entity. It becomes visible on the next `update` whose
    /// time falls inside its window.
    pub fn insert(&mut self, entity: TimedEntity) -> Result<()> {
        entity.check_palette(&self.palette)?;
        self.registry.insert(entity)
    }

    /// Unregister an entity, hiding it on the next `update` if it was
    /// visible. Returns `false` (and logs) for unknown ids.
    pub fn remove(&mut self, id: EntityId) -> bool {
        match self.registry.remove(id) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("remove ignored: {}", err);
                false
            }
        }
    }

    /// Change an entity's activation window.
    pub fn retime(&mut self, id: EntityId, start: f32, kill: f32) -> Result<()> {
        self.registry.retime(id, start, kill)
    }

    /// Bring every entity up to date for `time`.
    ///
    /// Returns the activation changes made during this call.
    pub fn update(&mut self, time: f32) -> Vec<Transition> {
        // 1. Structural changes since the last frame.
        for event in self.registry.drain(self.subscriber) {
            match event {
                RegistryEvent::Inserted { id, window } => self.scheduler.queue_insert(id, window),
                RegistryEvent::Removed { id } => self.scheduler.queue_remove(id),
                RegistryEvent::Retimed { id, window } => self.scheduler.queue_retime(id, window),
            }
        }

        // 2. Activation.
        let transitions = self.scheduler.advance(time);
        for transition in &transitions {
            let Some(entity) = self.registry.get_any_mut(transition.id()) else {
                log::warn!("transition for unknown entity {}", transition.id());
                continue;
            };
            match transition {
                Transition::Activated(_) => entity.enter_level(),
                Transition::Deactivated(_) => entity.exit_level(),
            }
        }

        // 3. Transforms and colors for everything alive.
        for id in self.scheduler.active() {
            if let Some(entity) = self.registry.get_mut(id) {
                entity.update_time(time, &self.compositor, &self.palette);
            }
        }

        self.registry.purge();
        transitions
    }

    /// Swap the live theme. Rejected if any registered entity uses an index
    /// the new palette lacks.
    pub fn set_palette(&mut self, palette: Palette) -> Result<()> {
        let required = self
            .registry
            .iter()
            .map(|e| e.max_theme_index().0 as usize + 1)
            .max()
            .unwrap_or(0);
        if palette.len() < required {
            return Err(EngineError::PaletteTooSmall {
                required,
                len: palette.len(),
            });
        }
        self.palette = palette;
        Ok(())
    }

    /// Stop listening to the registry and hand it back.
    pub fn dispose(mut self) -> Registry {
        self.registry.unsubscribe(self.subscriber);
        self.registry.purge();
        log::info!("engine disposed with {} entities", self.registry.len());
        self.registry
    }

    // -- Queries --

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn entity(&self, id: EntityId) -> Option<&TimedEntity> {
        self.registry.get(id)
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.scheduler.is_active(id)
    }

    pub fn active_count(&self) -> usize {
        self.scheduler.active_count()
    }

    pub fn current_time(&self) -> f32 {
        self.scheduler.current_time()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
