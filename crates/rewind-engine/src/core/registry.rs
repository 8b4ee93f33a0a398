use std::collections::HashMap;

use crate::api::error::{EngineError, Result};
use crate::api::types::{ActivationWindow, EntityId};
use crate::components::entity::TimedEntity;

/// Change notification published to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegistryEvent {
    Inserted { id: EntityId, window: ActivationWindow },
    Removed { id: EntityId },
    Retimed { id: EntityId, window: ActivationWindow },
}

/// Handle returned by [`Registry::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u32);

/// Canonical entity collection with per-subscriber change queues.
///
/// Subscribers never get callbacks; they drain their own queue when they are
/// ready, usually once per frame.
pub struct Registry {
    entities: HashMap<EntityId, TimedEntity>,
    /// Removed entities, kept until the next purge so an owner can still hide them.
    graveyard: HashMap<EntityId, TimedEntity>,
    subscribers: Vec<(SubscriberId, Vec<RegistryEvent>)>,
    next_subscriber: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entities: HashMap::with_capacity(capacity),
            graveyard: HashMap::new(),
            subscribers: Vec::new(),
            next_subscriber: 1,
        }
    }

    // -- Subscriptions --

    /// Start receiving events. Only changes made after this call are queued.
    pub fn subscribe(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push((id, Vec::new()));
        id
    }

    /// Stop receiving events and drop anything still queued.
    pub fn unsubscribe(&mut self, subscriber: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscriber);
        self.subscribers.len() != before
    }

    /// Take every queued event for `subscriber`, oldest first.
    pub fn drain(&mut self, subscriber: SubscriberId) -> Vec<RegistryEvent> {
        self.subscribers
            .iter_mut()
            .find(|(id, _)| *id == subscriber)
            .map(|(_, queue)| std::mem::take(queue))
            .unwrap_or_default()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    fn publish(&mut self, event: RegistryEvent) {
        for (_, queue) in &mut self.subscribers {
            queue.push(event);
        }
    }

    // -- Mutation --

    /// Register an entity. Ids must be unique, including ids removed since
    /// the last purge.
    pub fn insert(&mut self, entity: TimedEntity) -> Result<()> {
        let id = entity.id();
        if self.entities.contains_key(&id) || self.graveyard.contains_key(&id) {
            return Err(EngineError::DuplicateEntity { id });
        }
        let window = entity.window();
        self.entities.insert(id, entity);
        self.publish(RegistryEvent::Inserted { id, window });
        Ok(())
    }

    /// Unregister an entity. It stays reachable through
    /// [`Registry::get_any_mut`] until [`Registry::purge`].
    pub fn remove(&mut self, id: EntityId) -> Result<()> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(EngineError::UnknownEntity { id })?;
        self.graveyard.insert(id, entity);
        self.publish(RegistryEvent::Removed { id });
        Ok(())
    }

    /// Change an entity's activation window.
    pub fn retime(&mut self, id: EntityId, start: f32, kill: f32) -> Result<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EngineError::UnknownEntity { id })?;
        entity.set_window(start, kill)?;
        let window = entity.window();
        self.publish(RegistryEvent::Retimed { id, window });
        Ok(())
    }

    /// Drop removed entities. Returns how many were dropped.
    pub fn purge(&mut self) -> usize {
        let count = self.graveyard.len();
        self.graveyard.clear();
        count
    }

    // -- Access --

    pub fn get(&self, id: EntityId) -> Option<&TimedEntity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut TimedEntity> {
        self.entities.get_mut(&id)
    }

    /// Live or removed-but-not-purged entity.
    pub fn get_any_mut(&mut self, id: EntityId) -> Option<&mut TimedEntity> {
        match self.entities.get_mut(&id) {
            Some(entity) => Some(entity),
            None => self.graveyard.get_mut(&id),
        }
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEntity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut TimedEntity> {
        self.entities.values_mut()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::link::ParentLink;
    use crate::renderer::node::NullNode;

    fn entity(id: u32, start: f32, kill: f32) -> TimedEntity {
        TimedEntity::new(
            EntityId(id),
            start,
            kill,
            vec![ParentLink::new(Box::new(NullNode))],
            Box::new(NullNode),
        )
        .unwrap()
    }

    #[test]
    fn insert_and_get() {
        let mut registry = Registry::new();
        registry.insert(entity(1, 0.0, 2.0)).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(EntityId(1)).unwrap().kill_time(), 2.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = Registry::new();
        registry.insert(entity(1, 0.0, 2.0)).unwrap();
        let err = registry.insert(entity(1, 5.0, 6.0)).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateEntity { id } if id == EntityId(1)));
        assert_eq!(registry.get(EntityId(1)).unwrap().start_time(), 0.0);
    }

    #[test]
    fn every_subscriber_gets_its_own_queue() {
        let mut registry = Registry::new();
        let a = registry.subscribe();
        let b = registry.subscribe();
        registry.insert(entity(1, 0.0, 2.0)).unwrap();

        assert_eq!(registry.drain(a).len(), 1);
        assert!(registry.drain(a).is_empty());
        registry.remove(EntityId(1)).unwrap();

        let events = registry.drain(b);
        assert_eq!(
            events,
            vec![
                RegistryEvent::Inserted {
                    id: EntityId(1),
                    window: ActivationWindow::new(0.0, 2.0)
                },
                RegistryEvent::Removed { id: EntityId(1) },
            ]
        );
        assert_eq!(registry.drain(a), vec![RegistryEvent::Removed { id: EntityId(1) }]);
    }

    #[test]
    fn unsubscribed_queues_are_dropped() {
        let mut registry = Registry::new();
        let a = registry.subscribe();
        registry.insert(entity(1, 0.0, 2.0)).unwrap();
        assert!(registry.unsubscribe(a));
        assert!(!registry.unsubscribe(a));
        assert!(registry.drain(a).is_empty());
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[test]
    fn removed_entities_linger_until_purge() {
        let mut registry = Registry::new();
        registry.insert(entity(1, 0.0, 2.0)).unwrap();
        registry.remove(EntityId(1)).unwrap();
        assert!(registry.get(EntityId(1)).is_none());
        assert!(registry.get_any_mut(EntityId(1)).is_some());
        // Not reusable before the purge.
        assert!(registry.insert(entity(1, 0.0, 2.0)).is_err());

        assert_eq!(registry.purge(), 1);
        assert!(registry.get_any_mut(EntityId(1)).is_none());
        assert!(registry.insert(entity(1, 0.0, 2.0)).is_ok());
    }

    #[test]
    fn remove_unknown_fails() {
        let mut registry = Registry::new();
        let err = registry.remove(EntityId(7)).unwrap_err();
        assert!(matches!(err, EngineError::UnknownEntity { .. }));
    }

    #[test]
    fn retime_validates_and_publishes() {
        let mut registry = Registry::new();
        registry.insert(entity(1, 0.0, 2.0)).unwrap();
        let sub = registry.subscribe();

        let err = registry.retime(EntityId(1), 3.0, 3.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidActivationWindow { .. }));
        assert!(registry.drain(sub).is_empty());

        registry.retime(EntityId(1), 3.0, 4.0).unwrap();
        assert_eq!(
            registry.drain(sub),
            vec![RegistryEvent::Retimed {
                id: EntityId(1),
                window: ActivationWindow::new(3.0, 4.0)
            }]
        );
        assert_eq!(registry.get(EntityId(1)).unwrap().start_time(), 3.0);
    }
}
