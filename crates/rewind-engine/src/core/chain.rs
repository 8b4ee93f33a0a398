// core/chain.rs
//
// Turns flat object descriptions (each with an optional parent id) into the
// per-entity parent chains the compositor walks. Every entity gets its own
// private chain; shared parents are duplicated, each copy with its own node.
//
// Usage:
//   let objects = ObjectDescriptor::list_from_json(json)?;
//   let builder = ChainBuilder::new(&objects);
//   let chain = builder.build(id, &mut |_| Box::new(NullNode))?;

use std::collections::{HashMap, HashSet};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::sequence::Sequence;
use crate::api::error::{EngineError, Result};
use crate::api::types::EntityId;
use crate::components::link::ParentLink;
use crate::renderer::node::RenderNode;

fn default_position() -> Sequence<Vec2> {
    Sequence::constant(Vec2::ZERO)
}

fn default_scale() -> Sequence<Vec2> {
    Sequence::constant(Vec2::ONE)
}

fn default_rotation() -> Sequence<f32> {
    Sequence::constant(0.0)
}

fn yes() -> bool {
    true
}

/// One object as handed over by a level converter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    pub id: EntityId,
    #[serde(default)]
    pub parent: Option<EntityId>,
    /// The object's own start time; its channels are sampled relative to it.
    #[serde(default)]
    pub start_time: f32,
    #[serde(default = "default_position")]
    pub position: Sequence<Vec2>,
    #[serde(default = "default_scale")]
    pub scale: Sequence<Vec2>,
    /// Degrees.
    #[serde(default = "default_rotation")]
    pub rotation: Sequence<f32>,
    #[serde(default = "yes")]
    pub inherit_position: bool,
    #[serde(default = "yes")]
    pub inherit_scale: bool,
    #[serde(default = "yes")]
    pub inherit_rotation: bool,
    #[serde(default)]
    pub offset_position: f32,
    #[serde(default)]
    pub offset_scale: f32,
    #[serde(default)]
    pub offset_rotation: f32,
}

impl ObjectDescriptor {
    /// A static object without a parent.
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            parent: None,
            start_time: 0.0,
            position: default_position(),
            scale: default_scale(),
            rotation: default_rotation(),
            inherit_position: true,
            inherit_scale: true,
            inherit_rotation: true,
            offset_position: 0.0,
            offset_scale: 0.0,
            offset_rotation: 0.0,
        }
    }

    pub fn with_parent(mut self, parent: EntityId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_start_time(mut self, start_time: f32) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_position(mut self, position: Sequence<Vec2>) -> Self {
        self.position = position;
        self
    }

    pub fn with_scale(mut self, scale: Sequence<Vec2>) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_rotation(mut self, rotation: Sequence<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_inherit(mut self, position: bool, scale: bool, rotation: bool) -> Self {
        self.inherit_position = position;
        self.inherit_scale = scale;
        self.inherit_rotation = rotation;
        self
    }

    pub fn with_offsets(mut self, position: f32, scale: f32, rotation: f32) -> Self {
        self.offset_position = position;
        self.offset_scale = scale;
        self.offset_rotation = rotation;
        self
    }

    /// Parse a JSON array of descriptors.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    fn to_link(&self, node: Box<dyn RenderNode>) -> ParentLink {
        ParentLink::new(node)
            .with_position(self.position.clone())
            .with_scale(self.scale.clone())
            .with_rotation(self.rotation.clone())
            .with_time_offset(self.start_time)
            .with_inherit(self.inherit_position, self.inherit_scale, self.inherit_rotation)
            .with_offsets(self.offset_position, self.offset_scale, self.offset_rotation)
    }
}

/// Builds parent chains over a set of descriptors.
pub struct ChainBuilder<'a> {
    objects: HashMap<EntityId, &'a ObjectDescriptor>,
    order: Vec<EntityId>,
}

impl<'a> ChainBuilder<'a> {
    pub fn new(objects: &'a [ObjectDescriptor]) -> Self {
        let mut map = HashMap::with_capacity(objects.len());
        let mut order = Vec::with_capacity(objects.len());
        for object in objects {
            if map.insert(object.id, object).is_some() {
                log::warn!("object {} described twice, keeping the last", object.id);
            } else {
                order.push(object.id);
            }
        }
        Self { objects: map, order }
    }

    /// Chain for `id`: the object itself first, then its parent, grandparent
    /// and so on. A parent id with no descriptor ends the chain there.
    ///
    /// `make_node` is called once per link, with the id of the object the link
    /// describes.
    pub fn build<F>(&self, id: EntityId, make_node: &mut F) -> Result<Vec<ParentLink>>
    where
        F: FnMut(EntityId) -> Box<dyn RenderNode>,
    {
        let mut current = *self.objects.get(&id).ok_or(EngineError::UnknownObject { id })?;
        let mut visited = HashSet::new();
        let mut chain = Vec::new();

        loop {
            if !visited.insert(current.id) {
                return Err(EngineError::CyclicParentChain { id });
            }
            chain.push(current.to_link(make_node(current.id)));

            let Some(parent) = current.parent else { break };
            match self.objects.get(&parent) {
                Some(next) => current = *next,
                None => {
                    log::debug!("object {} has undescribed parent {}, chain ends", current.id, parent);
                    break;
                }
            }
        }

        Ok(chain)
    }

    /// Build every described object's chain, in description order. Objects
    /// whose chain fails are logged and left out.
    pub fn build_all<F>(&self, make_node: &mut F) -> Vec<(EntityId, Vec<ParentLink>)>
    where
        F: FnMut(EntityId) -> Box<dyn RenderNode>,
    {
        let mut chains = Vec::with_capacity(self.order.len());
        for &id in &self.order {
            match self.build(id, make_node) {
                Ok(chain) => chains.push((id, chain)),
                Err(err) => log::warn!("skipping object {}: {}", id, err),
            }
        }
        chains
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
