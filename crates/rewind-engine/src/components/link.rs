use glam::Vec2;

use crate::animation::sequence::Sequence;
use crate::renderer::node::RenderNode;

/// One transform provider in an entity's parent chain.
///
/// Each link animates its own node's local position/scale/rotation. The
/// `inherit_*` flags say whether the link *above* this one is still driven on
/// that axis; the `offset_*` values delay the link above on that axis.
pub struct ParentLink {
    pub position: Sequence<Vec2>,
    pub scale: Sequence<Vec2>,
    /// Degrees about the forward axis.
    pub rotation: Sequence<f32>,
    /// Subtracted from the clock before sampling, usually the described
    /// object's own start time.
    pub time_offset: f32,
    pub inherit_position: bool,
    pub inherit_scale: bool,
    pub inherit_rotation: bool,
    pub offset_position: f32,
    pub offset_scale: f32,
    pub offset_rotation: f32,
    pub node: Box<dyn RenderNode>,
}

impl ParentLink {
    /// A static link at the origin, unit scale, no rotation, inheriting every axis.
    pub fn new(node: Box<dyn RenderNode>) -> Self {
        Self {
            position: Sequence::constant(Vec2::ZERO),
            scale: Sequence::constant(Vec2::ONE),
            rotation: Sequence::constant(0.0),
            time_offset: 0.0,
            inherit_position: true,
            inherit_scale: true,
            inherit_rotation: true,
            offset_position: 0.0,
            offset_scale: 0.0,
            offset_rotation: 0.0,
            node,
        }
    }

    // -- Builder pattern --

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

    pub fn with_time_offset(mut self, time_offset: f32) -> Self {
        self.time_offset = time_offset;
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
}

impl std::fmt::Debug for ParentLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParentLink")
            .field("time_offset", &self.time_offset)
            .field(
                "inherit",
                &(self.inherit_position, self.inherit_scale, self.inherit_rotation),
            )
            .field(
                "offsets",
                &(self.offset_position, self.offset_scale, self.offset_rotation),
            )
            .finish_non_exhaustive()
    }
}
