// core/compositor.rs
//
// Per-frame transform evaluation for one entity's parent chain.
//
// The chain is walked bottom (the entity's own transform) to top (the root
// that the host sees). Each link writes its *local* transform to its own
// node; the host's scene graph does the actual parent multiplication.
//
// Usage:
//   let compositor = TransformCompositor::new(config.depth_bias);
//   compositor.compose(&mut entity, time, &palette);

use glam::{Quat, Vec3};

use crate::animation::palette::Palette;
use crate::components::entity::TimedEntity;

/// Still-animating flag and time offset for one axis while walking a chain.
#[derive(Debug, Clone, Copy)]
struct AxisState {
    driven: bool,
    offset: f32,
}

impl AxisState {
    const START: AxisState = AxisState { driven: true, offset: 0.0 };

    /// Carry the axis past a link. Once an axis stops inheriting, every link
    /// above stays frozen on that axis; the offset is replaced, not summed.
    #[inline]
    fn pass(&mut self, inherit: bool, offset: f32) {
        self.driven = self.driven && inherit;
        self.offset = offset;
    }
}

/// Evaluates parent chains and pushes the results to render nodes.
#[derive(Debug, Clone, Copy)]
pub struct TransformCompositor {
    /// Local z per unit of entity depth.
    pub depth_bias: f32,
}

impl Default for TransformCompositor {
    fn default() -> Self {
        Self { depth_bias: 0.0005 }
    }
}

impl TransformCompositor {
    pub fn new(depth_bias: f32) -> Self {
        Self { depth_bias }
    }

    /// Write every link's local transform and the entity's color for `time`.
    pub fn compose(&self, entity: &mut TimedEntity, time: f32, palette: &Palette) {
        let z = entity.depth * self.depth_bias;
        let start = entity.start_time();

        let mut position = AxisState::START;
        let mut scale = AxisState::START;
        let mut rotation = AxisState::START;

        for link in entity.chain_mut() {
            if position.driven {
                let p = link.position.interpolate(time - link.time_offset - position.offset);
                link.node.set_local_position(Vec3::new(p.x, p.y, z));
            }
            if scale.driven {
                let s = link.scale.interpolate(time - link.time_offset - scale.offset);
                link.node.set_local_scale(s);
            }
            if rotation.driven {
                let degrees = link.rotation.interpolate(time - link.time_offset - rotation.offset);
                link.node.set_local_rotation(Quat::from_rotation_z(degrees.to_radians()));
            }

            position.pass(link.inherit_position, link.offset_position);
            scale.pass(link.inherit_scale, link.offset_scale);
            rotation.pass(link.inherit_rotation, link.offset_rotation);

            if !(position.driven || scale.driven || rotation.driven) {
                break;
            }
        }

        let color = entity.colors.interpolate_with(time - start, palette);
        entity.visual.apply(color, entity.node.as_mut());
    }
}
