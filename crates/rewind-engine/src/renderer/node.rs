//! Render-node capability: the only way the engine touches the scene layer.
//!
//! The engine never owns rendering resources. Every transform link and every
//! entity visual holds a boxed [`RenderNode`] supplied by the host, and the
//! engine only writes activation, local transform and color through it.

use std::cell::RefCell;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec2, Vec3};

use crate::animation::palette::Color;

/// Write-only handle to a host scene node.
pub trait RenderNode {
    /// Show or hide the node (and, in a hierarchy, everything under it).
    fn set_active(&mut self, active: bool);

    /// Local position relative to the parent node. `z` carries draw order.
    fn set_local_position(&mut self, position: Vec3);

    fn set_local_scale(&mut self, scale: Vec2);

    fn set_local_rotation(&mut self, rotation: Quat);

    /// Final resolved color for a visual node.
    fn set_color(&mut self, color: Color);
}

/// Flat snapshot of everything written to a node.
/// 14 floats, so snapshots can be shipped as one float buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct NodeState {
    pub position: [f32; 3],
    pub scale: [f32; 2],
    /// Quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    pub color: [f32; 4],
    /// 1.0 when active, 0.0 otherwise.
    pub active: f32,
}

impl NodeState {
    pub const FLOATS: usize = 14;

    pub fn is_active(&self) -> bool {
        self.active != 0.0
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn scale(&self) -> Vec2 {
        Vec2::from_array(self.scale)
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_array(self.rotation)
    }

    pub fn color(&self) -> Color {
        let [r, g, b, a] = self.color;
        Color::rgba(r, g, b, a)
    }

    /// View a slice of snapshots as raw floats.
    pub fn as_floats(states: &[NodeState]) -> &[f32] {
        bytemuck::cast_slice(states)
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            scale: [1.0, 1.0],
            rotation: Quat::IDENTITY.to_array(),
            color: [1.0; 4],
            active: 0.0,
        }
    }
}

#[derive(Debug, Default)]
struct NodeRecord {
    state: NodeState,
    color_writes: u32,
}

/// Headless retained node: remembers the last state written to it.
///
/// Clones share the same record, so a host (or a test) can keep one handle
/// and give the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct SharedNode {
    record: Rc<RefCell<NodeRecord>>,
}

impl SharedNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current state.
    pub fn state(&self) -> NodeState {
        self.record.borrow().state
    }

    /// How many times a color has been written.
    pub fn color_writes(&self) -> u32 {
        self.record.borrow().color_writes
    }

    /// Boxed clone, ready to hand to a link or entity.
    pub fn boxed(&self) -> Box<dyn RenderNode> {
        Box::new(self.clone())
    }
}

impl RenderNode for SharedNode {
    fn set_active(&mut self, active: bool) {
        self.record.borrow_mut().state.active = if active { 1.0 } else { 0.0 };
    }

    fn set_local_position(&mut self, position: Vec3) {
        self.record.borrow_mut().state.position = position.to_array();
    }

    fn set_local_scale(&mut self, scale: Vec2) {
        self.record.borrow_mut().state.scale = scale.to_array();
    }

    fn set_local_rotation(&mut self, rotation: Quat) {
        self.record.borrow_mut().state.rotation = rotation.to_array();
    }

    fn set_color(&mut self, color: Color) {
        let mut record = self.record.borrow_mut();
        record.state.color = [color.r, color.g, color.b, color.a];
        record.color_writes += 1;
    }
}

/// Node that ignores every write, for links nobody observes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNode;

impl RenderNode for NullNode {
    fn set_active(&mut self, _active: bool) {}
    fn set_local_position(&mut self, _position: Vec3) {}
    fn set_local_scale(&mut self, _scale: Vec2) {}
    fn set_local_rotation(&mut self, _rotation: Quat) {}
    fn set_color(&mut self, _color: Color) {}
}
