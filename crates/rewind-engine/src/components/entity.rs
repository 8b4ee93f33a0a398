use crate::animation::palette::{Palette, ThemeIndex};
use crate::animation::sequence::Sequence;
use crate::api::error::{EngineError, Result};
use crate::api::types::{ActivationWindow, EntityId};
use crate::components::link::ParentLink;
use crate::components::visual::Visual;
use crate::core::compositor::TransformCompositor;
use crate::renderer::node::RenderNode;

/// A timed, independently activatable visual object.
///
/// The parent chain is private to the entity: links are lightweight transform
/// providers, never other entities.
pub struct TimedEntity {
    id: EntityId,
    window: ActivationWindow,
    /// Draw-order depth; larger values draw further back.
    pub depth: f32,
    /// Theme color channel, sampled relative to the start time.
    pub colors: Sequence<ThemeIndex>,
    /// First element: the entity's own transform. Last element: the root that
    /// is shown and hidden on activation.
    chain: Vec<ParentLink>,
    pub visual: Visual,
    /// Node the resolved color is written to.
    pub node: Box<dyn RenderNode>,
}

impl TimedEntity {
    /// Create an entity alive during `[start, kill)`.
    ///
    /// Rejects empty windows and empty chains.
    pub fn new(
        id: EntityId,
        start: f32,
        kill: f32,
        chain: Vec<ParentLink>,
        node: Box<dyn RenderNode>,
    ) -> Result<Self> {
        let window = ActivationWindow::new(start, kill);
        if !window.is_valid() {
            return Err(EngineError::InvalidActivationWindow { id, start, kill });
        }
        if chain.is_empty() {
            return Err(EngineError::EmptyParentChain { id });
        }
        Ok(Self {
            id,
            window,
            depth: 0.0,
            colors: Sequence::constant(ThemeIndex(0)),
            chain,
            visual: Visual::default(),
            node,
        })
    }

    // -- Builder pattern --

    pub fn with_colors(mut self, colors: Sequence<ThemeIndex>) -> Self {
        self.colors = colors;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_visual(mut self, visual: Visual) -> Self {
        self.visual = visual;
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn window(&self) -> ActivationWindow {
        self.window
    }

    pub fn start_time(&self) -> f32 {
        self.window.start
    }

    pub fn kill_time(&self) -> f32 {
        self.window.kill
    }

    pub fn chain(&self) -> &[ParentLink] {
        &self.chain
    }

    pub fn chain_mut(&mut self) -> &mut [ParentLink] {
        &mut self.chain
    }

    /// Replace the activation window. Only the registry calls this, so the
    /// scheduler always hears about the change.
    pub(crate) fn set_window(&mut self, start: f32, kill: f32) -> Result<()> {
        let window = ActivationWindow::new(start, kill);
        if !window.is_valid() {
            return Err(EngineError::InvalidActivationWindow { id: self.id, start, kill });
        }
        self.window = window;
        Ok(())
    }

    /// Largest palette index referenced by the color channel.
    pub fn max_theme_index(&self) -> ThemeIndex {
        self.colors
            .keyframes()
            .iter()
            .map(|k| k.value)
            .max()
            .unwrap_or_default()
    }

    /// Fail if any color keyframe points outside `palette`.
    pub fn check_palette(&self, palette: &Palette) -> Result<()> {
        palette.get(self.max_theme_index()).map(|_| ())
    }

    /// Show the entity: activates the root of its chain.
    pub fn enter_level(&mut self) {
        self.visual.invalidate();
        if let Some(root) = self.chain.last_mut() {
            root.node.set_active(true);
        }
    }

    /// Hide the entity.
    pub fn exit_level(&mut self) {
        if let Some(root) = self.chain.last_mut() {
            root.node.set_active(false);
        }
    }

    /// Recompute transform and color state for the absolute clock `time`.
    pub fn update_time(&mut self, time: f32, compositor: &TransformCompositor, palette: &Palette) {
        compositor.compose(self, time, palette);
    }
}

impl std::fmt::Debug for TimedEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedEntity")
            .field("id", &self.id)
            .field("window", &self.window)
            .field("depth", &self.depth)
            .field("chain", &self.chain)
            .field("visual", &self.visual)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::keyframe::Keyframe;
    use crate::animation::palette::Color;
    use crate::renderer::node::{NullNode, SharedNode};

    fn link(node: &SharedNode) -> ParentLink {
        ParentLink::new(node.boxed())
    }

    #[test]
    fn rejects_empty_window() {
        let node = SharedNode::new();
        let err = TimedEntity::new(EntityId(1), 2.0, 2.0, vec![link(&node)], Box::new(NullNode)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidActivationWindow { .. }));
        let err = TimedEntity::new(EntityId(1), 3.0, 2.0, vec![link(&node)], Box::new(NullNode)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidActivationWindow { .. }));
    }

    #[test]
    fn rejects_empty_chain() {
        let err = TimedEntity::new(EntityId(1), 0.0, 1.0, Vec::new(), Box::new(NullNode)).unwrap_err();
        assert!(matches!(err, EngineError::EmptyParentChain { id } if id == EntityId(1)));
    }

    #[test]
    fn enter_and_exit_toggle_the_root_only() {
        let bottom = SharedNode::new();
        let root = SharedNode::new();
        let mut entity = TimedEntity::new(
            EntityId(1),
            0.0,
            1.0,
            vec![link(&bottom), link(&root)],
            Box::new(NullNode),
        )
        .unwrap();

        entity.enter_level();
        assert!(root.state().is_active());
        assert!(!bottom.state().is_active());

        entity.exit_level();
        assert!(!root.state().is_active());
    }

    #[test]
    fn palette_check_uses_the_largest_index() {
        let node = SharedNode::new();
        let entity = TimedEntity::new(EntityId(1), 0.0, 1.0, vec![link(&node)], Box::new(NullNode))
            .unwrap()
            .with_colors(
                Sequence::new(vec![
                    Keyframe::linear(0.0, ThemeIndex(3)),
                    Keyframe::linear(1.0, ThemeIndex(1)),
                ])
                .unwrap(),
            );
        assert_eq!(entity.max_theme_index(), ThemeIndex(3));
        assert!(entity.check_palette(&Palette::new(vec![Color::WHITE; 4])).is_ok());
        assert!(entity.check_palette(&Palette::new(vec![Color::WHITE; 3])).is_err());
    }
}
