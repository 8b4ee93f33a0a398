//! What an entity draws as. The engine only decides *which color* a visual
//! shows; how it is drawn is up to the render node.

use serde::{Deserialize, Serialize};

use crate::animation::palette::Color;
use crate::renderer::node::RenderNode;

/// Opacity used for helper objects in level data.
pub const HELPER_OPACITY: f32 = 0.35;

/// The two kinds of entity visual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Visual {
    /// Filled shape. The palette alpha is replaced by the visual's own opacity.
    Solid { opacity: f32 },
    /// Text block. Only RGB follows the palette; identical colors are not re-sent.
    Text {
        opacity: f32,
        text: String,
        #[serde(skip)]
        last: Option<Color>,
    },
}

impl Visual {
    pub fn solid(opacity: f32) -> Self {
        Visual::Solid { opacity }
    }

    pub fn text(opacity: f32, text: impl Into<String>) -> Self {
        Visual::Text {
            opacity,
            text: text.into(),
            last: None,
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            Visual::Solid { opacity } | Visual::Text { opacity, .. } => *opacity,
        }
    }

    /// Push a resolved palette color to the node.
    pub fn apply(&mut self, color: Color, node: &mut dyn RenderNode) {
        match self {
            Visual::Solid { opacity } => node.set_color(color.with_alpha(*opacity)),
            Visual::Text { opacity, last, .. } => {
                if *last == Some(color) {
                    return;
                }
                *last = Some(color);
                node.set_color(color.with_alpha(*opacity));
            }
        }
    }

    /// Forget cached state so the next `apply` always writes.
    pub fn invalidate(&mut self) {
        if let Visual::Text { last, .. } = self {
            *last = None;
        }
    }
}

impl Default for Visual {
    fn default() -> Self {
        Visual::solid(1.0)
    }
}
