// animation/palette.rs
//
// Theme colors. Color keyframes store palette indices; the actual RGBA values
// are looked up when a sequence is interpolated, so swapping the palette
// recolors every entity without rebuilding any sequence.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use super::easing::lerp;
use super::sequence::Interpolator;
use crate::api::error::{EngineError, Result};

/// Linear RGBA color, 4 floats.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Component-wise lerp. `t` is not clamped.
    #[inline]
    pub fn lerp(self, other: Color, t: f32) -> Color {
        Color {
            r: lerp(self.r, other.r, t),
            g: lerp(self.g, other.g, t),
            b: lerp(self.b, other.b, t),
            a: lerp(self.a, other.a, t),
        }
    }
}

/// Index into the live palette, as stored on color keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeIndex(pub u32);

/// The live theme: an ordered list of object colors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Resolve an index, failing when it is outside the palette.
    pub fn get(&self, index: ThemeIndex) -> Result<Color> {
        self.colors
            .get(index.0 as usize)
            .copied()
            .ok_or(EngineError::PaletteIndexOutOfRange {
                index: index.0,
                len: self.colors.len(),
            })
    }

    /// Raw colors, e.g. for uploading as a flat float buffer.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    fn resolve(&self, index: ThemeIndex) -> Color {
        // Indices are checked against the palette when an entity is registered
        // and whenever the palette is replaced, so a miss here is unreachable
        // for registered entities.
        match self.colors.get(index.0 as usize) {
            Some(color) => *color,
            None => {
                log::warn!("palette index {} unresolved, using white", index.0);
                Color::WHITE
            }
        }
    }
}

impl Interpolator<ThemeIndex> for Palette {
    type Output = Color;

    #[inline]
    fn interpolate(&self, from: &ThemeIndex, to: &ThemeIndex, factor: f32) -> Color {
        self.resolve(*from).lerp(self.resolve(*to), factor)
    }
}
