// animation/mod.rs
//
// Keyframe animation: ease curves, keyframes, sequences and theme colors.

pub mod easing;
pub mod keyframe;
pub mod palette;
pub mod sequence;

pub use easing::{inverse_lerp, lerp, lerp_vec2, Easing};
pub use keyframe::Keyframe;
pub use palette::{Color, Palette, ThemeIndex};
pub use sequence::{Interpolator, Linear, Sequence};
