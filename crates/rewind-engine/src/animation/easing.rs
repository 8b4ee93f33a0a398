// animation/easing.rs
//
// Named easing functions for keyframe interpolation.
// Pure math, no allocation. Safe to call from anywhere.

use std::f32::consts::PI;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, Result};

const HALF_PI: f32 = PI / 2.0;

const B1: f32 = 1.0 / 2.75;
const B2: f32 = 2.0 / 2.75;
const B3: f32 = 1.5 / 2.75;
const B4: f32 = 2.5 / 2.75;
const B5: f32 = 2.25 / 2.75;
const B6: f32 = 2.625 / 2.75;

/// Easing function identifier, stored on every keyframe.
///
/// Serialized by its level-data name (`"InOutSine"`, `"OutBack"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    /// Holds the start value until the segment ends.
    Instant,
    #[serde(rename = "InSine")]
    SineIn,
    #[serde(rename = "OutSine")]
    SineOut,
    #[serde(rename = "InOutSine")]
    SineInOut,
    #[serde(rename = "InElastic")]
    ElasticIn,
    #[serde(rename = "OutElastic")]
    ElasticOut,
    #[serde(rename = "InOutElastic")]
    ElasticInOut,
    /// Overshoot below zero before heading out.
    #[serde(rename = "InBack")]
    BackIn,
    /// Overshoot past one before settling.
    #[serde(rename = "OutBack")]
    BackOut,
    #[serde(rename = "InOutBack")]
    BackInOut,
    #[serde(rename = "InBounce")]
    BounceIn,
    #[serde(rename = "OutBounce")]
    BounceOut,
    #[serde(rename = "InOutBounce")]
    BounceInOut,
    #[serde(rename = "InQuad")]
    QuadIn,
    #[serde(rename = "OutQuad")]
    QuadOut,
    #[serde(rename = "InOutQuad")]
    QuadInOut,
    #[serde(rename = "InCirc")]
    CircIn,
    #[serde(rename = "OutCirc")]
    CircOut,
    #[serde(rename = "InOutCirc")]
    CircInOut,
    #[serde(rename = "InExpo")]
    ExpoIn,
    #[serde(rename = "OutExpo")]
    ExpoOut,
    #[serde(rename = "InOutExpo")]
    ExpoInOut,
}

impl Easing {
    /// Every ease, in level-data order.
    pub const ALL: [Easing; 23] = [
        Easing::Linear,
        Easing::Instant,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
    ];

    /// Look up an ease by its level-data name.
    ///
    /// Unknown names are an error rather than a silent fallback to `Linear`.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name() == name)
            .ok_or_else(|| EngineError::UnknownEase { name: name.to_owned() })
    }

    /// The level-data name of this ease.
    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::Instant => "Instant",
            Easing::SineIn => "InSine",
            Easing::SineOut => "OutSine",
            Easing::SineInOut => "InOutSine",
            Easing::ElasticIn => "InElastic",
            Easing::ElasticOut => "OutElastic",
            Easing::ElasticInOut => "InOutElastic",
            Easing::BackIn => "InBack",
            Easing::BackOut => "OutBack",
            Easing::BackInOut => "InOutBack",
            Easing::BounceIn => "InBounce",
            Easing::BounceOut => "OutBounce",
            Easing::BounceInOut => "InOutBounce",
            Easing::QuadIn => "InQuad",
            Easing::QuadOut => "OutQuad",
            Easing::QuadInOut => "InOutQuad",
            Easing::CircIn => "InCirc",
            Easing::CircOut => "OutCirc",
            Easing::CircInOut => "InOutCirc",
            Easing::ExpoIn => "InExpo",
            Easing::ExpoOut => "OutExpo",
            Easing::ExpoInOut => "InOutExpo",
        }
    }

    /// Apply the easing function to a normalized time value `t` in [0, 1].
    /// The result may leave [0, 1] for Back/Elastic overshoot.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Instant => {
                if t >= 1.0 { 1.0 } else { 0.0 }
            }

            // Sine
            Easing::SineIn => {
                if t == 1.0 { 1.0 } else { 1.0 - (HALF_PI * t).cos() }
            }
            Easing::SineOut => (HALF_PI * t).sin(),
            Easing::SineInOut => -(PI * t).cos() / 2.0 + 0.5,

            // Elastic
            Easing::ElasticIn => (13.0 * HALF_PI * t).sin() * 2.0_f32.powf(10.0 * (t - 1.0)),
            Easing::ElasticOut => {
                if t == 1.0 {
                    1.0
                } else {
                    (-13.0 * HALF_PI * (t + 1.0)).sin() * 2.0_f32.powf(-10.0 * t) + 1.0
                }
            }
            Easing::ElasticInOut => {
                if t < 0.5 {
                    0.5 * (13.0 * HALF_PI * (2.0 * t)).sin() * 2.0_f32.powf(10.0 * (2.0 * t - 1.0))
                } else {
                    0.5 * ((-13.0 * HALF_PI * (2.0 * t)).sin()
                        * 2.0_f32.powf(-10.0 * (2.0 * t - 1.0))
                        + 2.0)
                }
            }

            // Back (overshoot)
            Easing::BackIn => back_in(t),
            Easing::BackOut => back_out(t),
            Easing::BackInOut => {
                let t = t * 2.0;
                if t < 1.0 {
                    back_in(t) / 2.0
                } else {
                    back_out(t - 1.0) / 2.0 + 0.5
                }
            }

            // Bounce
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - t * 2.0)) / 2.0
                } else {
                    bounce_out(t * 2.0 - 1.0) / 2.0 + 0.5
                }
            }

            // Quadratic
            Easing::QuadIn => t * t,
            Easing::QuadOut => -t * (t - 2.0),
            Easing::QuadInOut => {
                if t <= 0.5 {
                    t * t * 2.0
                } else {
                    1.0 - (t - 1.0) * (t - 1.0) * 2.0
                }
            }

            // Circular
            Easing::CircIn => -((1.0 - t * t).sqrt() - 1.0),
            Easing::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
            Easing::CircInOut => {
                if t <= 0.5 {
                    ((1.0 - t * t * 4.0).sqrt() - 1.0) / -2.0
                } else {
                    ((1.0 - (t * 2.0 - 2.0) * (t * 2.0 - 2.0)).sqrt() + 1.0) / 2.0
                }
            }

            // Exponential
            Easing::ExpoIn => 2.0_f32.powf(10.0 * (t - 1.0)),
            Easing::ExpoOut => {
                if t == 1.0 { 1.0 } else { 1.0 - 2.0_f32.powf(-10.0 * t) }
            }
            Easing::ExpoInOut => {
                if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2.0_f32.powf(10.0 * (t * 2.0 - 1.0)) / 2.0
                } else {
                    (2.0 - 2.0_f32.powf(-10.0 * (t * 2.0 - 1.0))) / 2.0
                }
            }
        }
    }
}

impl FromStr for Easing {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

#[inline]
fn back_in(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    t * t * (C3 * t - C1)
}

#[inline]
fn back_out(t: f32) -> f32 {
    const C1: f32 = 1.70158;
    const C3: f32 = C1 + 1.0;
    let t = t - 1.0;
    1.0 + t * t * (C3 * t + C1)
}

#[inline]
fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;

    if t < B1 {
        N1 * t * t
    } else if t < B2 {
        N1 * (t - B3) * (t - B3) + 0.75
    } else if t < B4 {
        N1 * (t - B5) * (t - B5) + 0.9375
    } else {
        N1 * (t - B6) * (t - B6) + 0.984375
    }
}

// ── Interpolation helpers ────────────────────────────────────────────────

/// Linearly interpolate between two values. `t` is not clamped.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` between `a` and `b`, as a factor (0 at `a`, 1 at `b`).
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    (value - a) / (b - a)
}

/// Linearly interpolate between two Vec2 values. `t` is not clamped.
#[inline]
pub fn lerp_vec2(a: glam::Vec2, b: glam::Vec2, t: f32) -> glam::Vec2 {
    a + (b - a) * t
}
