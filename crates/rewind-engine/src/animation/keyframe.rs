// animation/keyframe.rs

use serde::{Deserialize, Serialize};

use super::easing::Easing;
use crate::api::error::Result;

/// One control point of an animation channel.
///
/// `ease` shapes the segment that *ends* at this keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Time in seconds, relative to the owning entity's clock.
    pub time: f32,
    pub value: T,
    #[serde(default)]
    pub ease: Easing,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T, ease: Easing) -> Self {
        Self { time, value, ease }
    }

    /// Linear keyframe.
    pub fn linear(time: f32, value: T) -> Self {
        Self::new(time, value, Easing::Linear)
    }

    /// Keyframe whose ease is given by its level-data name.
    pub fn named(time: f32, value: T, ease: &str) -> Result<Self> {
        Ok(Self::new(time, value, Easing::from_name(ease)?))
    }
}
