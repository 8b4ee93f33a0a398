// animation/sequence.rs
//
// Keyframe sequences and the per-channel interpolation lookup.
//
// Usage:
//   let seq = Sequence::new(vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(1.0, 10.0)])?;
//   let v = seq.interpolate(0.5);                 // 5.0
//   let c = colors.interpolate_with(t, &palette); // theme indices resolved to RGBA

use std::cell::Cell;
use std::ops::Add;

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::easing::{inverse_lerp, lerp, lerp_vec2};
use super::keyframe::Keyframe;
use crate::api::error::{EngineError, Result};

/// How far the cached bracket is walked before falling back to binary search.
const PROBE_LIMIT: usize = 4;

/// Blends two keyframe values into a channel output.
///
/// `factor` is the already-eased segment factor and may leave [0, 1].
pub trait Interpolator<T> {
    type Output;

    fn interpolate(&self, from: &T, to: &T, factor: f32) -> Self::Output;
}

/// Plain un-clamped lerp for scalar and vector channels.
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl Interpolator<f32> for Linear {
    type Output = f32;

    #[inline]
    fn interpolate(&self, from: &f32, to: &f32, factor: f32) -> f32 {
        lerp(*from, *to, factor)
    }
}

impl Interpolator<Vec2> for Linear {
    type Output = Vec2;

    #[inline]
    fn interpolate(&self, from: &Vec2, to: &Vec2, factor: f32) -> Vec2 {
        lerp_vec2(*from, *to, factor)
    }
}

/// An immutable, time-sorted, non-empty list of keyframes for one channel.
///
/// Keyframes sharing a time keep their insertion order; at exactly that time
/// the last of them is the one in effect.
#[derive(Debug, Clone)]
pub struct Sequence<T> {
    keyframes: Vec<Keyframe<T>>,
    /// Left index of the most recently used bracket.
    hint: Cell<usize>,
}

impl<T> Sequence<T> {
    /// Build a sequence, sorting keyframes by time (stable).
    ///
    /// Fails with [`EngineError::EmptySequence`] when no keyframes are given.
    pub fn new(keyframes: impl IntoIterator<Item = Keyframe<T>>) -> Result<Self> {
        let mut keyframes: Vec<Keyframe<T>> = keyframes.into_iter().collect();
        if keyframes.is_empty() {
            return Err(EngineError::EmptySequence);
        }
        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self {
            keyframes,
            hint: Cell::new(0),
        })
    }

    /// A single-keyframe sequence that always yields `value`.
    pub fn constant(value: T) -> Self {
        Self {
            keyframes: vec![Keyframe::linear(0.0, value)],
            hint: Cell::new(0),
        }
    }

    /// Build a sequence from relative keyframes: each stored value is the sum
    /// of its own value and every earlier one (in time order).
    pub fn from_relative(keyframes: impl IntoIterator<Item = Keyframe<T>>) -> Result<Self>
    where
        T: Copy + Add<Output = T>,
    {
        let seq = Self::new(keyframes)?;
        let mut keyframes = seq.keyframes;
        for i in 1..keyframes.len() {
            keyframes[i].value = keyframes[i - 1].value + keyframes[i].value;
        }
        Ok(Self {
            keyframes,
            hint: Cell::new(0),
        })
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Time of the first keyframe.
    pub fn start_time(&self) -> f32 {
        self.keyframes[0].time
    }

    /// Time of the last keyframe.
    pub fn end_time(&self) -> f32 {
        self.keyframes[self.keyframes.len() - 1].time
    }

    /// Sample the channel at `time` using `interpolator` to blend values.
    ///
    /// Times outside the keyframe range clamp to the first/last value.
    pub fn interpolate_with<I>(&self, time: f32, interpolator: &I) -> I::Output
    where
        I: Interpolator<T> + ?Sized,
    {
        let first = &self.keyframes[0];
        let last = &self.keyframes[self.keyframes.len() - 1];

        if self.keyframes.len() == 1 || !(time >= first.time) {
            return interpolator.interpolate(&first.value, &first.value, 0.0);
        }
        if time >= last.time {
            return interpolator.interpolate(&last.value, &last.value, 0.0);
        }

        let index = self.bracket(time);
        let from = &self.keyframes[index];
        let to = &self.keyframes[index + 1];

        let t = inverse_lerp(from.time, to.time, time);
        interpolator.interpolate(&from.value, &to.value, to.ease.apply(t))
    }

    /// Index `i` with `k[i].time <= time < k[i + 1].time`.
    ///
    /// Requires `k[0].time <= time < k[last].time`. Tries the cached bracket
    /// and a few neighbors in the direction of travel first.
    fn bracket(&self, time: f32) -> usize {
        let keys = &self.keyframes;
        let last_left = keys.len() - 2;
        let contains = |i: usize| keys[i].time <= time && time < keys[i + 1].time;

        let hint = self.hint.get().min(last_left);
        let found = if contains(hint) {
            Some(hint)
        } else if time >= keys[hint + 1].time {
            (hint + 1..=last_left).take(PROBE_LIMIT).find(|&i| contains(i))
        } else {
            (0..hint).rev().take(PROBE_LIMIT).find(|&i| contains(i))
        };

        let index = found.unwrap_or_else(|| self.search(time));
        self.hint.set(index);
        index
    }

    /// Binary search for the last keyframe at or before `time`.
    #[inline]
    fn search(&self, time: f32) -> usize {
        self.keyframes.partition_point(|k| k.time <= time) - 1
    }
}

impl<T> Sequence<T>
where
    Linear: Interpolator<T>,
{
    /// Sample a scalar/vector channel with plain lerp.
    #[inline]
    pub fn interpolate(&self, time: f32) -> <Linear as Interpolator<T>>::Output {
        self.interpolate_with(time, &Linear)
    }
}

impl<T: Serialize> Serialize for Sequence<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.keyframes.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Sequence<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let keyframes = Vec::<Keyframe<T>>::deserialize(deserializer)?;
        Sequence::new(keyframes).map_err(serde::de::Error::custom)
    }
}
