//! Error type shared by every fallible engine operation.

use crate::api::types::EntityId;

/// Everything that can be rejected while building or mutating the entity set.
///
/// None of these are expected during a steady-state `Engine::update`; they are
/// raised at construction, insertion or retime time instead.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum EngineError {
    /// A sequence was built from zero keyframes.
    #[error("cannot build a sequence without keyframes")]
    EmptySequence,

    /// An ease name that is not in the ease table.
    #[error("unknown ease function: {name}")]
    UnknownEase { name: String },

    /// An entity id that is already registered.
    #[error("entity {id} is already registered")]
    DuplicateEntity { id: EntityId },

    /// An entity id that is not registered.
    #[error("entity {id} is not registered")]
    UnknownEntity { id: EntityId },

    /// `kill <= start`, which would leave an entity permanently active or never active.
    #[error("entity {id} has an empty activation window [{start}, {kill})")]
    InvalidActivationWindow { id: EntityId, start: f32, kill: f32 },

    /// An entity without any transform link.
    #[error("entity {id} has an empty parent chain")]
    EmptyParentChain { id: EntityId },

    /// Walking parent references came back to an object already in the chain.
    #[error("parent chain of {id} is cyclic")]
    CyclicParentChain { id: EntityId },

    /// A descriptor id requested from the chain builder does not exist.
    #[error("object {id} is not described")]
    UnknownObject { id: EntityId },

    /// A theme color index outside the live palette.
    #[error("palette index {index} out of range (palette has {len} colors)")]
    PaletteIndexOutOfRange { index: u32, len: usize },

    /// A replacement palette that would orphan indices used by registered entities.
    #[error("palette needs at least {required} colors, got {len}")]
    PaletteTooSmall { required: usize, len: usize },

    /// Malformed JSON configuration or descriptor data.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
