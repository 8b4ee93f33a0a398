pub mod animation;
pub mod api;
pub mod components;
pub mod core;
pub mod renderer;

// Re-export key types at crate root for convenience
pub use animation::{Color, Easing, Interpolator, Keyframe, Palette, Sequence, ThemeIndex};
pub use api::config::EngineConfig;
pub use api::error::{EngineError, Result};
pub use api::types::{ActivationWindow, EntityId, Transition};
pub use components::entity::TimedEntity;
pub use components::link::ParentLink;
pub use components::visual::{Visual, HELPER_OPACITY};
pub use core::chain::{ChainBuilder, ObjectDescriptor};
pub use core::compositor::TransformCompositor;
pub use core::engine::Engine;
pub use core::registry::{Registry, RegistryEvent, SubscriberId};
pub use core::scheduler::ActivationScheduler;
pub use renderer::{NodeState, NullNode, RenderNode, SharedNode};
