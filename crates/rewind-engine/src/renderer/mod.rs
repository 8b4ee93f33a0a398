pub mod node;

pub use node::{NodeState, NullNode, RenderNode, SharedNode};
