pub mod chain;
pub mod compositor;
pub mod engine;
pub mod registry;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod rng;
