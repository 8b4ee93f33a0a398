use serde::{Deserialize, Serialize};

/// Unique identifier for a timed entity in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The half-open interval `[start, kill)` during which an entity is alive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationWindow {
    pub start: f32,
    pub kill: f32,
}

impl ActivationWindow {
    pub fn new(start: f32, kill: f32) -> Self {
        Self { start, kill }
    }

    /// Whether `time` falls inside `[start, kill)`.
    #[inline]
    pub fn contains(&self, time: f32) -> bool {
        self.start <= time && time < self.kill
    }

    /// A window is well-formed when it is non-empty.
    pub fn is_valid(&self) -> bool {
        self.kill > self.start
    }
}

/// An activation state change reported by the scheduler.
///
/// The engine turns these into `enter_level` / `exit_level` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The entity crossed into its activation window.
    Activated(EntityId),
    /// The entity crossed out of its activation window (or was removed while alive).
    Deactivated(EntityId),
}

impl Transition {
    pub fn id(self) -> EntityId {
        match self {
            Transition::Activated(id) | Transition::Deactivated(id) => id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let w = ActivationWindow::new(1.0, 2.0);
        assert!(!w.contains(0.999));
        assert!(w.contains(1.0));
        assert!(w.contains(1.999));
        assert!(!w.contains(2.0));
    }

    #[test]
    fn empty_window_is_invalid() {
        assert!(ActivationWindow::new(0.0, 1.0).is_valid());
        assert!(!ActivationWindow::new(1.0, 1.0).is_valid());
        assert!(!ActivationWindow::new(2.0, 1.0).is_valid());
    }
}
