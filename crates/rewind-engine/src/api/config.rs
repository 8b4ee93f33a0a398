use serde::{Deserialize, Serialize};

use crate::api::error::Result;

/// Engine tuning knobs, provided by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Z offset per unit of entity depth, applied to every link position so
    /// deeper entities draw behind shallower ones (default: 0.0005).
    pub depth_bias: f32,
    /// When more structural changes than this are queued for one frame, the
    /// scheduler rebuilds its state with a full recalculation instead of
    /// patching each change in (default: 1).
    pub recalculate_threshold: usize,
    /// Pre-allocated entity capacity (default: 256).
    pub initial_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth_bias: 0.0005,
            recalculate_threshold: 1,
            initial_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Parse a config from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
