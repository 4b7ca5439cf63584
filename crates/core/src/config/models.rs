//! Configuration models for the process manager.

use serde::{Deserialize, Serialize};

/// Manager settings loaded from `procman.toml`.
///
/// Every field has a default so a missing or partial file yields a
/// working configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Base path under which instance addresses are allocated.
    ///
    /// Each registered instance gets the path `<instance_root>/<identifier>`.
    pub instance_root: String,

    /// Capacity of the bounded lifecycle event channel.
    pub event_capacity: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            instance_root: "/var/managed-processes".to_string(),
            event_capacity: 256,
        }
    }
}
