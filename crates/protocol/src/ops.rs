//! Dispatch operations for the process manager boundary.
//!
//! This module defines the commands understood by the manager's dispatch
//! layer. Callers (an HTTP front end, a CLI, a test harness) translate
//! inbound requests into an `Op`; the dispatcher executes it against the
//! manager and serializes the result.
//!
//! Uses tagged enum serialization:
//! ```json
//! {
//!   "action": "start",
//!   "payload": {
//!     "definition": "folder-report",
//!     "description": "Nightly report",
//!     "parameters": { "depth": 3 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Operations accepted by the dispatch boundary.
///
/// Each variant corresponds to one action name. Unknown action names are
/// rejected by the dispatcher with an "action not understood" message
/// rather than a variant here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Resolve a definition, create and initialize a new instance, and
    /// launch it in the background.
    Start {
        /// Name or path of the process definition to run.
        definition: String,
        /// Free-text description recorded on the instance.
        #[serde(default)]
        description: Option<String>,
        /// Parameters bound at init time and validated by the definition.
        #[serde(default)]
        parameters: HashMap<String, Value>,
    },

    /// List all currently active (non-terminal) instances.
    List,

    /// Report the state of one or more instances.
    ///
    /// Lookup precedence follows the reference behavior: `id` first, then
    /// `path`, then the `ids` batch. Absent instances are an expected
    /// outcome for polling callers, never an error.
    Status {
        #[serde(default)]
        id: Option<Uuid>,
        #[serde(default)]
        path: Option<String>,
        #[serde(default)]
        ids: Vec<Uuid>,
    },

    /// Request a cooperative halt of a single instance.
    Halt {
        #[serde(default)]
        id: Option<Uuid>,
        #[serde(default)]
        path: Option<String>,
    },

    /// Request a cooperative halt of every active instance.
    HaltAll,

    /// Remove all terminal-state instances from the registry.
    Purge,
}
