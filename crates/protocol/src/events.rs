//! Lifecycle events emitted by the process manager.
//!
//! The manager and its instances publish these on a bounded channel as
//! execution progresses, so that an observer (a UI, a log sink, a test)
//! can follow process lifecycles without polling the registry.
//!
//! Uses tagged enum serialization:
//! ```json
//! {
//!   "type": "processStatusUpdate",
//!   "payload": {
//!     "identifier": "uuid-here",
//!     "status": "RUNNING"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::process_models::ProcessStatus;

/// Events published as managed process instances move through their
/// lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A new instance has begun executing.
    ProcessStarted {
        identifier: Uuid,
        description: String,
    },

    /// An instance's status has changed.
    ProcessStatusUpdate {
        identifier: Uuid,
        status: ProcessStatus,
    },

    /// An instance completed successfully.
    ProcessCompleted { identifier: Uuid },

    /// An instance stopped in response to a halt request.
    ProcessHalted { identifier: Uuid },

    /// An instance failed; the error detail is also captured on the
    /// instance itself.
    ProcessError { identifier: Uuid, error: String },
}
