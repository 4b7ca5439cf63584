//! Runtime process state models.
//!
//! This module defines the structures for tracking the lifecycle of managed
//! process instances and the JSON shape in which they cross the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the current lifecycle status of a managed process instance.
///
/// The status progresses through these states during normal execution:
/// NotStarted -> Running -> Completed
///
/// Halt and failure paths:
/// - Running -> HaltRequested -> Halted (cooperative cancellation honored)
/// - NotStarted -> Halted (halted before execution began)
/// - NotStarted/Running -> Failed (execution error captured on the instance)
///
/// Transitions are monotonic: once an instance reaches a terminal state
/// (Halted, Completed, Failed) it never leaves it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessStatus {
    /// Instance has been created and registered but not started yet.
    NotStarted,

    /// Instance is actively executing its definition.
    Running,

    /// A cooperative halt has been requested; the instance is still
    /// executing until it reaches its next cancellation checkpoint.
    HaltRequested,

    /// Instance stopped in response to a halt request.
    Halted,

    /// Instance completed successfully.
    Completed,

    /// Instance failed; the error detail is captured on the instance.
    Failed,
}

impl ProcessStatus {
    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Halted | Self::Completed | Self::Failed)
    }

    /// Whether this status counts as active for list/halt operations.
    pub fn is_active(self) -> bool {
        !self.is_terminal()
    }
}

/// A consistent snapshot of a managed process instance.
///
/// This is the shape in which instances are serialized across the dispatch
/// boundary: optional fields are omitted entirely when absent, and field
/// names are camelCase.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessState {
    /// Process-unique identifier, generated at creation.
    pub identifier: Uuid,

    /// Stable human-addressable key, set once at registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Free-text description provided when the process was started.
    pub description: String,

    /// Current lifecycle status.
    pub status: ProcessStatus,

    /// When execution began. Unset until `run()` is entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the instance reached a terminal state.
    ///
    /// Always >= `started_at` when both are present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,

    /// Failure detail, set at most once when the instance fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(ProcessStatus::Halted.is_terminal());
        assert!(ProcessStatus::Completed.is_terminal());
        assert!(ProcessStatus::Failed.is_terminal());

        assert!(!ProcessStatus::NotStarted.is_terminal());
        assert!(!ProcessStatus::Running.is_terminal());
        assert!(!ProcessStatus::HaltRequested.is_terminal());
    }

    #[test]
    fn test_active_is_inverse_of_terminal() {
        for status in [
            ProcessStatus::NotStarted,
            ProcessStatus::Running,
            ProcessStatus::HaltRequested,
            ProcessStatus::Halted,
            ProcessStatus::Completed,
            ProcessStatus::Failed,
        ] {
            assert_eq!(status.is_active(), !status.is_terminal());
        }
    }
}
