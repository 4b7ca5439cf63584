//! Error taxonomy for the process manager.
//!
//! This module defines all errors that can be surfaced by instance
//! lifecycle operations, registry lookups, and the dispatch boundary.
//!
//! Propagation policy: errors during init and lookups are returned
//! synchronously to the caller. Errors during a background `run()` are
//! captured onto the instance (status = FAILED plus the `error` field),
//! since the caller that launched the run has already returned.

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the process manager core.
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Required init parameters are missing or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// `init` was called on an instance that is already initialized.
    #[error("Process instance is already initialized")]
    AlreadyInitialized,

    /// `run` was called on an instance that was already launched.
    #[error("Process instance is already running")]
    AlreadyRunning,

    /// An instance with this identifier (or its path) is already registered.
    #[error("Duplicate process identifier: {0}")]
    DuplicateIdentifier(Uuid),

    /// No registered instance matches the given identifier or path.
    #[error("Process not found: {0}")]
    NotFound(String),

    /// No process definition matches the given name or path.
    #[error("Process definition not found: {0}")]
    DefinitionNotFound(String),

    /// The dispatch boundary received an unknown action name.
    #[error("Action not understood: {0}")]
    UnsupportedAction(String),

    /// A definition's run logic failed; the underlying cause is opaque
    /// to the manager.
    #[error("Execution failed: {0}")]
    Execution(#[from] anyhow::Error),
}

/// Type alias for Result with ProcessError.
pub type ProcessResult<T> = Result<T, ProcessError>;
