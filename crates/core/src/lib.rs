//! # pm-core
//!
//! Controlled process manager core for procman.
//!
//! This crate provides:
//! - Long-running, cancellable process instances with a monotonic
//!   lifecycle state machine
//! - A concurrent registry indexed by identifier and path
//! - A manager orchestrating creation, background launch, halting, and
//!   bulk operations
//! - A transport-agnostic dispatch layer mapping named actions onto
//!   manager calls
//!
//! ## Modules
//!
//! - [`config`]: Manager configuration loading
//! - [`definition`]: The `ProcessDefinition` contract implemented by units of work
//! - [`instance`]: Process instance lifecycle state machine
//! - [`registry`]: Concurrent process registry
//! - [`manager`]: The `ControlledProcessManager` orchestrator
//! - [`dispatch`]: Action-name boundary layer
//! - [`error`]: Error taxonomy

pub mod config;
pub mod definition;
pub mod dispatch;
pub mod error;
pub mod instance;
pub mod manager;
pub mod registry;

pub use dispatch::Dispatcher;
pub use error::{ProcessError, ProcessResult};
pub use instance::ProcessInstance;
pub use manager::ControlledProcessManager;
pub use registry::ProcessRegistry;
