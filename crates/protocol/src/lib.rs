//! # pm-protocol
//!
//! Core protocol definitions and data models for procman.
//!
//! This crate defines all shared data structures used for:
//! - Runtime process state tracking and its JSON wire shape
//! - Dispatch operations sent to the process manager boundary
//! - Lifecycle events emitted by the manager
//!
//! ## Modules
//!
//! - [`process_models`]: Process status and serializable state snapshots
//! - [`ops`]: Operations understood by the dispatch boundary
//! - [`events`]: Lifecycle events emitted during process execution
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, serde_json, uuid, and chrono
//! - Independent compilation: No dependencies on other procman crates

pub mod events;
pub mod ops;
pub mod process_models;

// Re-export all public types for convenience
pub use events::*;
pub use ops::*;
pub use process_models::*;
