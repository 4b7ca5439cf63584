//! Process definition abstraction.
//!
//! A `ProcessDefinition` is the externally supplied unit-of-work logic
//! that a managed process instance executes. The manager only controls
//! its lifecycle; the definition owns the business logic.

pub mod base;
pub mod mock;
pub mod resolver;

pub use base::{HaltSignal, ProcessContext, ProcessDefinition};
pub use mock::MockDefinition;
pub use resolver::DefinitionResolver;
