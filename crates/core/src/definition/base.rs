//! Base ProcessDefinition trait and supporting types.

use crate::error::{ProcessError, ProcessResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag shared between an instance and its
/// executing definition.
///
/// Halting is a signal, never preemption: the running definition must
/// check [`HaltSignal::is_requested`] (usually via
/// [`ProcessContext::halt_requested`]) at its own safe checkpoints and
/// exit gracefully.
#[derive(Clone, Debug, Default)]
pub struct HaltSignal(Arc<AtomicBool>);

impl HaltSignal {
    /// Create a fresh, unset signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a halt. Irreversible for the lifetime of the signal.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a halt has been requested.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Context handed to a definition during init and run.
///
/// Carries the parameters bound at init time and the instance's halt
/// signal. Cloning is cheap enough for handing the context to the
/// background execution task.
#[derive(Clone, Debug)]
pub struct ProcessContext {
    parameters: HashMap<String, Value>,
    halt: HaltSignal,
}

impl ProcessContext {
    /// Create a context binding the given parameters to a halt signal.
    pub fn new(parameters: HashMap<String, Value>, halt: HaltSignal) -> Self {
        Self { parameters, halt }
    }

    /// All bound parameters.
    pub fn parameters(&self) -> &HashMap<String, Value> {
        &self.parameters
    }

    /// Look up a single parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    /// Whether the owning instance has been asked to halt.
    ///
    /// Definitions must poll this at their checkpoints and return `Ok`
    /// early when it reads true.
    pub fn halt_requested(&self) -> bool {
        self.halt.is_requested()
    }
}

/// The unit-of-work contract implemented by every process definition.
///
/// Contract requirements on implementations:
/// - `run` must check [`ProcessContext::halt_requested`] at safe points
///   and return early when it reads true; there is no forced termination.
/// - Side effects of `init` are limited to validation; binding happens
///   on the instance.
#[async_trait]
pub trait ProcessDefinition: Send + Sync {
    /// Logical name this definition is resolved by.
    fn name(&self) -> &str;

    /// Optional stable path this definition is also resolvable by
    /// (e.g. the location of a backing resource).
    fn path(&self) -> Option<&str> {
        None
    }

    /// Validate the parameters an instance is about to bind.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::InvalidConfiguration` if required
    /// parameters are missing or malformed.
    fn init(&self, context: &ProcessContext) -> ProcessResult<()> {
        let _ = context;
        Ok(())
    }

    /// Execute the definition's logic to completion.
    ///
    /// Failures are opaque to the manager; they are captured onto the
    /// instance as its error detail.
    async fn run(&self, context: &ProcessContext) -> anyhow::Result<()>;
}

/// Helper for definitions with a fixed set of required parameters.
pub(crate) fn require_parameters(
    context: &ProcessContext,
    required: &[String],
) -> ProcessResult<()> {
    for name in required {
        if context.parameter(name).is_none() {
            return Err(ProcessError::InvalidConfiguration(format!(
                "Missing required parameter '{}'",
                name
            )));
        }
    }
    Ok(())
}
