//! Managed process instance lifecycle.
//!
//! A `ProcessInstance` wraps one execution of a process definition and
//! owns its status, timestamps, bound parameters, and cancellation flag.
//! Status transitions follow a monotonic state machine:
//!
//! ```text
//! NotStarted -> Running -> { HaltRequested -> Halted | Completed | Failed }
//! NotStarted -> Halted            (halted before execution began)
//! ```
//!
//! Terminal states are sticky: the first writer to reach one wins, and a
//! halt that loses the race against natural completion is a silent no-op.

use crate::definition::{HaltSignal, ProcessContext, ProcessDefinition};
use crate::error::{ProcessError, ProcessResult};
use chrono::{DateTime, Utc};
use pm_protocol::events::Event;
use pm_protocol::process_models::{ProcessState, ProcessStatus};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Mutable state guarded by the instance's own lock.
///
/// The lock is held only for field reads and transitions, never while the
/// definition executes.
#[derive(Debug)]
struct InstanceState {
    status: ProcessStatus,
    context: Option<ProcessContext>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    error: Option<String>,
}

/// A single unit of trackable, cancellable work wrapping a process
/// definition.
pub struct ProcessInstance {
    identifier: Uuid,
    path: Option<String>,
    description: String,
    definition: Arc<dyn ProcessDefinition>,
    halt: HaltSignal,
    launched: AtomicBool,
    state: Mutex<InstanceState>,
    events_tx: mpsc::Sender<Event>,
}

impl ProcessInstance {
    /// Create a new instance with a fresh identifier and NotStarted status.
    ///
    /// # Arguments
    ///
    /// * `definition` - The unit-of-work logic this instance will execute
    /// * `description` - Free-text description recorded on the instance
    /// * `events_tx` - Channel for publishing lifecycle events
    pub fn new(
        definition: Arc<dyn ProcessDefinition>,
        description: String,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            identifier: Uuid::new_v4(),
            path: None,
            description,
            definition,
            halt: HaltSignal::new(),
            launched: AtomicBool::new(false),
            state: Mutex::new(InstanceState {
                status: ProcessStatus::NotStarted,
                context: None,
                started_at: None,
                ended_at: None,
                error: None,
            }),
            events_tx,
        }
    }

    /// Override the generated identifier.
    pub fn with_identifier(mut self, identifier: Uuid) -> Self {
        self.identifier = identifier;
        self
    }

    /// Set the stable path this instance is addressable by.
    pub fn with_path(mut self, path: String) -> Self {
        self.path = Some(path);
        self
    }

    /// Process-unique identifier.
    pub fn identifier(&self) -> Uuid {
        self.identifier
    }

    /// Stable addressable path, if one was assigned.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Free-text description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Current lifecycle status.
    pub fn status(&self) -> ProcessStatus {
        self.lock_state().status
    }

    /// Validate and bind configuration parameters.
    ///
    /// The definition validates the parameters; on success they are bound
    /// into the context the run will execute with. Status stays NotStarted.
    ///
    /// # Errors
    ///
    /// - `ProcessError::AlreadyInitialized` if called twice
    /// - `ProcessError::InvalidConfiguration` if the definition rejects
    ///   the parameters
    pub fn init(&self, parameters: HashMap<String, Value>) -> ProcessResult<()> {
        let mut state = self.lock_state();

        if state.context.is_some() {
            return Err(ProcessError::AlreadyInitialized);
        }

        let context = ProcessContext::new(parameters, self.halt.clone());
        self.definition.init(&context)?;
        state.context = Some(context);
        Ok(())
    }

    /// Execute the bound definition to completion.
    ///
    /// Transitions NotStarted -> Running, runs the definition, then lands
    /// on Completed, Halted (if a halt was requested mid-run), or Failed
    /// (capturing the error). If the instance was halted before it ever
    /// started, this is a no-op.
    ///
    /// Execution failures are captured onto the instance rather than
    /// returned: by the time they occur the caller that launched the run
    /// has already moved on.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::AlreadyRunning` if called a second time.
    pub async fn run(&self) -> ProcessResult<()> {
        if self.launched.swap(true, Ordering::SeqCst) {
            return Err(ProcessError::AlreadyRunning);
        }

        let context = {
            let mut state = self.lock_state();
            if state.status != ProcessStatus::NotStarted {
                // Halted before start: honor the terminal state.
                return Ok(());
            }
            state.status = ProcessStatus::Running;
            state.started_at = Some(Utc::now());
            state
                .context
                .clone()
                .unwrap_or_else(|| ProcessContext::new(HashMap::new(), self.halt.clone()))
        };

        let _ = self
            .events_tx
            .send(Event::ProcessStarted {
                identifier: self.identifier,
                description: self.description.clone(),
            })
            .await;
        self.emit_status(ProcessStatus::Running).await;

        let result = self.definition.run(&context).await;

        let final_status = {
            let mut state = self.lock_state();
            if state.status.is_terminal() {
                // Already terminal; nothing left to record.
                return Ok(());
            }

            let status = match result {
                Err(error) => {
                    state.error = Some(ProcessError::Execution(error).to_string());
                    ProcessStatus::Failed
                }
                Ok(()) if self.halt.is_requested() => ProcessStatus::Halted,
                Ok(()) => ProcessStatus::Completed,
            };
            state.status = status;

            let now = Utc::now();
            state.ended_at = Some(state.started_at.map_or(now, |started| started.max(now)));
            status
        };

        self.emit_status(final_status).await;
        match final_status {
            ProcessStatus::Completed => {
                let _ = self
                    .events_tx
                    .send(Event::ProcessCompleted {
                        identifier: self.identifier,
                    })
                    .await;
            }
            ProcessStatus::Halted => {
                let _ = self
                    .events_tx
                    .send(Event::ProcessHalted {
                        identifier: self.identifier,
                    })
                    .await;
            }
            ProcessStatus::Failed => {
                let error = self.lock_state().error.clone().unwrap_or_default();
                let _ = self
                    .events_tx
                    .send(Event::ProcessError {
                        identifier: self.identifier,
                        error,
                    })
                    .await;
            }
            _ => {}
        }

        Ok(())
    }

    /// Request a cooperative halt.
    ///
    /// - Running: transitions to HaltRequested and flips the cancellation
    ///   flag; the definition decides when to honor it.
    /// - NotStarted: transitions directly to Halted.
    /// - HaltRequested or any terminal state: idempotent no-op.
    pub fn halt(&self) {
        let update = {
            let mut state = self.lock_state();
            match state.status {
                ProcessStatus::NotStarted => {
                    state.status = ProcessStatus::Halted;
                    state.ended_at = Some(Utc::now());
                    Some(ProcessStatus::Halted)
                }
                ProcessStatus::Running => {
                    state.status = ProcessStatus::HaltRequested;
                    self.halt.request();
                    Some(ProcessStatus::HaltRequested)
                }
                _ => None,
            }
        };

        if let Some(status) = update {
            // halt() is sync and may be called outside a runtime; a full
            // channel just drops the event.
            let _ = self.events_tx.try_send(Event::ProcessStatusUpdate {
                identifier: self.identifier,
                status,
            });
            if status == ProcessStatus::Halted {
                let _ = self.events_tx.try_send(Event::ProcessHalted {
                    identifier: self.identifier,
                });
            }
        }
    }

    /// A consistent snapshot of the instance for serialization.
    pub fn snapshot(&self) -> ProcessState {
        let state = self.lock_state();
        ProcessState {
            identifier: self.identifier,
            path: self.path.clone(),
            description: self.description.clone(),
            status: state.status,
            started_at: state.started_at,
            ended_at: state.ended_at,
            error: state.error.clone(),
        }
    }

    async fn emit_status(&self, status: ProcessStatus) {
        let _ = self
            .events_tx
            .send(Event::ProcessStatusUpdate {
                identifier: self.identifier,
                status,
            })
            .await;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, InstanceState> {
        // A poisoned lock means a panic mid-transition; the state is still
        // structurally sound, so recover rather than propagate the panic.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ProcessInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessInstance")
            .field("identifier", &self.identifier)
            .field("path", &self.path)
            .field("description", &self.description)
            .field("status", &self.status())
            .finish()
    }
}
