//! Controlled process manager.
//!
//! The `ControlledProcessManager` is the sole entry point other components
//! use: it resolves definitions, creates and registers instances, launches
//! their execution on background tasks, and performs halt/purge bulk
//! operations. It owns the registry exclusively.
//!
//! The manager is explicitly constructed and injected wherever a boundary
//! layer needs it; there is no process-wide singleton. Teardown is
//! [`ControlledProcessManager::shutdown`], which halts all active work.

use crate::config::ManagerConfig;
use crate::definition::{DefinitionResolver, ProcessDefinition};
use crate::error::ProcessResult;
use crate::instance::ProcessInstance;
use crate::registry::ProcessRegistry;
use pm_protocol::events::Event;
use pm_protocol::process_models::ProcessState;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Orchestrates creation, execution dispatch, halting, and bulk operations
/// for managed process instances.
pub struct ControlledProcessManager {
    registry: ProcessRegistry,
    definitions: DefinitionResolver,
    config: ManagerConfig,
    events_tx: mpsc::Sender<Event>,
}

impl ControlledProcessManager {
    /// Create a new manager.
    ///
    /// # Arguments
    ///
    /// * `definitions` - The set of startable process definitions
    /// * `config` - Manager settings (instance addressing, channel sizing)
    /// * `events_tx` - Channel on which lifecycle events are published
    pub fn new(
        definitions: DefinitionResolver,
        config: ManagerConfig,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        Self {
            registry: ProcessRegistry::new(),
            definitions,
            config,
            events_tx,
        }
    }

    /// Resolve a logical definition reference (name or path).
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::DefinitionNotFound` if unresolvable.
    pub fn find_definition_by_name_or_path(
        &self,
        reference: &str,
    ) -> ProcessResult<Arc<dyn ProcessDefinition>> {
        self.definitions.resolve(reference)
    }

    /// Allocate and register a new instance for the given definition.
    ///
    /// The instance gets a fresh identifier and a path under the
    /// configured instance root, and is registered before execution
    /// starts.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::DuplicateIdentifier` on the (vanishingly
    /// unlikely) identifier collision.
    pub fn create_managed_process_instance(
        &self,
        definition: Arc<dyn ProcessDefinition>,
        description: &str,
    ) -> ProcessResult<Arc<ProcessInstance>> {
        let instance = ProcessInstance::new(
            definition,
            description.to_string(),
            self.events_tx.clone(),
        );
        let path = format!(
            "{}/{}",
            self.config.instance_root.trim_end_matches('/'),
            instance.identifier()
        );
        let instance = Arc::new(instance.with_path(path));

        self.registry.register(Arc::clone(&instance))?;
        Ok(instance)
    }

    /// Resolve, create, initialize, and launch a process in one step.
    ///
    /// Resolution and init errors surface synchronously to the caller.
    /// The run itself is spawned on a background task; this returns
    /// immediately with the instance's snapshot, and execution failures
    /// are captured onto the instance.
    ///
    /// # Errors
    ///
    /// - `ProcessError::DefinitionNotFound` for an unresolvable reference
    /// - `ProcessError::InvalidConfiguration` if the definition rejects
    ///   the parameters
    /// - `ProcessError::DuplicateIdentifier` on registration collision
    pub fn start_process(
        &self,
        definition_ref: &str,
        description: &str,
        parameters: HashMap<String, Value>,
    ) -> ProcessResult<ProcessState> {
        let definition = self.find_definition_by_name_or_path(definition_ref)?;
        let instance = self.create_managed_process_instance(definition, description)?;
        instance.init(parameters)?;

        let runner = Arc::clone(&instance);
        tokio::spawn(async move {
            if let Err(e) = runner.run().await {
                // Only a double launch lands here; execution failures are
                // captured on the instance.
                error!(identifier = %runner.identifier(), "Launch failed: {}", e);
            }
        });

        info!(
            identifier = %instance.identifier(),
            definition = definition_ref,
            "Started managed process"
        );
        Ok(instance.snapshot())
    }

    /// All currently active instances.
    pub fn get_active_processes(&self) -> Vec<Arc<ProcessInstance>> {
        self.registry.list_active()
    }

    /// Look up an instance by identifier.
    ///
    /// Absence is an expected outcome for polling callers (the instance
    /// may have been purged), so this returns `None` rather than an error.
    pub fn get_managed_process_instance_by_identifier(
        &self,
        identifier: Uuid,
    ) -> Option<Arc<ProcessInstance>> {
        self.registry.lookup_by_identifier(identifier)
    }

    /// Look up an instance by its stable path.
    pub fn get_managed_process_instance_by_path(&self, path: &str) -> Option<Arc<ProcessInstance>> {
        self.registry.lookup_by_path(path)
    }

    /// Request a cooperative halt of every active instance.
    ///
    /// Best-effort: an instance that races to a terminal state between
    /// the listing and the halt simply no-ops.
    pub fn halt_active_processes(&self) {
        let active = self.registry.list_active();
        info!(count = active.len(), "Halting active processes");
        for instance in active {
            instance.halt();
        }
    }

    /// Remove all terminal-state instances from the registry.
    ///
    /// # Returns
    ///
    /// The number of instances removed.
    pub fn purge_completed_processes(&self) -> usize {
        self.registry.purge_completed()
    }

    /// Documented teardown: halt all active work.
    ///
    /// Cancellation stays cooperative, so instances may take until their
    /// next checkpoint to actually stop.
    pub fn shutdown(&self) {
        info!("Shutting down process manager");
        self.halt_active_processes();
    }

    /// Number of registered instances, active or not.
    pub fn process_count(&self) -> usize {
        self.registry.len()
    }
}
