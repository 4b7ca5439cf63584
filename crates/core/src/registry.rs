//! Concurrent in-memory index of managed process instances.
//!
//! The registry keys every instance by identifier and, when present, by
//! its stable path. Both maps live behind a single mutex held only for
//! map mutation, never during instance execution. Entries leave the
//! registry only through an explicit purge.

use crate::error::{ProcessError, ProcessResult};
use crate::instance::ProcessInstance;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct RegistryInner {
    by_id: HashMap<Uuid, Arc<ProcessInstance>>,
    by_path: HashMap<String, Uuid>,
}

/// Thread-safe registry of all known process instances.
#[derive(Default)]
pub struct ProcessRegistry {
    inner: Mutex<RegistryInner>,
}

impl ProcessRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an instance into both indexes.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::DuplicateIdentifier` if the identifier is
    /// already registered, or if the instance's path is already claimed
    /// by another instance (a path maps to exactly one identifier).
    pub fn register(&self, instance: Arc<ProcessInstance>) -> ProcessResult<()> {
        let mut inner = self.lock_inner();
        let identifier = instance.identifier();

        if inner.by_id.contains_key(&identifier) {
            return Err(ProcessError::DuplicateIdentifier(identifier));
        }

        if let Some(path) = instance.path() {
            if let Some(owner) = inner.by_path.get(path) {
                return Err(ProcessError::DuplicateIdentifier(*owner));
            }
            inner.by_path.insert(path.to_string(), identifier);
        }

        inner.by_id.insert(identifier, instance);
        debug!(%identifier, "Registered process instance");
        Ok(())
    }

    /// Look up an instance by identifier.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::NotFound` if no such instance is registered.
    pub fn get_by_identifier(&self, identifier: Uuid) -> ProcessResult<Arc<ProcessInstance>> {
        self.lookup_by_identifier(identifier)
            .ok_or_else(|| ProcessError::NotFound(identifier.to_string()))
    }

    /// Look up an instance by its stable path.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::NotFound` if no instance owns the path.
    pub fn get_by_path(&self, path: &str) -> ProcessResult<Arc<ProcessInstance>> {
        self.lookup_by_path(path)
            .ok_or_else(|| ProcessError::NotFound(path.to_string()))
    }

    /// Optional-variant lookup for polling callers, where absence is an
    /// expected outcome rather than an error.
    pub fn lookup_by_identifier(&self, identifier: Uuid) -> Option<Arc<ProcessInstance>> {
        self.lock_inner().by_id.get(&identifier).cloned()
    }

    /// Optional-variant path lookup.
    pub fn lookup_by_path(&self, path: &str) -> Option<Arc<ProcessInstance>> {
        let inner = self.lock_inner();
        let identifier = inner.by_path.get(path)?;
        inner.by_id.get(identifier).cloned()
    }

    /// All instances whose status is not terminal, snapshot-consistent at
    /// call time.
    pub fn list_active(&self) -> Vec<Arc<ProcessInstance>> {
        self.lock_inner()
            .by_id
            .values()
            .filter(|instance| instance.status().is_active())
            .cloned()
            .collect()
    }

    /// Remove all terminal-state instances from both indexes.
    ///
    /// Instances that are still active at the moment of the check are
    /// never removed: the status read and the removal happen under the
    /// registry lock, and terminal states are sticky, so an instance
    /// observed active here can at worst become terminal and be purged on
    /// a later pass.
    ///
    /// # Returns
    ///
    /// The number of instances removed.
    pub fn purge_completed(&self) -> usize {
        let mut inner = self.lock_inner();

        let purged: Vec<Uuid> = inner
            .by_id
            .iter()
            .filter(|(_, instance)| instance.status().is_terminal())
            .map(|(id, _)| *id)
            .collect();

        for identifier in &purged {
            if let Some(instance) = inner.by_id.remove(identifier) {
                if let Some(path) = instance.path() {
                    inner.by_path.remove(path);
                }
            }
        }

        if !purged.is_empty() {
            debug!(count = purged.len(), "Purged completed process instances");
        }
        purged.len()
    }

    /// Number of registered instances, active or not.
    pub fn len(&self) -> usize {
        self.lock_inner().by_id.len()
    }

    /// Whether the registry holds no instances.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_inner(&self) -> std::sync::MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
