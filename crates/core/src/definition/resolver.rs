//! Definition resolver for looking up process definitions.
//!
//! The resolver maintains the set of definitions the manager can start,
//! indexed by logical name and, where a definition provides one, by its
//! stable path.

use crate::definition::base::ProcessDefinition;
use crate::error::{ProcessError, ProcessResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of startable process definitions.
#[derive(Default)]
pub struct DefinitionResolver {
    by_name: HashMap<String, Arc<dyn ProcessDefinition>>,
    by_path: HashMap<String, String>,
}

impl DefinitionResolver {
    /// Create a resolver holding the given definitions.
    ///
    /// Later definitions win name/path collisions, matching a
    /// last-writer-wins configuration reload.
    pub fn new(definitions: Vec<Arc<dyn ProcessDefinition>>) -> Self {
        let mut resolver = Self::default();
        for definition in definitions {
            resolver.register(definition);
        }
        resolver
    }

    /// Add a definition to the resolver.
    pub fn register(&mut self, definition: Arc<dyn ProcessDefinition>) {
        if let Some(path) = definition.path() {
            self.by_path
                .insert(path.to_string(), definition.name().to_string());
        }
        self.by_name
            .insert(definition.name().to_string(), definition);
    }

    /// Resolve a logical reference to a concrete definition.
    ///
    /// The reference is tried as a name first, then as a path.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::DefinitionNotFound` if neither matches.
    pub fn resolve(&self, reference: &str) -> ProcessResult<Arc<dyn ProcessDefinition>> {
        if let Some(definition) = self.by_name.get(reference) {
            return Ok(Arc::clone(definition));
        }

        if let Some(name) = self.by_path.get(reference) {
            if let Some(definition) = self.by_name.get(name) {
                return Ok(Arc::clone(definition));
            }
        }

        Err(ProcessError::DefinitionNotFound(reference.to_string()))
    }

    /// Whether a definition with the given name is registered.
    pub fn has_definition(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All registered definition names.
    pub fn list_definitions(&self) -> Vec<String> {
        self.by_name.keys().cloned().collect()
    }
}
