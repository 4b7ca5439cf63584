//! Action-name dispatch boundary.
//!
//! Translates named actions (start, list, status, halt, haltAll, purge)
//! and their raw parameter maps into manager calls, and serializes the
//! results to JSON. This is the transport-agnostic equivalent of an HTTP
//! query handler: the transport itself (parsing requests, writing
//! responses) stays outside this crate.
//!
//! Every internal failure is caught here: it is logged server-side and
//! flattened to a plain-text JSON message, never surfaced as a raw error
//! structure to the caller.

use crate::error::{ProcessError, ProcessResult};
use crate::manager::ControlledProcessManager;
use pm_protocol::ops::Op;
use pm_protocol::process_models::ProcessState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Request parameters that are consumed by the dispatch layer itself and
/// never forwarded to a definition's init.
const RESERVED_PARAMETERS: [&str; 3] = ["action", "definition", "description"];

/// Maps inbound actions onto calls against an injected process manager.
pub struct Dispatcher {
    manager: Arc<ControlledProcessManager>,
}

impl Dispatcher {
    /// Create a dispatcher bound to the given manager.
    pub fn new(manager: Arc<ControlledProcessManager>) -> Self {
        Self { manager }
    }

    /// Parse a raw action name plus parameter map into an operation.
    ///
    /// Non-reserved parameters of a `start` request become the instance's
    /// init parameters.
    ///
    /// # Errors
    ///
    /// - `ProcessError::UnsupportedAction` for an unknown action name
    /// - `ProcessError::InvalidConfiguration` for missing or malformed
    ///   required parameters (e.g. a non-UUID `id`)
    pub fn parse_request(action: &str, params: &HashMap<String, Value>) -> ProcessResult<Op> {
        match action {
            "start" => {
                let definition = params
                    .get("definition")
                    .and_then(Value::as_str)
                    .ok_or_else(|| {
                        ProcessError::InvalidConfiguration(
                            "Missing 'definition' parameter".to_string(),
                        )
                    })?
                    .to_string();
                let description = params
                    .get("description")
                    .and_then(Value::as_str)
                    .map(ToString::to_string);
                let parameters = params
                    .iter()
                    .filter(|(key, _)| !RESERVED_PARAMETERS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                Ok(Op::Start {
                    definition,
                    description,
                    parameters,
                })
            }
            "list" => Ok(Op::List),
            "status" => Ok(Op::Status {
                id: parse_optional_uuid(params, "id")?,
                path: params
                    .get("path")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
                ids: parse_uuid_list(params, "ids")?,
            }),
            "halt" => Ok(Op::Halt {
                id: parse_optional_uuid(params, "id")?,
                path: params
                    .get("path")
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
            }),
            "haltAll" => Ok(Op::HaltAll),
            "purge" => Ok(Op::Purge),
            other => Err(ProcessError::UnsupportedAction(other.to_string())),
        }
    }

    /// Execute an operation against the manager.
    ///
    /// Never fails: errors are logged and flattened to a text message
    /// value.
    pub async fn dispatch(&self, op: Op) -> Value {
        match self.execute(op) {
            Ok(result) => result,
            Err(e) => failure_message(&e),
        }
    }

    /// Parse and execute in one step, the shape a transport front end
    /// consumes.
    pub async fn handle(&self, action: &str, params: HashMap<String, Value>) -> Value {
        match Self::parse_request(action, &params) {
            Ok(op) => self.dispatch(op).await,
            Err(e) => failure_message(&e),
        }
    }

    fn execute(&self, op: Op) -> ProcessResult<Value> {
        match op {
            Op::Start {
                definition,
                description,
                parameters,
            } => {
                let state = self.manager.start_process(
                    &definition,
                    description.as_deref().unwrap_or(""),
                    parameters,
                )?;
                Ok(serialize_state(&state))
            }
            Op::List => {
                let states: Vec<ProcessState> = self
                    .manager
                    .get_active_processes()
                    .iter()
                    .map(|instance| instance.snapshot())
                    .collect();
                Ok(json!(states))
            }
            Op::Status { id, path, ids } => Ok(self.status(id, path.as_deref(), &ids)),
            Op::Halt { id, path } => self.halt(id, path.as_deref()),
            Op::HaltAll => {
                self.manager.halt_active_processes();
                Ok(json!(true))
            }
            Op::Purge => {
                self.manager.purge_completed_processes();
                Ok(json!(true))
            }
        }
    }

    /// Lookup precedence: single `id`, then `path`, then the `ids` batch.
    ///
    /// Absence is an expected polling outcome: a single miss yields JSON
    /// null, and missing batch entries are skipped.
    fn status(&self, id: Option<Uuid>, path: Option<&str>, ids: &[Uuid]) -> Value {
        if let Some(id) = id {
            return match self.manager.get_managed_process_instance_by_identifier(id) {
                Some(instance) => serialize_state(&instance.snapshot()),
                None => Value::Null,
            };
        }

        if let Some(path) = path {
            return match self.manager.get_managed_process_instance_by_path(path) {
                Some(instance) => serialize_state(&instance.snapshot()),
                None => Value::Null,
            };
        }

        let states: Vec<ProcessState> = ids
            .iter()
            .filter_map(|id| self.manager.get_managed_process_instance_by_identifier(*id))
            .map(|instance| instance.snapshot())
            .collect();
        json!(states)
    }

    fn halt(&self, id: Option<Uuid>, path: Option<&str>) -> ProcessResult<Value> {
        let instance = if let Some(id) = id {
            self.manager
                .get_managed_process_instance_by_identifier(id)
                .ok_or_else(|| ProcessError::NotFound(id.to_string()))?
        } else if let Some(path) = path {
            self.manager
                .get_managed_process_instance_by_path(path)
                .ok_or_else(|| ProcessError::NotFound(path.to_string()))?
        } else {
            return Err(ProcessError::InvalidConfiguration(
                "halt requires an 'id' or 'path' parameter".to_string(),
            ));
        };

        instance.halt();
        Ok(serialize_state(&instance.snapshot()))
    }
}

fn serialize_state(state: &ProcessState) -> Value {
    // ProcessState contains no map keys that can fail to serialize
    serde_json::to_value(state).unwrap_or(Value::Null)
}

fn failure_message(e: &ProcessError) -> Value {
    error!("Dispatch failed: {}", e);
    Value::String(format!("Request failed: {}", e))
}

fn parse_optional_uuid(
    params: &HashMap<String, Value>,
    key: &str,
) -> ProcessResult<Option<Uuid>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_uuid_value(value, key).map(Some),
    }
}

fn parse_uuid_list(params: &HashMap<String, Value>, key: &str) -> ProcessResult<Vec<Uuid>> {
    match params.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| parse_uuid_value(value, key))
            .collect(),
        Some(other) => parse_uuid_value(other, key).map(|id| vec![id]),
    }
}

fn parse_uuid_value(value: &Value, key: &str) -> ProcessResult<Uuid> {
    value
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| {
            ProcessError::InvalidConfiguration(format!("Parameter '{}' is not a valid id", key))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_unknown_action() {
        let result = Dispatcher::parse_request("reboot", &HashMap::new());
        assert!(matches!(
            result,
            Err(ProcessError::UnsupportedAction(action)) if action == "reboot"
        ));
    }

    #[test]
    fn test_parse_start_filters_reserved_parameters() {
        let params: HashMap<String, Value> = [
            ("definition".to_string(), json!("report")),
            ("description".to_string(), json!("Nightly")),
            ("action".to_string(), json!("start")),
            ("depth".to_string(), json!(3)),
        ]
        .into_iter()
        .collect();

        let op = Dispatcher::parse_request("start", &params).expect("parse should succeed");
        match op {
            Op::Start {
                definition,
                description,
                parameters,
            } => {
                assert_eq!(definition, "report");
                assert_eq!(description.as_deref(), Some("Nightly"));
                assert_eq!(parameters.len(), 1);
                assert_eq!(parameters["depth"], json!(3));
            }
            other => panic!("Wrong variant: {:?}", other),
        }
    }

    #[test]
    fn test_parse_start_requires_definition() {
        let result = Dispatcher::parse_request("start", &HashMap::new());
        assert!(matches!(
            result,
            Err(ProcessError::InvalidConfiguration(reason)) if reason.contains("definition")
        ));
    }

    #[test]
    fn test_parse_status_with_malformed_id() {
        let params: HashMap<String, Value> =
            [("id".to_string(), json!("not-a-uuid"))].into_iter().collect();

        let result = Dispatcher::parse_request("status", &params);
        assert!(matches!(
            result,
            Err(ProcessError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_parse_status_batch_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let params: HashMap<String, Value> = [(
            "ids".to_string(),
            json!([a.to_string(), b.to_string()]),
        )]
        .into_iter()
        .collect();

        let op = Dispatcher::parse_request("status", &params).expect("parse should succeed");
        match op {
            Op::Status { id, path, ids } => {
                assert!(id.is_none());
                assert!(path.is_none());
                assert_eq!(ids, vec![a, b]);
            }
            other => panic!("Wrong variant: {:?}", other),
        }
    }
}
