//! Dispatch boundary tests: action parsing, execution, and error
//! flattening.

use pm_core::config::ManagerConfig;
use pm_core::definition::{DefinitionResolver, MockDefinition, ProcessDefinition};
use pm_core::{ControlledProcessManager, Dispatcher};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

fn make_dispatcher(definitions: Vec<Arc<dyn ProcessDefinition>>) -> Dispatcher {
    let (tx, _rx) = mpsc::channel(1000);
    let manager = Arc::new(ControlledProcessManager::new(
        DefinitionResolver::new(definitions),
        ManagerConfig::default(),
        tx,
    ));
    Dispatcher::new(manager)
}

fn params(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

async fn poll_until_status(dispatcher: &Dispatcher, id: &str, expected: &str) -> Value {
    for _ in 0..400 {
        let result = dispatcher
            .handle("status", params(&[("id", json!(id))]))
            .await;
        if result["status"] == expected {
            return result;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Process {} never reported status {}", id, expected);
}

#[tokio::test]
async fn test_start_then_poll_to_completion() {
    let dispatcher = make_dispatcher(vec![Arc::new(MockDefinition::success("report"))]);

    let started = dispatcher
        .handle(
            "start",
            params(&[
                ("definition", json!("report")),
                ("description", json!("Nightly report")),
                ("depth", json!(3)),
            ]),
        )
        .await;

    assert_eq!(started["description"], "Nightly report");
    let id = started["identifier"]
        .as_str()
        .expect("start result should carry an identifier")
        .to_string();

    let completed = poll_until_status(&dispatcher, &id, "COMPLETED").await;
    assert!(completed.get("startedAt").is_some());
    assert!(completed.get("endedAt").is_some());
    assert!(completed.get("error").is_none());
}

#[tokio::test]
async fn test_start_unknown_definition_yields_message() {
    let dispatcher = make_dispatcher(vec![]);

    let result = dispatcher
        .handle("start", params(&[("definition", json!("ghost"))]))
        .await;

    let message = result.as_str().expect("failure should be a text message");
    assert!(message.contains("ghost"));
}

#[tokio::test]
async fn test_unknown_action_yields_message() {
    let dispatcher = make_dispatcher(vec![]);

    let result = dispatcher.handle("reboot", HashMap::new()).await;

    let message = result.as_str().expect("failure should be a text message");
    assert!(message.contains("reboot"));
}

#[tokio::test]
async fn test_status_unknown_id_is_null() {
    let dispatcher = make_dispatcher(vec![]);

    let result = dispatcher
        .handle(
            "status",
            params(&[("id", json!(Uuid::new_v4().to_string()))]),
        )
        .await;

    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn test_status_batch_skips_missing_ids() {
    let dispatcher = make_dispatcher(vec![Arc::new(MockDefinition::success("report"))]);

    let started = dispatcher
        .handle("start", params(&[("definition", json!("report"))]))
        .await;
    let id = started["identifier"].as_str().expect("identifier").to_string();

    let result = dispatcher
        .handle(
            "status",
            params(&[(
                "ids",
                json!([id, Uuid::new_v4().to_string()]),
            )]),
        )
        .await;

    let list = result.as_array().expect("batch status should be a list");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["identifier"], json!(id));
}

#[tokio::test]
async fn test_list_reflects_active_processes() {
    let dispatcher = make_dispatcher(vec![Arc::new(MockDefinition::run_until_halted("looper"))]);

    let empty = dispatcher.handle("list", HashMap::new()).await;
    assert_eq!(empty, json!([]));

    let started = dispatcher
        .handle("start", params(&[("definition", json!("looper"))]))
        .await;
    let id = started["identifier"].as_str().expect("identifier").to_string();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let listed = dispatcher.handle("list", HashMap::new()).await;
    let list = listed.as_array().expect("list should be an array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["identifier"], json!(id));

    // Clean up the looper
    assert_eq!(dispatcher.handle("haltAll", HashMap::new()).await, json!(true));
    poll_until_status(&dispatcher, &id, "HALTED").await;
}

#[tokio::test]
async fn test_halt_by_id_and_by_path() {
    let dispatcher = make_dispatcher(vec![Arc::new(MockDefinition::run_until_halted("looper"))]);

    let started = dispatcher
        .handle("start", params(&[("definition", json!("looper"))]))
        .await;
    let id = started["identifier"].as_str().expect("identifier").to_string();
    let path = started["path"].as_str().expect("path").to_string();

    tokio::time::sleep(Duration::from_millis(20)).await;

    let halted = dispatcher
        .handle("halt", params(&[("path", json!(path))]))
        .await;
    assert!(halted["status"] == "HALT_REQUESTED" || halted["status"] == "HALTED");

    poll_until_status(&dispatcher, &id, "HALTED").await;

    // Halting again by id is idempotent
    let again = dispatcher.handle("halt", params(&[("id", json!(id))])).await;
    assert_eq!(again["status"], "HALTED");
}

#[tokio::test]
async fn test_halt_unknown_process_yields_message() {
    let dispatcher = make_dispatcher(vec![]);

    let result = dispatcher
        .handle("halt", params(&[("id", json!(Uuid::new_v4().to_string()))]))
        .await;
    assert!(result.is_string());

    let missing_selector = dispatcher.handle("halt", HashMap::new()).await;
    assert!(missing_selector.is_string());
}

#[tokio::test]
async fn test_halt_all_on_empty_registry_succeeds() {
    let dispatcher = make_dispatcher(vec![]);

    let result = dispatcher.handle("haltAll", HashMap::new()).await;
    assert_eq!(result, json!(true));

    let listed = dispatcher.handle("list", HashMap::new()).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn test_purge_removes_completed_processes() {
    let dispatcher = make_dispatcher(vec![Arc::new(MockDefinition::success("report"))]);

    let started = dispatcher
        .handle("start", params(&[("definition", json!("report"))]))
        .await;
    let id = started["identifier"].as_str().expect("identifier").to_string();

    poll_until_status(&dispatcher, &id, "COMPLETED").await;

    let purged = dispatcher.handle("purge", HashMap::new()).await;
    assert_eq!(purged, json!(true));

    // Polling after the purge is a valid miss
    let result = dispatcher
        .handle("status", params(&[("id", json!(id))]))
        .await;
    assert_eq!(result, Value::Null);
}

#[tokio::test]
async fn test_failed_process_error_visible_in_status() {
    let dispatcher = make_dispatcher(vec![Arc::new(MockDefinition::failing(
        "bad",
        "Mock failure",
    ))]);

    let started = dispatcher
        .handle("start", params(&[("definition", json!("bad"))]))
        .await;
    let id = started["identifier"].as_str().expect("identifier").to_string();

    let failed = poll_until_status(&dispatcher, &id, "FAILED").await;
    assert!(failed["error"]
        .as_str()
        .is_some_and(|e| e.contains("Mock failure")));
}
