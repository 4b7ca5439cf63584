//! Mock process definition for testing.

use crate::definition::base::{require_parameters, ProcessContext, ProcessDefinition};
use crate::error::ProcessResult;
use anyhow::bail;
use async_trait::async_trait;
use std::time::Duration;

/// How a `MockDefinition` behaves when run.
#[derive(Clone, Debug)]
enum Behavior {
    /// Complete successfully after the configured delay.
    Succeed,
    /// Fail with the given message after the configured delay.
    Fail(String),
    /// Poll the halt signal until it fires, then return.
    RunUntilHalted,
}

/// Configurable stand-in for a real process definition.
#[derive(Clone, Debug)]
pub struct MockDefinition {
    name: String,
    path: Option<String>,
    required_parameters: Vec<String>,
    delay: Duration,
    behavior: Behavior,
}

impl MockDefinition {
    /// A definition that completes successfully.
    pub fn success(name: &str) -> Self {
        Self {
            name: name.to_string(),
            path: None,
            required_parameters: Vec::new(),
            delay: Duration::ZERO,
            behavior: Behavior::Succeed,
        }
    }

    /// A definition whose run fails with the given message.
    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            behavior: Behavior::Fail(message.to_string()),
            ..Self::success(name)
        }
    }

    /// A definition that keeps running until a halt is requested,
    /// checking its cancellation checkpoint every few milliseconds.
    pub fn run_until_halted(name: &str) -> Self {
        Self {
            behavior: Behavior::RunUntilHalted,
            ..Self::success(name)
        }
    }

    /// Set the definition path this mock is also resolvable by.
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// Require a parameter to be present at init time.
    pub fn with_required_parameter(mut self, name: &str) -> Self {
        self.required_parameters.push(name.to_string());
        self
    }

    /// Sleep for the given duration before completing or failing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl ProcessDefinition for MockDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn init(&self, context: &ProcessContext) -> ProcessResult<()> {
        require_parameters(context, &self.required_parameters)
    }

    async fn run(&self, context: &ProcessContext) -> anyhow::Result<()> {
        match &self.behavior {
            Behavior::Succeed => {
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                Ok(())
            }
            Behavior::Fail(message) => {
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                bail!("{}", message)
            }
            Behavior::RunUntilHalted => {
                // Bounded so a test that forgets to halt fails instead of hanging.
                for _ in 0..2000 {
                    if context.halt_requested() {
                        return Ok(());
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                bail!("Halt was never requested")
            }
        }
    }
}
