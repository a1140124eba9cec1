//! Sequential connection-test runner.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

use futures::FutureExt;
use serde::{Deserialize, Serialize};

use super::step::{StepFn, TestStep};
use super::summary::{ConnectionTestSummary, TestResult};
use crate::error::CatalogError;

/// Step list of a connection test as published by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionDefinition {
    pub name: String,
    #[serde(default)]
    pub steps: Vec<TestStepDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepDefinition {
    pub name: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Runs test steps in order and stops at the first mandatory failure.
///
/// A step failure, panic or timeout never propagates: it becomes a failed
/// [`TestResult`]. Steps after a failed mandatory step are reported as skipped
/// and never invoked.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTestRunner {
    step_timeout: Option<Duration>,
}

impl ConnectionTestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any step that runs longer than `timeout`.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn step_timeout(&self) -> Option<Duration> {
        self.step_timeout
    }

    pub async fn run(&self, steps: Vec<TestStep>) -> ConnectionTestSummary {
        let mut results = Vec::with_capacity(steps.len());
        let mut failed_mandatory: Option<String> = None;

        for step in steps {
            let (info, invoke) = step.into_parts();

            if let Some(failed) = &failed_mandatory {
                tracing::debug!(
                    target: "catalog_auth::connection",
                    step = %info.name,
                    after = %failed,
                    "skipping step"
                );
                results.push(TestResult::skipped(info));
                continue;
            }

            let started = Instant::now();
            let outcome = self.invoke(invoke).await;
            let duration_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    tracing::info!(
                        target: "catalog_auth::connection",
                        step = %info.name,
                        duration_ms,
                        "step passed"
                    );
                    results.push(TestResult::succeeded(info, duration_ms));
                }
                Err(message) => {
                    let error = CatalogError::StepExecution {
                        step: info.name.clone(),
                        message: message.clone(),
                    };
                    tracing::warn!(
                        target: "catalog_auth::connection",
                        mandatory = info.mandatory,
                        duration_ms,
                        error = %error,
                        "step failed"
                    );
                    if info.mandatory {
                        failed_mandatory = Some(info.name.clone());
                    }
                    results.push(TestResult::failed(info, message, duration_ms));
                }
            }
        }

        let summary = ConnectionTestSummary::new(results);
        tracing::info!(
            target: "catalog_auth::connection",
            success = summary.success,
            steps = summary.results.len(),
            "connection test finished"
        );
        summary
    }

    /// Run the steps of `definition`, looking each one up in `test_fns` by name.
    ///
    /// A step without a registered function fails with a descriptive message.
    pub async fn run_definition(
        &self,
        definition: &TestConnectionDefinition,
        mut test_fns: HashMap<String, StepFn>,
    ) -> ConnectionTestSummary {
        let steps: Vec<TestStep> = definition
            .steps
            .iter()
            .map(|def| {
                let step = match test_fns.remove(&def.name) {
                    Some(invoke) => TestStep::from_fn(def.name.clone(), invoke),
                    None => {
                        let message = format!("no test function registered for step '{}'", def.name);
                        TestStep::new(def.name.clone(), move || async move { Err::<(), _>(message) })
                    }
                };
                let step = step.with_mandatory(def.mandatory);
                match &def.description {
                    Some(description) => step.with_description(description.clone()),
                    None => step,
                }
            })
            .collect();

        if !test_fns.is_empty() {
            let mut unused: Vec<&String> = test_fns.keys().collect();
            unused.sort();
            tracing::warn!(
                target: "catalog_auth::connection",
                definition = %definition.name,
                unused = ?unused,
                "test functions without a matching step were not run"
            );
        }

        self.run(steps).await
    }

    async fn invoke(&self, invoke: StepFn) -> std::result::Result<(), String> {
        let guarded = AssertUnwindSafe(async move { invoke().await }).catch_unwind();

        let outcome = match self.step_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, guarded).await {
                Ok(outcome) => outcome,
                Err(_) => return Err(format!("timed out after {}ms", timeout.as_millis())),
            },
            None => guarded.await,
        };

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(format!("step panicked: {}", panic_message(&*payload))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{TestStatus, step_fn};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    fn failing(message: &'static str) -> impl FnOnce() -> futures::future::Ready<Result<(), String>> {
        move || futures::future::ready(Err(message.to_string()))
    }

    #[tokio::test]
    async fn mandatory_failure_skips_remaining_steps() {
        let profile_called = Arc::new(AtomicBool::new(false));
        let flag = profile_called.clone();

        let summary = ConnectionTestRunner::new()
            .run(vec![
                TestStep::new("reachable", failing("connection refused")).mandatory(),
                TestStep::new("profile", move || async move {
                    flag.store(true, Ordering::SeqCst);
                    Ok::<(), String>(())
                }),
            ])
            .await;

        assert!(!summary.success);
        assert_eq!(summary.status_of("reachable"), Some(TestStatus::Failed));
        assert_eq!(summary.status_of("profile"), Some(TestStatus::Skipped));
        assert_eq!(
            summary.result("reachable").unwrap().error_message.as_deref(),
            Some("connection refused")
        );
        assert!(!profile_called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn optional_failure_keeps_running() {
        let summary = ConnectionTestRunner::new()
            .run(vec![
                TestStep::new("reachable", || async { Ok::<(), String>(()) }).mandatory(),
                TestStep::new("profile", failing("forbidden")),
                TestStep::new("tables", || async { Ok::<(), String>(()) }),
            ])
            .await;

        assert!(summary.success);
        assert_eq!(summary.status_of("profile"), Some(TestStatus::Failed));
        assert_eq!(summary.status_of("tables"), Some(TestStatus::Passed));
    }

    #[tokio::test]
    async fn panics_become_failures() {
        let summary = ConnectionTestRunner::new()
            .run(vec![TestStep::new("boom", || async {
                if true {
                    panic!("sdk exploded");
                }
                Ok::<(), String>(())
            })
            .mandatory()])
            .await;

        assert!(!summary.success);
        let message = summary.results[0].error_message.as_deref().unwrap();
        assert!(message.contains("sdk exploded"), "{message}");
    }

    #[tokio::test]
    async fn slow_steps_time_out() {
        let summary = ConnectionTestRunner::new()
            .with_step_timeout(Duration::from_millis(20))
            .run(vec![TestStep::new("slow", || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<(), String>(())
            })])
            .await;

        assert_eq!(summary.status_of("slow"), Some(TestStatus::Failed));
        assert!(summary.results[0].error_message.as_deref().unwrap().contains("timed out"));
        assert!(summary.success);
    }

    #[tokio::test]
    async fn blocking_steps_run_on_the_blocking_pool() {
        let summary = ConnectionTestRunner::new()
            .run(vec![
                TestStep::blocking("describe", || Ok::<(), String>(())).mandatory(),
                TestStep::blocking("query", || Err::<(), _>("no grant".to_string())),
            ])
            .await;

        assert!(summary.success);
        assert_eq!(summary.status_of("query"), Some(TestStatus::Failed));
    }

    #[tokio::test]
    async fn definition_steps_resolve_by_name() {
        let definition: TestConnectionDefinition = serde_json::from_value(serde_json::json!({
            "name": "Salesforce",
            "steps": [
                {"name": "CheckAccess", "mandatory": true, "description": "Validate credentials"},
                {"name": "GetTables", "mandatory": false}
            ]
        }))
        .unwrap();

        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut test_fns = HashMap::new();
        test_fns.insert(
            "CheckAccess".to_string(),
            step_fn(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), String>(())
            }),
        );

        let summary = ConnectionTestRunner::new()
            .run_definition(&definition, test_fns)
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(summary.success);
        let check = summary.result("CheckAccess").unwrap();
        assert!(check.mandatory);
        assert_eq!(check.description.as_deref(), Some("Validate credentials"));
        let tables = summary.result("GetTables").unwrap();
        assert_eq!(tables.status, TestStatus::Failed);
        assert!(tables.error_message.as_deref().unwrap().contains("no test function registered"));
    }
}
